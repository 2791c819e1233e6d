use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use teloxide::types::InlineKeyboardMarkup;

use tg_giveaway::giveaway::MediaAttachment;
use tg_giveaway::transport::{
    ChannelInfo, MemberStatus, MessageRef, Messenger, TransportError,
};

/// a sent message captured for verification
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub text: String,
    pub reply_to: Option<i32>,
    pub has_keyboard: bool,
}

/// in-memory messenger that records all outbound traffic and lets tests
/// script membership statuses and failures
#[derive(Clone, Default)]
pub struct MockMessenger {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    edited: Arc<Mutex<Vec<(MessageRef, InlineKeyboardMarkup)>>>,
    member_statuses: Arc<Mutex<HashMap<(i64, i64), MemberStatus>>>,
    /// chats where every send fails with Forbidden
    failing_chats: Arc<Mutex<HashSet<i64>>>,
    /// posts whose button edits fail with NotFound (deleted posts)
    dead_posts: Arc<Mutex<HashSet<(i64, i32)>>>,
    /// channels whose info lookups fail with Forbidden
    dead_channels: Arc<Mutex<HashSet<i64>>>,
    next_message_id: Arc<Mutex<i32>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_member_status(&self, channel_id: i64, user_id: i64, status: MemberStatus) {
        self.member_statuses
            .lock()
            .unwrap()
            .insert((channel_id, user_id), status);
    }

    pub fn fail_chat(&self, chat_id: i64) {
        self.failing_chats.lock().unwrap().insert(chat_id);
    }

    pub fn kill_post(&self, message: MessageRef) {
        self.dead_posts
            .lock()
            .unwrap()
            .insert((message.chat_id, message.message_id));
    }

    pub fn kill_channel(&self, channel_id: i64) {
        self.dead_channels.lock().unwrap().insert(channel_id);
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn messages_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn chat_received_containing(&self, chat_id: i64, needle: &str) -> bool {
        self.messages_to(chat_id)
            .iter()
            .any(|message| message.text.contains(needle))
    }

    pub fn edit_count(&self) -> usize {
        self.edited.lock().unwrap().len()
    }

    fn record_send(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i32>,
        has_keyboard: bool,
    ) -> Result<MessageRef, TransportError> {
        if self.failing_chats.lock().unwrap().contains(&chat_id) {
            return Err(TransportError::Forbidden);
        }
        let mut next = self.next_message_id.lock().unwrap();
        *next += 1;
        let message_id = *next;
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            message_id,
            text: text.to_string(),
            reply_to,
            has_keyboard,
        });
        Ok(MessageRef {
            chat_id,
            message_id,
        })
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    fn bot_username(&self) -> &str {
        "TestGiveBot"
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError> {
        self.record_send(chat_id, text, None, keyboard.is_some())
    }

    async fn send_reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i32,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError> {
        if self
            .dead_posts
            .lock()
            .unwrap()
            .contains(&(chat_id, reply_to_message_id))
        {
            return Err(TransportError::NotFound);
        }
        self.record_send(chat_id, text, Some(reply_to_message_id), keyboard.is_some())
    }

    async fn send_media(
        &self,
        chat_id: i64,
        _media: &MediaAttachment,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError> {
        self.record_send(chat_id, caption, None, keyboard.is_some())
    }

    async fn send_png(
        &self,
        chat_id: i64,
        _png: Vec<u8>,
        caption: &str,
    ) -> Result<MessageRef, TransportError> {
        self.record_send(chat_id, caption, None, false)
    }

    async fn edit_buttons(
        &self,
        message: &MessageRef,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<(), TransportError> {
        if self
            .dead_posts
            .lock()
            .unwrap()
            .contains(&(message.chat_id, message.message_id))
        {
            return Err(TransportError::NotFound);
        }
        if self.failing_chats.lock().unwrap().contains(&message.chat_id) {
            return Err(TransportError::Forbidden);
        }
        self.edited.lock().unwrap().push((*message, keyboard));
        Ok(())
    }

    async fn delete_message(&self, _message: &MessageRef) -> Result<(), TransportError> {
        Ok(())
    }

    async fn member_status(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<MemberStatus, TransportError> {
        if self.dead_channels.lock().unwrap().contains(&channel_id) {
            return Err(TransportError::Forbidden);
        }
        Ok(self
            .member_statuses
            .lock()
            .unwrap()
            .get(&(channel_id, user_id))
            .copied()
            .unwrap_or(MemberStatus::Member))
    }

    async fn channel_info(&self, channel_id: i64) -> Result<ChannelInfo, TransportError> {
        if self.dead_channels.lock().unwrap().contains(&channel_id) {
            return Err(TransportError::Forbidden);
        }
        Ok(ChannelInfo {
            id: channel_id,
            title: format!("Channel {}", channel_id),
            invite_link: Some(format!("https://t.me/+mock{}", channel_id.unsigned_abs())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_and_fails_on_demand() {
        let mock = MockMessenger::new();
        mock.send_message(1, "hello", None).await.expect("send");
        assert!(mock.chat_received_containing(1, "hello"));

        mock.fail_chat(2);
        assert_eq!(
            mock.send_message(2, "nope", None).await.unwrap_err(),
            TransportError::Forbidden
        );

        mock.set_member_status(-100, 5, MemberStatus::Left);
        assert_eq!(
            mock.member_status(-100, 5).await.unwrap(),
            MemberStatus::Left
        );
        assert_eq!(mock.member_status(-100, 6).await.unwrap(), MemberStatus::Member);
    }
}

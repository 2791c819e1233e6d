use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, ChatMemberStatus, InlineKeyboardMarkup, InputFile, MessageId, ParseMode,
    ReplyParameters, UserId,
};
use teloxide::ApiError;

use crate::giveaway::{MediaAttachment, MediaKind};

/// failure modes the core has to distinguish when talking to telegram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// target message/chat is gone
    NotFound,
    /// bot lost access (blocked, kicked, demoted)
    Forbidden,
    /// anything transient or unclassified; logged and retried at the next
    /// natural opportunity, never in a tight loop
    Other(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NotFound => write!(f, "target not found"),
            TransportError::Forbidden => write!(f, "bot has no access"),
            TransportError::Other(text) => write!(f, "telegram error: {}", text),
        }
    }
}

impl Error for TransportError {}

/// location of a sent message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// restricted/left/kicked all mean "not subscribed" for eligibility
    pub fn counts_as_subscribed(&self) -> bool {
        !matches!(
            self,
            MemberStatus::Restricted | MemberStatus::Left | MemberStatus::Kicked
        )
    }
}

#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub id: i64,
    pub title: String,
    pub invite_link: Option<String>,
}

/// outbound telegram surface the core depends on. production uses
/// `TelegramMessenger`; tests substitute a recording mock.
#[async_trait]
pub trait Messenger: Send + Sync {
    fn bot_username(&self) -> &str;

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError>;

    /// reply variant used for result announcements under the original post
    async fn send_reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i32,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError>;

    async fn send_media(
        &self,
        chat_id: i64,
        media: &MediaAttachment,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError>;

    /// sends an in-memory png (captcha challenges)
    async fn send_png(
        &self,
        chat_id: i64,
        png: Vec<u8>,
        caption: &str,
    ) -> Result<MessageRef, TransportError>;

    async fn edit_buttons(
        &self,
        message: &MessageRef,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<(), TransportError>;

    async fn delete_message(&self, message: &MessageRef) -> Result<(), TransportError>;

    async fn member_status(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<MemberStatus, TransportError>;

    async fn channel_info(&self, channel_id: i64) -> Result<ChannelInfo, TransportError>;
}

pub struct TelegramMessenger {
    bot: Arc<Bot>,
    username: String,
}

impl TelegramMessenger {
    /// resolves and caches the bot username once; deep links need it on
    /// every render
    pub async fn new(bot: Arc<Bot>) -> Result<Self, TransportError> {
        let me = bot.get_me().await.map_err(map_request_error)?;
        let username = me.username().to_string();
        Ok(Self { bot, username })
    }
}

fn map_request_error(err: teloxide::RequestError) -> TransportError {
    match &err {
        teloxide::RequestError::Api(api) => match api {
            ApiError::ChatNotFound
            | ApiError::UserNotFound
            | ApiError::MessageIdInvalid
            | ApiError::MessageToEditNotFound
            | ApiError::MessageToDeleteNotFound
            | ApiError::MessageToReplyNotFound => TransportError::NotFound,
            ApiError::BotBlocked
            | ApiError::BotKicked
            | ApiError::BotKickedFromSupergroup
            | ApiError::UserDeactivated
            | ApiError::CantInitiateConversation
            | ApiError::NotEnoughRightsToPostMessages => TransportError::Forbidden,
            other => TransportError::Other(other.to_string()),
        },
        other => TransportError::Other(other.to_string()),
    }
}

fn message_ref(message: &Message) -> MessageRef {
    MessageRef {
        chat_id: message.chat.id.0,
        message_id: message.id.0,
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    fn bot_username(&self) -> &str {
        &self.username
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        let message = request.await.map_err(map_request_error)?;
        Ok(message_ref(&message))
    }

    async fn send_reply(
        &self,
        chat_id: i64,
        reply_to_message_id: i32,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .reply_parameters(ReplyParameters::new(MessageId(reply_to_message_id)));
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        let message = request.await.map_err(map_request_error)?;
        Ok(message_ref(&message))
    }

    async fn send_media(
        &self,
        chat_id: i64,
        media: &MediaAttachment,
        caption: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageRef, TransportError> {
        let chat = ChatId(chat_id);
        let file = InputFile::file_id(media.file_id.clone());
        let message = match media.kind {
            MediaKind::Photo => {
                let mut request = self
                    .bot
                    .send_photo(chat, file)
                    .caption(caption)
                    .parse_mode(ParseMode::Html);
                if let Some(keyboard) = keyboard {
                    request = request.reply_markup(keyboard);
                }
                request.await.map_err(map_request_error)?
            }
            MediaKind::Video => {
                let mut request = self
                    .bot
                    .send_video(chat, file)
                    .caption(caption)
                    .parse_mode(ParseMode::Html);
                if let Some(keyboard) = keyboard {
                    request = request.reply_markup(keyboard);
                }
                request.await.map_err(map_request_error)?
            }
            MediaKind::Animation => {
                let mut request = self
                    .bot
                    .send_animation(chat, file)
                    .caption(caption)
                    .parse_mode(ParseMode::Html);
                if let Some(keyboard) = keyboard {
                    request = request.reply_markup(keyboard);
                }
                request.await.map_err(map_request_error)?
            }
        };
        Ok(message_ref(&message))
    }

    async fn send_png(
        &self,
        chat_id: i64,
        png: Vec<u8>,
        caption: &str,
    ) -> Result<MessageRef, TransportError> {
        let file = InputFile::memory(png).file_name("captcha.png");
        let message = self
            .bot
            .send_photo(ChatId(chat_id), file)
            .caption(caption)
            .parse_mode(ParseMode::Html)
            .await
            .map_err(map_request_error)?;
        Ok(message_ref(&message))
    }

    async fn edit_buttons(
        &self,
        message: &MessageRef,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<(), TransportError> {
        let result = self
            .bot
            .edit_message_reply_markup(ChatId(message.chat_id), MessageId(message.message_id))
            .reply_markup(keyboard)
            .await;
        match result {
            Ok(_) => Ok(()),
            // counter did not change since the last refresh
            Err(teloxide::RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(err) => Err(map_request_error(err)),
        }
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), TransportError> {
        self.bot
            .delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn member_status(
        &self,
        channel_id: i64,
        user_id: i64,
    ) -> Result<MemberStatus, TransportError> {
        let member = self
            .bot
            .get_chat_member(ChatId(channel_id), UserId(user_id as u64))
            .await
            .map_err(map_request_error)?;
        let status = match member.status() {
            ChatMemberStatus::Owner => MemberStatus::Creator,
            ChatMemberStatus::Administrator => MemberStatus::Administrator,
            ChatMemberStatus::Member => MemberStatus::Member,
            ChatMemberStatus::Restricted => MemberStatus::Restricted,
            ChatMemberStatus::Left => MemberStatus::Left,
            ChatMemberStatus::Banned => MemberStatus::Kicked,
        };
        Ok(status)
    }

    async fn channel_info(&self, channel_id: i64) -> Result<ChannelInfo, TransportError> {
        let chat = self
            .bot
            .get_chat(ChatId(channel_id))
            .await
            .map_err(map_request_error)?;
        Ok(ChannelInfo {
            id: channel_id,
            title: chat.title().unwrap_or("").to_string(),
            invite_link: chat.invite_link().map(|link| link.to_string()),
        })
    }
}

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::captcha::CHALLENGE_TTL;
use crate::creation::GiveawayDraft;

/// what the bot is currently waiting for from a given user.
/// one conversation per user; starting a new one replaces the old.
#[derive(Debug, Clone)]
pub enum UserConversation {
    /// join flow paused on a captcha challenge
    AwaitingCaptcha {
        giveaway_id: i32,
        answer: String,
        attempts_left: u8,
        issued_at: DateTime<Utc>,
    },
    /// owner is typing a new participant threshold for an end-condition edit
    AwaitingEndCount { giveaway_id: i32 },
    /// owner is typing a new deadline for an end-condition edit
    AwaitingEndTime { giveaway_id: i32 },
    /// owner is typing how many supplementary winners to draw
    AwaitingExtraWinners { giveaway_id: i32 },
    /// multi-step giveaway creation dialog
    Creating(GiveawayDraft),
}

impl UserConversation {
    fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        match self {
            UserConversation::AwaitingCaptcha { issued_at, .. } => {
                *issued_at + CHALLENGE_TTL <= now
            }
            _ => false,
        }
    }
}

/// per-user conversation state, kept in memory for the process lifetime.
/// captcha states lapse after their challenge TTL; everything else lives
/// until finished or cancelled.
#[derive(Clone, Default)]
pub struct ConversationStore {
    states: Arc<Mutex<HashMap<i64, UserConversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: i64) -> Option<UserConversation> {
        let mut states = self.states.lock().await;
        if let Some(state) = states.get(&user_id) {
            if state.is_lapsed(Utc::now()) {
                states.remove(&user_id);
                return None;
            }
            return Some(state.clone());
        }
        None
    }

    pub async fn set(&self, user_id: i64, state: UserConversation) {
        let mut states = self.states.lock().await;
        states.insert(user_id, state);
    }

    /// explicit cancel or normal completion; in-flight external calls are
    /// unaffected, only the stored state goes away
    pub async fn clear(&self, user_id: i64) {
        let mut states = self.states.lock().await;
        states.remove(&user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn captcha_state_lapses_after_ttl() {
        let store = ConversationStore::new();
        store
            .set(
                1,
                UserConversation::AwaitingCaptcha {
                    giveaway_id: 5,
                    answer: "1234".to_string(),
                    attempts_left: 3,
                    issued_at: Utc::now() - CHALLENGE_TTL - Duration::seconds(1),
                },
            )
            .await;
        assert!(store.get(1).await.is_none());
        // lapsed state is actually gone, not just hidden
        store
            .set(
                1,
                UserConversation::AwaitingEndCount { giveaway_id: 5 },
            )
            .await;
        assert!(matches!(
            store.get(1).await,
            Some(UserConversation::AwaitingEndCount { giveaway_id: 5 })
        ));
    }

    #[tokio::test]
    async fn fresh_captcha_state_survives() {
        let store = ConversationStore::new();
        store
            .set(
                1,
                UserConversation::AwaitingCaptcha {
                    giveaway_id: 5,
                    answer: "1234".to_string(),
                    attempts_left: 3,
                    issued_at: Utc::now(),
                },
            )
            .await;
        assert!(store.get(1).await.is_some());
        store.clear(1).await;
        assert!(store.get(1).await.is_none());
    }
}

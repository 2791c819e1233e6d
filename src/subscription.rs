use log::warn;
use std::sync::Arc;

use crate::operator_log::OperatorLog;
use crate::transport::Messenger;

/// answers "is this user currently subscribed to all required channels".
///
/// a channel the bot cannot query (demoted, removed, network trouble) counts
/// as a failed check, never as an automatic pass; the incident goes to the
/// operator log so the owner-side breakage is visible.
#[derive(Clone)]
pub struct SubscriptionVerifier {
    messenger: Arc<dyn Messenger>,
    operator_log: OperatorLog,
}

impl SubscriptionVerifier {
    pub fn new(messenger: Arc<dyn Messenger>, operator_log: OperatorLog) -> Self {
        Self {
            messenger,
            operator_log,
        }
    }

    /// short-circuits on the first unmet channel
    pub async fn is_subscribed(&self, channel_ids: &[i64], user_id: i64) -> bool {
        for &channel_id in channel_ids {
            if !self.check_one(channel_id, user_id).await {
                return false;
            }
        }
        true
    }

    /// all channels the user is missing; feeds the "must subscribe first"
    /// message, so no short-circuit here
    pub async fn unmet_channels(&self, channel_ids: &[i64], user_id: i64) -> Vec<i64> {
        let mut unmet = Vec::new();
        for &channel_id in channel_ids {
            if !self.check_one(channel_id, user_id).await {
                unmet.push(channel_id);
            }
        }
        unmet
    }

    async fn check_one(&self, channel_id: i64, user_id: i64) -> bool {
        match self.messenger.member_status(channel_id, user_id).await {
            Ok(status) => status.counts_as_subscribed(),
            Err(err) => {
                warn!(
                    "membership check failed for user {} in channel {}: {}",
                    user_id, channel_id, err
                );
                self.operator_log
                    .alert(&format!(
                        "Subscription check failed in channel {}: {}",
                        channel_id, err
                    ))
                    .await;
                false
            }
        }
    }
}

use log::error;
use std::sync::Arc;
use std::time::Duration;

use crate::transport::Messenger;

/// pause before each outbound log message; keeps the log channel from
/// crowding out regular traffic during failure storms
const SEND_DELAY: Duration = Duration::from_millis(50);

/// routes operator-facing alerts to a dedicated telegram channel.
/// disabled (process log only) when no channel id is configured.
#[derive(Clone)]
pub struct OperatorLog {
    messenger: Arc<dyn Messenger>,
    channel_id: Option<i64>,
}

impl OperatorLog {
    pub fn new(messenger: Arc<dyn Messenger>, channel_id: Option<i64>) -> Self {
        Self {
            messenger,
            channel_id,
        }
    }

    /// best-effort: failure to deliver an alert is itself only logged
    pub async fn alert(&self, text: &str) {
        error!("{}", text);
        if let Some(channel_id) = self.channel_id {
            tokio::time::sleep(SEND_DELAY).await;
            if let Err(err) = self.messenger.send_message(channel_id, text, None).await {
                error!("failed to deliver operator alert: {}", err);
            }
        }
    }
}

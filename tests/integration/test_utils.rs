use chrono::{DateTime, Utc};
use std::sync::Arc;

use tg_giveaway::giveaway::{EndCondition, GiveawayDefinition};
use tg_giveaway::lifecycle::GiveawayEngine;
use tg_giveaway::operator_log::OperatorLog;
use tg_giveaway::participants::ParticipantStore;
use tg_giveaway::repository::GiveawayRepository;
use tg_giveaway::subscription::SubscriptionVerifier;
use tg_giveaway::transport::Messenger;
use tg_giveaway::user_manager::UserManager;

use super::mock_messenger::MockMessenger;
use super::TestDatabase;

pub const HOME_CHANNEL: i64 = -1001000;
pub const SPONSOR_A: i64 = -1002000;
pub const SPONSOR_B: i64 = -1003000;
pub const CREATOR: i64 = 9000;

/// everything a lifecycle test needs, wired against the mock transport
pub struct TestHarness {
    pub repository: Arc<GiveawayRepository>,
    pub engine: GiveawayEngine,
    pub mock: MockMessenger,
}

pub fn build_harness(db: &TestDatabase) -> TestHarness {
    let mock = MockMessenger::new();
    let messenger: Arc<dyn Messenger> = Arc::new(mock.clone());
    let operator_log = OperatorLog::new(messenger.clone(), None);
    let repository = Arc::new(GiveawayRepository::new(db.pool.clone()));
    let users = Arc::new(UserManager::new(db.pool.clone()));
    let verifier = SubscriptionVerifier::new(messenger.clone(), operator_log.clone());
    let engine = GiveawayEngine::new(
        repository.clone(),
        ParticipantStore::new(),
        messenger,
        verifier,
        users,
        operator_log,
    );
    TestHarness {
        repository,
        engine,
        mock,
    }
}

/// immediate-post definition ending at a participant threshold
pub fn count_definition(end_count: i32, winners_count: i32) -> GiveawayDefinition {
    GiveawayDefinition {
        creator_user_id: CREATOR,
        channel_id: HOME_CHANNEL,
        text: "Win a prize!".to_string(),
        media: None,
        button_label: "Join".to_string(),
        sponsor_channel_ids: vec![HOME_CHANNEL],
        extra_conditions: None,
        captcha: false,
        winners_count,
        post_at: None,
        end_condition: EndCondition::Count(end_count),
    }
}

/// definition ending at an absolute deadline
pub fn deadline_definition(
    post_at: Option<DateTime<Utc>>,
    end_at: DateTime<Utc>,
    winners_count: i32,
) -> GiveawayDefinition {
    GiveawayDefinition {
        creator_user_id: CREATOR,
        channel_id: HOME_CHANNEL,
        text: "Win a prize!".to_string(),
        media: None,
        button_label: "Join".to_string(),
        sponsor_channel_ids: vec![HOME_CHANNEL, SPONSOR_A],
        extra_conditions: None,
        captcha: false,
        winners_count,
        post_at,
        end_condition: EndCondition::At(end_at),
    }
}

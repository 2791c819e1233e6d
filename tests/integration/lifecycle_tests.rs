use chrono::{Duration, Utc};

use tg_giveaway::giveaway::GiveawayStatus;
use tg_giveaway::lifecycle::EngineError;
use tg_giveaway::scheduler;
use tg_giveaway::transport::MemberStatus;

use super::test_utils::{
    build_harness, count_definition, deadline_definition, CREATOR, HOME_CHANNEL, SPONSOR_A,
};
use super::TestDatabase;

#[tokio::test]
async fn test_publish_posts_and_notifies_creator() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(5, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");

    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.status, GiveawayStatus::Published);
    assert!(giveaway.post_message_id.is_some());
    assert!(giveaway.post_url.is_some());

    // the channel got the post with the join button
    let channel_messages = harness.mock.messages_to(HOME_CHANNEL);
    assert_eq!(channel_messages.len(), 1);
    assert!(channel_messages[0].has_keyboard);
    assert!(channel_messages[0].text.contains("Win a prize!"));
    // the creator was told where the post went
    assert!(harness.mock.chat_received_containing(CREATOR, "https://t.me/c/"));

    // publishing again is a no-op, not a duplicate post
    harness.engine.publish(id).await.expect("republish");
    assert_eq!(harness.mock.messages_to(HOME_CHANNEL).len(), 1);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_publish_failure_deletes_giveaway() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);
    harness.mock.fail_chat(HOME_CHANNEL);

    let id = harness
        .repository
        .create(&count_definition(5, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish handles failure");

    // fail-fast: an un-postable giveaway never reaches PUBLISHED, it is gone
    assert!(harness.repository.get(id).await.is_err());
    assert!(harness.mock.chat_received_containing(CREATOR, "❌"));

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_scenario_count_trigger_one_winner_of_two() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(2, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");

    // two distinct users join; the second join reaches the threshold
    assert!(harness.engine.participants().add(id, 111).await);
    assert!(harness.engine.participants().add(id, 222).await);
    // re-joining is idempotent and does not inflate the count
    assert!(!harness.engine.participants().add(id, 111).await);
    assert_eq!(harness.engine.participants().count(id).await, 2);

    harness.engine.finish(id).await.expect("finish");

    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.status, GiveawayStatus::Finished);
    assert_eq!(giveaway.participants_count, 2);
    assert_eq!(giveaway.winner_ids.len(), 1);
    let winner = giveaway.winner_ids[0];
    assert!(winner == 111 || winner == 222, "winner drawn from participants");

    // the winner was congratulated privately
    assert!(harness.mock.chat_received_containing(winner, "🎉"));
    // results were announced as a reply to the original post
    let announcement = harness
        .mock
        .messages_to(HOME_CHANNEL)
        .into_iter()
        .find(|message| message.reply_to.is_some())
        .expect("results reply");
    assert_eq!(announcement.reply_to, giveaway.post_message_id);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_finish_is_idempotent() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(2, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");
    harness.engine.participants().add(id, 111).await;

    harness.engine.finish(id).await.expect("first finish");
    let announcements = harness.mock.messages_to(HOME_CHANNEL).len();

    // a second attempt (scheduler retry, concurrent trigger) is a no-op
    harness.engine.finish(id).await.expect("second finish");
    assert_eq!(harness.mock.messages_to(HOME_CHANNEL).len(), announcements);

    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.winner_ids.len(), 1);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_finish_reverifies_eligibility() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(10, 3))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");

    for user in [1, 2, 3] {
        harness.engine.participants().add(id, user).await;
    }
    // user 2 joined while eligible but left the channel before the draw
    harness
        .mock
        .set_member_status(HOME_CHANNEL, 2, MemberStatus::Left);

    harness.engine.finish(id).await.expect("finish");

    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.winner_ids.len(), 2, "only eligible participants win");
    assert!(!giveaway.winner_ids.contains(&2));

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_finish_without_participants() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(5, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");
    harness.engine.finish(id).await.expect("finish");

    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.status, GiveawayStatus::Finished);
    assert_eq!(giveaway.participants_count, 0);
    assert!(giveaway.winner_ids.is_empty());

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_supplementary_winners_exclude_existing() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(10, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");
    for user in [1, 2, 3, 4] {
        harness.engine.participants().add(id, user).await;
    }
    harness.engine.finish(id).await.expect("finish");

    let first_winner = harness.repository.get(id).await.expect("get").winner_ids[0];

    let extra = harness
        .engine
        .add_supplementary_winners(id, 2)
        .await
        .expect("supplementary");
    assert_eq!(extra.len(), 2);
    assert!(!extra.contains(&first_winner), "prior winners stay excluded");

    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.winner_ids.len(), 3);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_supplementary_winners_after_expiry() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(10, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");
    harness.engine.participants().add(id, 1).await;
    harness.engine.finish(id).await.expect("finish");

    // the 7-day retention ran out
    harness
        .engine
        .participants()
        .expire(id, Duration::seconds(-1))
        .await;

    let result = harness.engine.add_supplementary_winners(id, 1).await;
    assert!(matches!(result, Err(EngineError::NoParticipantsAvailable)));

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_deleted_post_forces_abnormal_finish() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(5, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");
    harness.engine.participants().add(id, 1).await;

    let giveaway = harness.repository.get(id).await.expect("get");
    harness.mock.kill_post(giveaway.post_ref().expect("post ref"));

    let alive = harness
        .engine
        .refresh_join_button(&giveaway)
        .await
        .expect("refresh");
    assert!(!alive);

    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.status, GiveawayStatus::Finished);
    // abnormal termination: no draw happened
    assert!(giveaway.winner_ids.is_empty());
    assert_eq!(giveaway.participants_count, 1);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_scenario_sponsor_loss_keeps_giveaway_alive() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    // two sponsors: home plus one external
    let id = harness
        .repository
        .create(&deadline_definition(None, Utc::now() + Duration::hours(1), 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");

    harness.mock.kill_channel(SPONSOR_A);
    harness
        .engine
        .channel_revoked(SPONSOR_A)
        .await
        .expect("cascade");

    // NOT finished, the remaining sponsor (the home channel) carries on
    let giveaway = harness.repository.get(id).await.expect("get");
    assert_eq!(giveaway.status, GiveawayStatus::Published);
    assert_eq!(giveaway.sponsor_channel_ids, vec![HOME_CHANNEL]);
    assert_eq!(giveaway.required_channels(), vec![HOME_CHANNEL]);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_scenario_home_loss_deletes_giveaway() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    let id = harness
        .repository
        .create(&count_definition(5, 1))
        .await
        .expect("create");
    harness.engine.publish(id).await.expect("publish");

    harness
        .engine
        .channel_revoked(HOME_CHANNEL)
        .await
        .expect("cascade");

    // deleted, not finished
    assert!(harness.repository.get(id).await.is_err());
    // the creator got a message beyond the earlier publish notification
    assert!(harness.mock.messages_to(CREATOR).len() >= 2);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_scheduler_tick_publishes_when_due() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    // scheduled in the future: the first tick leaves it untouched
    let id = harness
        .repository
        .create(&deadline_definition(
            Some(Utc::now() + Duration::minutes(10)),
            Utc::now() + Duration::hours(1),
            1,
        ))
        .await
        .expect("create");

    scheduler::run_tick(&harness.engine).await;
    assert_eq!(
        harness.repository.get(id).await.expect("get").status,
        GiveawayStatus::NotPublished
    );
    assert!(harness.mock.messages_to(HOME_CHANNEL).is_empty());

    // pull the publication time into the past; the next tick posts it
    let client = db.pool.get().await.expect("client");
    client
        .execute(
            "UPDATE giveaways SET post_at = NOW() - INTERVAL '1 minute' WHERE id = $1",
            &[&id],
        )
        .await
        .expect("backdate");

    scheduler::run_tick(&harness.engine).await;
    assert_eq!(
        harness.repository.get(id).await.expect("get").status,
        GiveawayStatus::Published
    );
    assert_eq!(harness.mock.messages_to(HOME_CHANNEL).len(), 1);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_scheduler_tick_finishes_on_deadline_and_threshold() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let harness = build_harness(&db);

    // deadline in the past
    let by_time = harness
        .repository
        .create(&deadline_definition(None, Utc::now() + Duration::hours(1), 1))
        .await
        .expect("create");
    // count threshold already met by live participants
    let by_count = harness
        .repository
        .create(&count_definition(2, 1))
        .await
        .expect("create");

    scheduler::run_tick(&harness.engine).await;
    for id in [by_time, by_count] {
        assert_eq!(
            harness.repository.get(id).await.expect("get").status,
            GiveawayStatus::Published
        );
    }

    harness.engine.participants().add(by_count, 1).await;
    harness.engine.participants().add(by_count, 2).await;
    let client = db.pool.get().await.expect("client");
    client
        .execute(
            "UPDATE giveaways SET end_at = NOW() - INTERVAL '1 minute' WHERE id = $1",
            &[&by_time],
        )
        .await
        .expect("backdate");

    scheduler::run_tick(&harness.engine).await;
    assert_eq!(
        harness.repository.get(by_time).await.expect("get").status,
        GiveawayStatus::Finished
    );
    assert_eq!(
        harness.repository.get(by_count).await.expect("get").status,
        GiveawayStatus::Finished
    );
    // the count-based giveaway drew its winner among the two participants
    let winners = harness.repository.get(by_count).await.expect("get").winner_ids;
    assert_eq!(winners.len(), 1);
    assert!(winners[0] == 1 || winners[0] == 2);

    db.cleanup().await.expect("cleanup");
}

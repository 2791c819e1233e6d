use chrono::{Duration, Utc};

use tg_giveaway::giveaway::{EndCondition, GiveawayStatus};
use tg_giveaway::repository::{GiveawayRepository, RepositoryError};

use super::test_utils::{count_definition, deadline_definition, CREATOR, HOME_CHANNEL, SPONSOR_A, SPONSOR_B};
use super::TestDatabase;

#[tokio::test]
async fn test_create_and_get_round_trip() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let id = repo.create(&count_definition(10, 2)).await.expect("create");
    let giveaway = repo.get(id).await.expect("get");

    assert_eq!(giveaway.id, id);
    assert_eq!(giveaway.creator_user_id, CREATOR);
    assert_eq!(giveaway.channel_id, HOME_CHANNEL);
    assert_eq!(giveaway.status, GiveawayStatus::NotPublished);
    assert_eq!(giveaway.end_count, Some(10));
    assert_eq!(giveaway.end_at, None);
    assert_eq!(giveaway.winners_count, 2);
    assert_eq!(giveaway.sponsor_channel_ids, vec![HOME_CHANNEL]);
    assert!(giveaway.winner_ids.is_empty());
    assert_eq!(giveaway.participants_count, 0);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_create_rejects_nonpositive_winners() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let result = repo.create(&count_definition(10, 0)).await;
    assert!(matches!(result, Err(RepositoryError::Validation(_))));

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_missing_giveaway_is_not_found() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    assert!(matches!(
        repo.get(12345).await,
        Err(RepositoryError::NotFound(12345))
    ));

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_list_due_respects_post_time() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());
    let now = Utc::now();

    // scheduled ten minutes ahead: a tick before that time must not see it
    let future_id = repo
        .create(&deadline_definition(
            Some(now + Duration::minutes(10)),
            now + Duration::hours(1),
            1,
        ))
        .await
        .expect("create scheduled");
    // no post_at means "publish immediately on save"
    let immediate_id = repo.create(&count_definition(5, 1)).await.expect("create immediate");

    let (to_publish, to_evaluate) = repo.list_due(now).await.expect("list_due");
    let due_ids: Vec<i32> = to_publish.iter().map(|g| g.id).collect();
    assert!(due_ids.contains(&immediate_id));
    assert!(!due_ids.contains(&future_id));
    assert!(to_evaluate.is_empty());

    // a tick past the scheduled time sees both
    let (to_publish, _) = repo
        .list_due(now + Duration::minutes(11))
        .await
        .expect("list_due later");
    let due_ids: Vec<i32> = to_publish.iter().map(|g| g.id).collect();
    assert!(due_ids.contains(&future_id));
    assert!(due_ids.contains(&immediate_id));

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_list_due_surfaces_published_count_based() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());
    let now = Utc::now();

    let count_id = repo.create(&count_definition(5, 1)).await.expect("create");
    let deadline_id = repo
        .create(&deadline_definition(None, now + Duration::hours(1), 1))
        .await
        .expect("create");
    for id in [count_id, deadline_id] {
        repo.transition_status(id, GiveawayStatus::Published)
            .await
            .expect("publish");
    }

    let (_, to_evaluate) = repo.list_due(now).await.expect("list_due");
    let ids: Vec<i32> = to_evaluate.iter().map(|g| g.id).collect();
    // count-based giveaways surface every tick (live counts are not visible
    // to the repository), deadline ones only when the deadline passed
    assert!(ids.contains(&count_id));
    assert!(!ids.contains(&deadline_id));

    let (_, to_evaluate) = repo
        .list_due(now + Duration::hours(2))
        .await
        .expect("list_due later");
    let ids: Vec<i32> = to_evaluate.iter().map(|g| g.id).collect();
    assert!(ids.contains(&deadline_id));

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_status_transitions_are_forward_only() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let id = repo.create(&count_definition(5, 1)).await.expect("create");

    // skipping a state is rejected
    assert!(matches!(
        repo.transition_status(id, GiveawayStatus::Finished).await,
        Err(RepositoryError::InvalidTransition { .. })
    ));

    repo.transition_status(id, GiveawayStatus::Published)
        .await
        .expect("forward step");
    // repeating the current status is a tolerated no-op (scheduler retries)
    repo.transition_status(id, GiveawayStatus::Published)
        .await
        .expect("idempotent repeat");

    // no back-transitions
    assert!(matches!(
        repo.transition_status(id, GiveawayStatus::NotPublished).await,
        Err(RepositoryError::InvalidTransition { .. })
    ));

    repo.transition_status(id, GiveawayStatus::Finished)
        .await
        .expect("finish");
    assert!(matches!(
        repo.transition_status(id, GiveawayStatus::Published).await,
        Err(RepositoryError::InvalidTransition { .. })
    ));
    assert_eq!(
        repo.get(id).await.expect("get").status,
        GiveawayStatus::Finished
    );

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_end_conditions_stay_mutually_exclusive() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let id = repo.create(&count_definition(5, 1)).await.expect("create");
    let giveaway = repo.get(id).await.expect("get");
    assert_eq!(giveaway.end_count, Some(5));
    assert_eq!(giveaway.end_at, None);

    // switching to a deadline clears the count
    let deadline = Utc::now() + Duration::hours(3);
    repo.update_end_condition(id, EndCondition::At(deadline))
        .await
        .expect("switch to time");
    let giveaway = repo.get(id).await.expect("get");
    assert_eq!(giveaway.end_count, None);
    assert!(giveaway.end_at.is_some());

    // and back again
    repo.update_end_condition(id, EndCondition::Count(20))
        .await
        .expect("switch to count");
    let giveaway = repo.get(id).await.expect("get");
    assert_eq!(giveaway.end_count, Some(20));
    assert_eq!(giveaway.end_at, None);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_winners_append_across_selections() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let id = repo.create(&count_definition(5, 2)).await.expect("create");
    repo.append_winners(id, &[11, 22]).await.expect("first batch");
    repo.append_winners(id, &[33]).await.expect("second batch");
    repo.append_winners(id, &[]).await.expect("empty batch is fine");

    let giveaway = repo.get(id).await.expect("get");
    assert_eq!(giveaway.winner_ids, vec![11, 22, 33]);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_record_publish_and_finish_fields() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let id = repo.create(&count_definition(5, 1)).await.expect("create");
    repo.record_publish(id, 77, "https://t.me/c/1000/77")
        .await
        .expect("record publish");
    repo.record_finish(id, 42).await.expect("record finish");

    let giveaway = repo.get(id).await.expect("get");
    assert_eq!(giveaway.post_message_id, Some(77));
    assert_eq!(giveaway.post_url.as_deref(), Some("https://t.me/c/1000/77"));
    assert_eq!(giveaway.participants_count, 42);

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_home_channel_cascade_deletes() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let id = repo.create(&count_definition(5, 1)).await.expect("create");
    let other = repo
        .create(&{
            let mut definition = count_definition(5, 1);
            definition.channel_id = SPONSOR_B;
            definition.sponsor_channel_ids = vec![SPONSOR_B];
            definition
        })
        .await
        .expect("create other");

    let deleted = repo
        .delete_by_home_channel(HOME_CHANNEL)
        .await
        .expect("cascade");
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].id, id);

    assert!(matches!(repo.get(id).await, Err(RepositoryError::NotFound(_))));
    // unrelated giveaways survive
    assert!(repo.get(other).await.is_ok());

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_sponsor_detachment_partition() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    // two sponsors: survives losing one
    let with_backup = repo
        .create(&{
            let mut definition = count_definition(5, 1);
            definition.sponsor_channel_ids = vec![SPONSOR_A, SPONSOR_B];
            definition
        })
        .await
        .expect("create");
    // single external sponsor: loses its last one
    let orphan = repo
        .create(&{
            let mut definition = count_definition(5, 1);
            definition.sponsor_channel_ids = vec![SPONSOR_A];
            definition
        })
        .await
        .expect("create");

    let detachment = repo.detach_sponsor_channel(SPONSOR_A).await.expect("detach");
    let updated_ids: Vec<i32> = detachment.updated.iter().map(|g| g.id).collect();
    let orphaned_ids: Vec<i32> = detachment.orphaned.iter().map(|g| g.id).collect();
    assert_eq!(updated_ids, vec![with_backup]);
    assert_eq!(orphaned_ids, vec![orphan]);

    // the requirement list actually shrank, and only where expected
    let survivor = repo.get(with_backup).await.expect("get");
    assert_eq!(survivor.sponsor_channel_ids, vec![SPONSOR_B]);
    let orphaned = repo.get(orphan).await.expect("get");
    assert!(orphaned.sponsor_channel_ids.is_empty());

    db.cleanup().await.expect("cleanup");
}

#[tokio::test]
async fn test_list_by_creator_is_newest_first() {
    let db = TestDatabase::create_fresh().await.expect("test db");
    let repo = GiveawayRepository::new(db.pool.clone());

    let first = repo.create(&count_definition(5, 1)).await.expect("create");
    let second = repo.create(&count_definition(6, 1)).await.expect("create");

    let listed = repo.list_by_creator(CREATOR).await.expect("list");
    let ids: Vec<i32> = listed.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![second, first]);

    assert!(repo.list_by_creator(1).await.expect("list other").is_empty());

    db.cleanup().await.expect("cleanup");
}

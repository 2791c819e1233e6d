use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use log::info;
use std::error::Error;
use std::fmt;
use tokio_postgres::Row;

use crate::giveaway::{
    EndCondition, Giveaway, GiveawayDefinition, GiveawayStatus, MediaAttachment, MediaKind,
};

#[derive(Debug)]
pub enum RepositoryError {
    /// bad input to create/update; surfaced to the initiating user
    Validation(String),
    NotFound(i32),
    /// status would move backward or skip a state
    InvalidTransition {
        id: i32,
        from: GiveawayStatus,
        to: GiveawayStatus,
    },
    Database(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Validation(reason) => write!(f, "invalid giveaway data: {}", reason),
            RepositoryError::NotFound(id) => write!(f, "giveaway {} not found", id),
            RepositoryError::InvalidTransition { id, from, to } => {
                write!(f, "giveaway {} cannot move from {} to {}", id, from, to)
            }
            RepositoryError::Database(err) => write!(f, "database error: {}", err),
        }
    }
}

impl Error for RepositoryError {}

impl From<tokio_postgres::Error> for RepositoryError {
    fn from(err: tokio_postgres::Error) -> Self {
        RepositoryError::Database(Box::new(err))
    }
}

impl From<deadpool_postgres::PoolError> for RepositoryError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        RepositoryError::Database(Box::new(err))
    }
}

/// result of dropping a sponsor channel from every giveaway that required it
#[derive(Debug, Default)]
pub struct SponsorDetachment {
    /// giveaways that keep running with the remaining sponsors
    pub updated: Vec<Giveaway>,
    /// giveaways that lost their last sponsor and must be concluded
    pub orphaned: Vec<Giveaway>,
}

const GIVEAWAY_COLUMNS: &str = "id, creator_user_id, channel_id, text, media_type, media_file_id, \
     button_label, sponsor_channel_ids, extra_conditions, captcha, winners_count, \
     post_at, end_at, end_count, status, post_message_id, post_url, \
     participants_count, winner_ids";

/// durable store for giveaway definitions and their lifecycle state.
/// every call acquires its own pooled connection; nothing here holds a
/// session across awaits outside a single operation.
pub struct GiveawayRepository {
    pool: Pool,
}

impl GiveawayRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    fn from_row(row: &Row) -> Result<Giveaway, RepositoryError> {
        let media_type: Option<String> = row.get(4);
        let media_file_id: Option<String> = row.get(5);
        let media = match (media_type, media_file_id) {
            (Some(kind), Some(file_id)) => {
                let kind = MediaKind::from_str(&kind).ok_or_else(|| {
                    RepositoryError::Database(format!("unknown media type: {}", kind).into())
                })?;
                Some(MediaAttachment { kind, file_id })
            }
            _ => None,
        };

        let status_text: String = row.get(14);
        let status = GiveawayStatus::from_str(&status_text).ok_or_else(|| {
            RepositoryError::Database(format!("unknown status: {}", status_text).into())
        })?;

        Ok(Giveaway {
            id: row.get(0),
            creator_user_id: row.get(1),
            channel_id: row.get(2),
            text: row.get(3),
            media,
            button_label: row.get(6),
            sponsor_channel_ids: row.get(7),
            extra_conditions: row.get(8),
            captcha: row.get(9),
            winners_count: row.get(10),
            post_at: row.get(11),
            end_at: row.get(12),
            end_count: row.get(13),
            status,
            post_message_id: row.get(15),
            post_url: row.get(16),
            participants_count: row.get(17),
            winner_ids: row.get(18),
        })
    }

    /// persists a new giveaway in NOT_PUBLISHED status
    pub async fn create(&self, definition: &GiveawayDefinition) -> Result<i32, RepositoryError> {
        if definition.winners_count <= 0 {
            return Err(RepositoryError::Validation(
                "winners count must be positive".to_string(),
            ));
        }
        if let EndCondition::Count(count) = definition.end_condition {
            if count <= 0 {
                return Err(RepositoryError::Validation(
                    "participant threshold must be positive".to_string(),
                ));
            }
        }

        let (end_at, end_count): (Option<DateTime<Utc>>, Option<i32>) =
            match definition.end_condition {
                EndCondition::At(at) => (Some(at), None),
                EndCondition::Count(count) => (None, Some(count)),
            };
        let media_type = definition.media.as_ref().map(|m| m.kind.as_str());
        let media_file_id = definition.media.as_ref().map(|m| m.file_id.as_str());

        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO giveaways (creator_user_id, channel_id, text, media_type, media_file_id, \
                     button_label, sponsor_channel_ids, extra_conditions, captcha, winners_count, \
                     post_at, end_at, end_count) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
                 RETURNING id",
                &[
                    &definition.creator_user_id,
                    &definition.channel_id,
                    &definition.text,
                    &media_type,
                    &media_file_id,
                    &definition.button_label,
                    &definition.sponsor_channel_ids,
                    &definition.extra_conditions,
                    &definition.captcha,
                    &definition.winners_count,
                    &definition.post_at,
                    &end_at,
                    &end_count,
                ],
            )
            .await?;

        let id: i32 = row.get(0);
        info!("Created giveaway {} for user {}", id, definition.creator_user_id);
        Ok(id)
    }

    pub async fn get(&self, id: i32) -> Result<Giveaway, RepositoryError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!("SELECT {} FROM giveaways WHERE id = $1", GIVEAWAY_COLUMNS),
                &[&id],
            )
            .await?
            .ok_or(RepositoryError::NotFound(id))?;
        Self::from_row(&row)
    }

    /// giveaways the scheduler should look at right now.
    /// count-based giveaways always surface while published: the repository
    /// cannot see live participant counts, the caller re-filters them.
    pub async fn list_due(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Giveaway>, Vec<Giveaway>), RepositoryError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "SELECT {} FROM giveaways \
                     WHERE (status = 'not_published' AND (post_at IS NULL OR post_at <= $1)) \
                        OR (status = 'published' AND ((end_at IS NOT NULL AND end_at <= $1) \
                            OR end_count IS NOT NULL)) \
                     ORDER BY id",
                    GIVEAWAY_COLUMNS
                ),
                &[&now],
            )
            .await?;

        let mut to_publish = Vec::new();
        let mut to_evaluate = Vec::new();
        for row in &rows {
            let giveaway = Self::from_row(row)?;
            match giveaway.status {
                GiveawayStatus::NotPublished => to_publish.push(giveaway),
                GiveawayStatus::Published => to_evaluate.push(giveaway),
                GiveawayStatus::Finished => {}
            }
        }
        Ok((to_publish, to_evaluate))
    }

    /// forward-only status change; repeating the current status is a no-op
    /// so that scheduler retries after partial failures stay safe
    pub async fn transition_status(
        &self,
        id: i32,
        new_status: GiveawayStatus,
    ) -> Result<(), RepositoryError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt("SELECT status FROM giveaways WHERE id = $1", &[&id])
            .await?
            .ok_or(RepositoryError::NotFound(id))?;
        let current_text: String = row.get(0);
        let current = GiveawayStatus::from_str(&current_text).ok_or_else(|| {
            RepositoryError::Database(format!("unknown status: {}", current_text).into())
        })?;

        if current == new_status {
            return Ok(());
        }
        if !current.can_become(new_status) {
            return Err(RepositoryError::InvalidTransition {
                id,
                from: current,
                to: new_status,
            });
        }

        let updated = client
            .execute(
                "UPDATE giveaways SET status = $2, updated_at = NOW() \
                 WHERE id = $1 AND status = $3",
                &[&id, &new_status.as_str(), &current.as_str()],
            )
            .await?;
        if updated == 0 {
            // lost a race; a concurrent writer either made the same
            // transition (fine) or moved further (backward for us)
            let now_current = self.get(id).await?.status;
            if now_current == new_status {
                return Ok(());
            }
            return Err(RepositoryError::InvalidTransition {
                id,
                from: now_current,
                to: new_status,
            });
        }
        info!("Giveaway {} moved to status {}", id, new_status);
        Ok(())
    }

    pub async fn record_publish(
        &self,
        id: i32,
        post_message_id: i32,
        post_url: &str,
    ) -> Result<(), RepositoryError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE giveaways SET post_message_id = $2, post_url = $3, updated_at = NOW() \
                 WHERE id = $1",
                &[&id, &post_message_id, &post_url],
            )
            .await?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    pub async fn record_finish(
        &self,
        id: i32,
        participants_count: i32,
    ) -> Result<(), RepositoryError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE giveaways SET participants_count = $2, updated_at = NOW() WHERE id = $1",
                &[&id, &participants_count],
            )
            .await?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    /// winners accumulate; supplementary selections extend the list
    pub async fn append_winners(&self, id: i32, winners: &[i64]) -> Result<(), RepositoryError> {
        if winners.is_empty() {
            return Ok(());
        }
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE giveaways SET winner_ids = winner_ids || $2, updated_at = NOW() \
                 WHERE id = $1",
                &[&id, &winners],
            )
            .await?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    /// swaps the end condition, clearing the other one; the two are never
    /// both set
    pub async fn update_end_condition(
        &self,
        id: i32,
        condition: EndCondition,
    ) -> Result<(), RepositoryError> {
        let (end_at, end_count): (Option<DateTime<Utc>>, Option<i32>) = match condition {
            EndCondition::At(at) => (Some(at), None),
            EndCondition::Count(count) => {
                if count <= 0 {
                    return Err(RepositoryError::Validation(
                        "participant threshold must be positive".to_string(),
                    ));
                }
                (None, Some(count))
            }
        };
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE giveaways SET end_at = $2, end_count = $3, updated_at = NOW() \
                 WHERE id = $1",
                &[&id, &end_at, &end_count],
            )
            .await?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    /// true if a row was actually removed
    pub async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM giveaways WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }

    /// id, text and status of a creator's giveaways, newest first
    pub async fn list_by_creator(
        &self,
        creator_user_id: i64,
    ) -> Result<Vec<Giveaway>, RepositoryError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "SELECT {} FROM giveaways WHERE creator_user_id = $1 ORDER BY id DESC",
                    GIVEAWAY_COLUMNS
                ),
                &[&creator_user_id],
            )
            .await?;
        rows.iter().map(Self::from_row).collect()
    }

    /// cascade for a home channel the bot lost: the giveaways cannot exist
    /// without their channel, so they are removed outright. returns the
    /// deleted rows so creators can be told.
    pub async fn delete_by_home_channel(
        &self,
        channel_id: i64,
    ) -> Result<Vec<Giveaway>, RepositoryError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "DELETE FROM giveaways WHERE channel_id = $1 RETURNING {}",
                    GIVEAWAY_COLUMNS
                ),
                &[&channel_id],
            )
            .await?;
        let deleted = rows
            .iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        if !deleted.is_empty() {
            info!(
                "Deleted {} giveaways of removed home channel {}",
                deleted.len(),
                channel_id
            );
        }
        Ok(deleted)
    }

    /// drops a sponsor channel from every unfinished giveaway that required
    /// it (home channels are handled by `delete_by_home_channel`)
    pub async fn detach_sponsor_channel(
        &self,
        channel_id: i64,
    ) -> Result<SponsorDetachment, RepositoryError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "UPDATE giveaways \
                     SET sponsor_channel_ids = array_remove(sponsor_channel_ids, $1), \
                         updated_at = NOW() \
                     WHERE sponsor_channel_ids @> ARRAY[$1]::BIGINT[] \
                       AND channel_id <> $1 \
                       AND status <> 'finished' \
                     RETURNING {}",
                    GIVEAWAY_COLUMNS
                ),
                &[&channel_id],
            )
            .await?;

        let mut detachment = SponsorDetachment::default();
        for row in &rows {
            let giveaway = Self::from_row(row)?;
            if giveaway.sponsor_channel_ids.is_empty() {
                detachment.orphaned.push(giveaway);
            } else {
                detachment.updated.push(giveaway);
            }
        }
        Ok(detachment)
    }
}

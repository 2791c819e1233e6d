use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::{channel_hyperlink, ChannelRef};
use crate::deep_link;
use crate::giveaway::{Giveaway, GiveawayStatus};
use crate::keyboards;
use crate::localization::Lang;
use crate::operator_log::OperatorLog;
use crate::participants::{ParticipantStore, RETENTION};
use crate::repository::{GiveawayRepository, RepositoryError};
use crate::selection::select_winners;
use crate::subscription::SubscriptionVerifier;
use crate::transport::{Messenger, TransportError};
use crate::user_manager::UserManager;

/// pause between consecutive outbound telegram calls
pub const SEND_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum EngineError {
    Repository(RepositoryError),
    Transport(TransportError),
    /// the participant set expired or was never populated
    NoParticipantsAvailable,
    /// the requested transition does not apply to the giveaway's state
    WrongState {
        id: i32,
        status: GiveawayStatus,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Repository(err) => write!(f, "{}", err),
            EngineError::Transport(err) => write!(f, "{}", err),
            EngineError::NoParticipantsAvailable => {
                write!(f, "participant list is no longer available")
            }
            EngineError::WrongState { id, status } => {
                write!(f, "giveaway {} is in status {}", id, status)
            }
        }
    }
}

impl Error for EngineError {}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        EngineError::Repository(err)
    }
}

impl From<TransportError> for EngineError {
    fn from(err: TransportError) -> Self {
        EngineError::Transport(err)
    }
}

/// drives the giveaway state machine: NOT_PUBLISHED → PUBLISHED → FINISHED.
///
/// side effects of a transition run before the durable status write; the
/// forward-only, no-op-on-repeat status transition makes a retried attempt
/// safe at the data level, while a crash between "announce" and "record"
/// can replay the announcement (a documented property of this design).
#[derive(Clone)]
pub struct GiveawayEngine {
    repository: Arc<GiveawayRepository>,
    participants: ParticipantStore,
    messenger: Arc<dyn Messenger>,
    verifier: SubscriptionVerifier,
    users: Arc<UserManager>,
    operator_log: OperatorLog,
}

impl GiveawayEngine {
    pub fn new(
        repository: Arc<GiveawayRepository>,
        participants: ParticipantStore,
        messenger: Arc<dyn Messenger>,
        verifier: SubscriptionVerifier,
        users: Arc<UserManager>,
        operator_log: OperatorLog,
    ) -> Self {
        Self {
            repository,
            participants,
            messenger,
            verifier,
            users,
            operator_log,
        }
    }

    pub fn participants(&self) -> &ParticipantStore {
        &self.participants
    }

    pub fn repository(&self) -> &Arc<GiveawayRepository> {
        &self.repository
    }

    pub fn verifier(&self) -> &SubscriptionVerifier {
        &self.verifier
    }

    /// renders the public giveaway post: text, conditions block, deadline line
    pub async fn render_post_text(&self, giveaway: &Giveaway) -> String {
        let lang = Lang::default();
        let mut text = giveaway.text.clone();
        text.push_str(lang.conditions_header());
        for channel_id in giveaway.required_channels() {
            match ChannelRef::from(channel_id).resolve(&self.messenger).await {
                Ok(info) => {
                    text.push_str(&lang.subscribe_condition(&channel_hyperlink(&info)))
                }
                Err(err) => {
                    warn!("channel {} is not renderable: {}", channel_id, err);
                    text.push_str(lang.subscribe_condition_unavailable());
                }
            }
        }
        if let Some(extra) = &giveaway.extra_conditions {
            text.push('\n');
            text.push_str(extra);
            text.push_str("\n\n");
        }
        match (giveaway.end_at, giveaway.end_count) {
            (Some(end_at), _) => text.push_str(&lang.results_at_time(end_at)),
            (None, Some(end_count)) => text.push_str(&lang.results_at_count(end_count)),
            (None, None) => {}
        }
        text
    }

    async fn join_keyboard(&self, giveaway: &Giveaway) -> teloxide::types::InlineKeyboardMarkup {
        let count = self.participants.count(giveaway.id).await;
        let link = deep_link::join_link(self.messenger.bot_username(), giveaway.id);
        keyboards::join_button(&giveaway.button_label, count, &link)
    }

    /// NOT_PUBLISHED → PUBLISHED. if the post cannot be created the giveaway
    /// is deleted and the creator is told why: without a post there is no
    /// join link, so the giveaway must not reach PUBLISHED.
    pub async fn publish(&self, giveaway_id: i32) -> Result<(), EngineError> {
        let giveaway = self.repository.get(giveaway_id).await?;
        if giveaway.status != GiveawayStatus::NotPublished {
            return Ok(());
        }

        let text = self.render_post_text(&giveaway).await;
        let keyboard = self.join_keyboard(&giveaway).await;
        let sent = match &giveaway.media {
            Some(media) => {
                self.messenger
                    .send_media(giveaway.channel_id, media, &text, Some(keyboard))
                    .await
            }
            None => {
                self.messenger
                    .send_message(giveaway.channel_id, &text, Some(keyboard))
                    .await
            }
        };

        let post = match sent {
            Ok(post) => post,
            Err(err) => {
                error!("failed to post giveaway {}: {}", giveaway_id, err);
                self.repository.delete(giveaway_id).await?;
                self.participants.remove(giveaway_id).await;
                let lang = Lang::default();
                let notice = lang.publish_failed(giveaway_id, &err.to_string());
                if let Err(notify_err) = self
                    .messenger
                    .send_message(giveaway.creator_user_id, &notice, None)
                    .await
                {
                    warn!(
                        "could not notify creator {} about failed publish: {}",
                        giveaway.creator_user_id, notify_err
                    );
                }
                self.operator_log
                    .alert(&format!(
                        "Giveaway {} deleted: posting to channel {} failed: {}",
                        giveaway_id, giveaway.channel_id, err
                    ))
                    .await;
                return Ok(());
            }
        };

        let url = deep_link::post_url(post.chat_id, post.message_id);
        self.participants.create(giveaway_id).await;
        self.repository
            .record_publish(giveaway_id, post.message_id, &url)
            .await?;
        self.repository
            .transition_status(giveaway_id, GiveawayStatus::Published)
            .await?;

        let notice = Lang::default().publish_notification(giveaway_id, &url);
        if let Err(err) = self
            .messenger
            .send_message(giveaway.creator_user_id, &notice, None)
            .await
        {
            warn!(
                "could not notify creator {} about publish: {}",
                giveaway.creator_user_id, err
            );
        }
        info!("Published giveaway {} to channel {}", giveaway_id, giveaway.channel_id);
        Ok(())
    }

    /// refreshes the participant counter on the join button. returns false
    /// when the post turned out to be gone and the giveaway was closed.
    pub async fn refresh_join_button(&self, giveaway: &Giveaway) -> Result<bool, EngineError> {
        let post = match giveaway.post_ref() {
            Some(post) => post,
            None => return Ok(true),
        };
        let keyboard = self.join_keyboard(giveaway).await;
        match self.messenger.edit_buttons(&post, keyboard).await {
            Ok(()) => Ok(true),
            Err(TransportError::NotFound) => {
                self.handle_post_deleted(giveaway).await?;
                Ok(false)
            }
            Err(TransportError::Forbidden) => {
                self.operator_log
                    .alert(&format!(
                        "Cannot update the join button of giveaway {}: the bot was \
                         removed from channel {}",
                        giveaway.id, giveaway.channel_id
                    ))
                    .await;
                Ok(true)
            }
            Err(err) => {
                self.operator_log
                    .alert(&format!(
                        "Failed to update the join button of giveaway {}: {}",
                        giveaway.id, err
                    ))
                    .await;
                Ok(true)
            }
        }
    }

    /// the published post no longer exists: close the giveaway without a
    /// draw and tell the creator. behaves as an abnormal termination.
    async fn handle_post_deleted(&self, giveaway: &Giveaway) -> Result<(), EngineError> {
        warn!("post of giveaway {} was deleted, closing it", giveaway.id);
        let count = self.participants.count(giveaway.id).await as i32;
        self.repository
            .transition_status(giveaway.id, GiveawayStatus::Finished)
            .await?;
        self.repository.record_finish(giveaway.id, count).await?;
        self.participants.expire(giveaway.id, RETENTION).await;
        let notice = Lang::default().post_deleted_notice(giveaway.id);
        if let Err(err) = self
            .messenger
            .send_message(giveaway.creator_user_id, &notice, None)
            .await
        {
            warn!(
                "could not notify creator {} about deleted post: {}",
                giveaway.creator_user_id, err
            );
        }
        Ok(())
    }

    /// mention for a winner, preferring the stored profile over a bare id
    pub async fn mention(&self, user_id: i64) -> String {
        match self.users.get_user(user_id).await {
            Ok(Some(user)) => user.mention(),
            _ => format!("<a href='tg://user?id={}'>{}</a>", user_id, user_id),
        }
    }

    async fn numbered_mentions(&self, user_ids: &[i64]) -> String {
        let mut lines = Vec::with_capacity(user_ids.len());
        for (index, user_id) in user_ids.iter().enumerate() {
            lines.push(format!("{}.{}", index + 1, self.mention(*user_id).await));
        }
        lines.join("\n")
    }

    /// PUBLISHED → FINISHED: draw winners among participants who still hold
    /// the required subscriptions and announce them under the original post.
    pub async fn finish(&self, giveaway_id: i32) -> Result<(), EngineError> {
        let giveaway = self.repository.get(giveaway_id).await?;
        match giveaway.status {
            GiveawayStatus::Finished => return Ok(()),
            GiveawayStatus::NotPublished => {
                return Err(EngineError::WrongState {
                    id: giveaway_id,
                    status: giveaway.status,
                })
            }
            GiveawayStatus::Published => {}
        }

        // one last counter refresh so the frozen post shows the final number
        if !self.refresh_join_button(&giveaway).await? {
            return Ok(()); // post is gone, the giveaway was already closed
        }
        tokio::time::sleep(SEND_DELAY).await;

        let lang = Lang::default();
        let participants = self
            .participants
            .members(giveaway_id)
            .await
            .unwrap_or_default();
        if participants.is_empty() {
            let results_message = self
                .announce(&giveaway, lang.finished_no_participants())
                .await?;
            let results_url =
                deep_link::post_url(results_message.chat_id, results_message.message_id);
            let creator_notice = lang.finish_notification(giveaway_id, &results_url);
            if let Err(err) = self
                .messenger
                .send_message(giveaway.creator_user_id, &creator_notice, None)
                .await
            {
                warn!(
                    "could not notify creator {} about finish: {}",
                    giveaway.creator_user_id, err
                );
            }
            self.repository
                .transition_status(giveaway_id, GiveawayStatus::Finished)
                .await?;
            self.repository.record_finish(giveaway_id, 0).await?;
            self.participants.expire(giveaway_id, RETENTION).await;
            info!("Giveaway {} finished without participants", giveaway_id);
            return Ok(());
        }

        let required = giveaway.required_channels();
        let verifier = self.verifier.clone();
        let winners = select_winners(
            &participants,
            giveaway.winners_count as usize,
            &HashSet::new(),
            |user_id| {
                let verifier = verifier.clone();
                let required = required.clone();
                async move { verifier.is_subscribed(&required, user_id).await }
            },
        )
        .await;

        let mut announcement = if winners.is_empty() {
            lang.finished_no_eligible().to_string()
        } else {
            lang.finished_with_winners(&self.numbered_mentions(&winners).await)
        };
        let verify = deep_link::verify_link(self.messenger.bot_username(), giveaway_id);
        let verify_anchor = format!("<a href='{}'>{}</a>", verify, lang.verify_results_label());
        announcement.push_str(&verify_anchor);

        let results_message = self.announce(&giveaway, &announcement).await?;
        let results_url = deep_link::post_url(results_message.chat_id, results_message.message_id);

        // private winner notifications are best-effort per recipient
        for winner in &winners {
            tokio::time::sleep(SEND_DELAY).await;
            let congrats = lang.winner_congrats(&results_url, &verify_anchor);
            if let Err(err) = self.messenger.send_message(*winner, &congrats, None).await {
                warn!("could not congratulate winner {}: {}", winner, err);
            }
        }

        let creator_notice = lang.finish_notification(giveaway_id, &results_url);
        if let Err(err) = self
            .messenger
            .send_message(giveaway.creator_user_id, &creator_notice, None)
            .await
        {
            warn!(
                "could not notify creator {} about finish: {}",
                giveaway.creator_user_id, err
            );
        }

        self.repository
            .transition_status(giveaway_id, GiveawayStatus::Finished)
            .await?;
        self.repository
            .record_finish(giveaway_id, participants.len() as i32)
            .await?;
        self.repository.append_winners(giveaway_id, &winners).await?;
        self.participants.expire(giveaway_id, RETENTION).await;
        info!(
            "Giveaway {} finished with {} winner(s) out of {} participant(s)",
            giveaway_id,
            winners.len(),
            participants.len()
        );
        Ok(())
    }

    /// sends the results under the original post, falling back to a plain
    /// channel message when the post is gone
    async fn announce(
        &self,
        giveaway: &Giveaway,
        text: &str,
    ) -> Result<crate::transport::MessageRef, EngineError> {
        if let Some(post) = giveaway.post_ref() {
            match self
                .messenger
                .send_reply(giveaway.channel_id, post.message_id, text, None)
                .await
            {
                Ok(message) => return Ok(message),
                Err(TransportError::NotFound) => {
                    // reply target vanished, announce without the reply
                }
                Err(err) => {
                    self.operator_log
                        .alert(&format!(
                            "Failed to announce results of giveaway {} in channel {}: {}",
                            giveaway.id, giveaway.channel_id, err
                        ))
                        .await;
                    return Err(err.into());
                }
            }
        }
        match self
            .messenger
            .send_message(giveaway.channel_id, text, None)
            .await
        {
            Ok(message) => Ok(message),
            Err(err) => {
                self.operator_log
                    .alert(&format!(
                        "Failed to announce results of giveaway {} in channel {}: {}",
                        giveaway.id, giveaway.channel_id, err
                    ))
                    .await;
                Err(err.into())
            }
        }
    }

    /// draws additional distinct winners after the giveaway finished.
    /// works off the retained participant snapshot, which may have expired.
    pub async fn add_supplementary_winners(
        &self,
        giveaway_id: i32,
        count: usize,
    ) -> Result<Vec<i64>, EngineError> {
        let giveaway = self.repository.get(giveaway_id).await?;
        if giveaway.status != GiveawayStatus::Finished {
            return Err(EngineError::WrongState {
                id: giveaway_id,
                status: giveaway.status,
            });
        }

        let participants = self
            .participants
            .members(giveaway_id)
            .await
            .filter(|members| !members.is_empty())
            .ok_or(EngineError::NoParticipantsAvailable)?;

        let already: HashSet<i64> = giveaway.winner_ids.iter().copied().collect();
        let required = giveaway.required_channels();
        let verifier = self.verifier.clone();
        let winners = select_winners(&participants, count, &already, |user_id| {
            let verifier = verifier.clone();
            let required = required.clone();
            async move { verifier.is_subscribed(&required, user_id).await }
        })
        .await;

        self.repository.append_winners(giveaway_id, &winners).await?;
        Ok(winners)
    }

    /// the bot lost a channel: home giveaways are deleted outright, sponsor
    /// requirements are dropped, and giveaways that lost their last sponsor
    /// are concluded with whatever participants they have.
    pub async fn channel_revoked(&self, channel_id: i64) -> Result<(), EngineError> {
        let lang = Lang::default();

        let deleted = self.repository.delete_by_home_channel(channel_id).await?;
        for giveaway in &deleted {
            self.participants.remove(giveaway.id).await;
            if let Err(err) = self
                .messenger
                .send_message(giveaway.creator_user_id, lang.home_channel_removed(), None)
                .await
            {
                warn!(
                    "could not notify creator {} about removed channel: {}",
                    giveaway.creator_user_id, err
                );
            }
        }
        if !deleted.is_empty() {
            self.operator_log
                .alert(&format!(
                    "Channel {} became unavailable; {} giveaway(s) deleted",
                    channel_id,
                    deleted.len()
                ))
                .await;
        }

        let detachment = self.repository.detach_sponsor_channel(channel_id).await?;
        for giveaway in &detachment.updated {
            if let Err(err) = self
                .messenger
                .send_message(
                    giveaway.creator_user_id,
                    &lang.sponsor_channel_removed(giveaway.id),
                    None,
                )
                .await
            {
                warn!(
                    "could not notify creator {} about dropped sponsor: {}",
                    giveaway.creator_user_id, err
                );
            }
        }
        for giveaway in &detachment.orphaned {
            if giveaway.status == GiveawayStatus::Published {
                if let Err(err) = self.finish(giveaway.id).await {
                    error!(
                        "failed to force-finish orphaned giveaway {}: {}",
                        giveaway.id, err
                    );
                }
            }
        }
        Ok(())
    }
}

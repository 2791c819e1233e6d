use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::error::Error;
use std::fmt;

use crate::giveaway::{EndCondition, GiveawayDefinition, MediaAttachment};

/// the bot speaks moscow time (GMT+3) to giveaway owners
const UTC_OFFSET_SECS: i32 = 3 * 3600;
/// scheduled publication must be at least this far in the future
pub const MIN_POST_LEAD: Duration = Duration::minutes(5);
/// a deadline must leave at least this much room after publication
pub const MIN_END_GAP: Duration = Duration::minutes(1);

/// which input the creation dialog is waiting for next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStep {
    /// post text plus an optional single media attachment
    CollectContent,
    /// join-button label (preset callback or free text)
    ChooseButton,
    /// sponsor channels, finished via callback
    CollectSponsors,
    ChooseWinnersCount,
    /// which of the owner's channels hosts the post
    ChooseChannel,
    /// advisory extra conditions, or skip
    CollectExtraConditions,
    /// publish now vs schedule
    ChoosePostTime,
    AwaitPostTimeInput,
    /// end by time vs by participant count
    ChooseEndKind,
    AwaitEndTimeInput,
    AwaitEndCountInput,
    /// preview shown, captcha toggle + save
    ConfirmCaptcha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTime {
    Now,
    At(DateTime<Utc>),
}

/// accumulating builder for the creation dialog. all reads of collected
/// values go through `try_into_definition`, which refuses to produce a
/// `GiveawayDefinition` until every required step happened.
#[derive(Debug, Clone)]
pub struct GiveawayDraft {
    pub creator_user_id: i64,
    pub step: CreationStep,
    pub text: Option<String>,
    pub media: Option<MediaAttachment>,
    pub button_label: Option<String>,
    pub sponsor_channel_ids: Vec<i64>,
    pub winners_count: Option<i32>,
    pub channel_id: Option<i64>,
    pub extra_conditions: Option<String>,
    pub post_time: Option<PostTime>,
    pub end_condition: Option<EndCondition>,
    pub captcha: bool,
    /// last media group seen, to warn about multi-media albums only once
    pub seen_media_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    MissingText,
    MissingButton,
    MissingWinnersCount,
    MissingChannel,
    MissingPostTime,
    MissingEndCondition,
    /// a count-based end below the winner count can never pay out fully
    EndCountBelowWinners { winners: i32, end_count: i32 },
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::MissingText => write!(f, "giveaway text was not collected"),
            DraftError::MissingButton => write!(f, "button label was not collected"),
            DraftError::MissingWinnersCount => write!(f, "winners count was not collected"),
            DraftError::MissingChannel => write!(f, "home channel was not chosen"),
            DraftError::MissingPostTime => write!(f, "publication time was not chosen"),
            DraftError::MissingEndCondition => write!(f, "end condition was not chosen"),
            DraftError::EndCountBelowWinners { winners, end_count } => write!(
                f,
                "end count {} is below the winners count {}",
                end_count, winners
            ),
        }
    }
}

impl Error for DraftError {}

impl GiveawayDraft {
    pub fn new(creator_user_id: i64) -> Self {
        Self {
            creator_user_id,
            step: CreationStep::CollectContent,
            text: None,
            media: None,
            button_label: None,
            sponsor_channel_ids: Vec::new(),
            winners_count: None,
            channel_id: None,
            extra_conditions: None,
            post_time: None,
            end_condition: None,
            captcha: false,
            seen_media_group: None,
        }
    }

    /// records the home channel, which also becomes a required subscription
    pub fn choose_channel(&mut self, channel_id: i64) {
        self.channel_id = Some(channel_id);
        if !self.sponsor_channel_ids.contains(&channel_id) {
            self.sponsor_channel_ids.push(channel_id);
        }
    }

    /// true if the sponsor was new
    pub fn add_sponsor(&mut self, channel_id: i64) -> bool {
        if self.sponsor_channel_ids.contains(&channel_id) {
            return false;
        }
        self.sponsor_channel_ids.push(channel_id);
        true
    }

    pub fn try_into_definition(self) -> Result<GiveawayDefinition, DraftError> {
        let text = self.text.ok_or(DraftError::MissingText)?;
        let button_label = self.button_label.ok_or(DraftError::MissingButton)?;
        let winners_count = self.winners_count.ok_or(DraftError::MissingWinnersCount)?;
        let channel_id = self.channel_id.ok_or(DraftError::MissingChannel)?;
        let post_time = self.post_time.ok_or(DraftError::MissingPostTime)?;
        let end_condition = self.end_condition.ok_or(DraftError::MissingEndCondition)?;

        if let EndCondition::Count(end_count) = end_condition {
            if end_count < winners_count {
                return Err(DraftError::EndCountBelowWinners {
                    winners: winners_count,
                    end_count,
                });
            }
        }

        Ok(GiveawayDefinition {
            creator_user_id: self.creator_user_id,
            channel_id,
            text,
            media: self.media,
            button_label,
            sponsor_channel_ids: self.sponsor_channel_ids,
            extra_conditions: self.extra_conditions,
            captcha: self.captcha,
            winners_count,
            post_at: match post_time {
                PostTime::Now => None,
                PostTime::At(at) => Some(at),
            },
            end_condition,
        })
    }
}

fn bot_timezone() -> FixedOffset {
    FixedOffset::east_opt(UTC_OFFSET_SECS).expect("static offset")
}

/// parses owner input in the `dd.mm.yyyy hh:mm` format the bot advertises,
/// interpreting it in the bot's timezone
pub fn parse_user_datetime(text: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), "%d.%m.%Y %H:%M").ok()?;
    let local = bot_timezone().from_local_datetime(&naive).single()?;
    Some(local.with_timezone(&Utc))
}

pub fn format_user_datetime(at: DateTime<Utc>) -> String {
    at.with_timezone(&bot_timezone())
        .format("%d.%m.%Y %H:%M")
        .to_string()
}

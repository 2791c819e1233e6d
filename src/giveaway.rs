use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// giveaway lifecycle states, strictly forward-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GiveawayStatus {
    NotPublished,
    Published,
    Finished,
}

impl GiveawayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiveawayStatus::NotPublished => "not_published",
            GiveawayStatus::Published => "published",
            GiveawayStatus::Finished => "finished",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "not_published" => Some(GiveawayStatus::NotPublished),
            "published" => Some(GiveawayStatus::Published),
            "finished" => Some(GiveawayStatus::Finished),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            GiveawayStatus::NotPublished => 0,
            GiveawayStatus::Published => 1,
            GiveawayStatus::Finished => 2,
        }
    }

    /// whether moving from self to `next` is a legal forward step.
    /// staying in place is allowed so that scheduler retries are no-ops.
    pub fn can_become(&self, next: GiveawayStatus) -> bool {
        next.rank() >= self.rank() && next.rank() - self.rank() <= 1
    }
}

impl fmt::Display for GiveawayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
    Animation,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Animation => "animation",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "photo" => Some(MediaKind::Photo),
            "video" => Some(MediaKind::Video),
            "animation" => Some(MediaKind::Animation),
            _ => None,
        }
    }
}

/// single media attachment referenced by its telegram file id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub file_id: String,
}

/// how a giveaway concludes: at an absolute deadline or when enough
/// participants joined. never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCondition {
    At(DateTime<Utc>),
    Count(i32),
}

/// validated definition produced by the creation flow; everything the
/// repository needs to persist a NOT_PUBLISHED giveaway
#[derive(Debug, Clone)]
pub struct GiveawayDefinition {
    pub creator_user_id: i64,
    pub channel_id: i64,
    pub text: String,
    pub media: Option<MediaAttachment>,
    pub button_label: String,
    pub sponsor_channel_ids: Vec<i64>,
    pub extra_conditions: Option<String>,
    pub captcha: bool,
    pub winners_count: i32,
    pub post_at: Option<DateTime<Utc>>,
    pub end_condition: EndCondition,
}

#[derive(Debug, Clone)]
pub struct Giveaway {
    pub id: i32,
    pub creator_user_id: i64,
    pub channel_id: i64,
    pub text: String,
    pub media: Option<MediaAttachment>,
    pub button_label: String,
    pub sponsor_channel_ids: Vec<i64>,
    pub extra_conditions: Option<String>,
    pub captcha: bool,
    pub winners_count: i32,
    pub post_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub end_count: Option<i32>,
    pub status: GiveawayStatus,
    pub post_message_id: Option<i32>,
    pub post_url: Option<String>,
    pub participants_count: i32,
    pub winner_ids: Vec<i64>,
}

impl Giveaway {
    /// the channels a participant must currently be subscribed to.
    /// the home channel is implicitly required unless it is already in the
    /// sponsor list; order follows the displayed conditions block.
    pub fn required_channels(&self) -> Vec<i64> {
        let mut required = Vec::with_capacity(self.sponsor_channel_ids.len() + 1);
        if !self.sponsor_channel_ids.contains(&self.channel_id) {
            required.push(self.channel_id);
        }
        required.extend_from_slice(&self.sponsor_channel_ids);
        required
    }

    pub fn end_condition(&self) -> Option<EndCondition> {
        match (self.end_at, self.end_count) {
            (Some(at), None) => Some(EndCondition::At(at)),
            (None, Some(count)) => Some(EndCondition::Count(count)),
            _ => None,
        }
    }

    /// reference to the published post, if publishing already happened
    pub fn post_ref(&self) -> Option<crate::transport::MessageRef> {
        self.post_message_id.map(|message_id| crate::transport::MessageRef {
            chat_id: self.channel_id,
            message_id,
        })
    }
}

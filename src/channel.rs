use std::sync::Arc;

use crate::transport::{ChannelInfo, Messenger, TransportError};

/// a channel-like value as it travels through the core: sometimes just a raw
/// id (stored sponsor lists), sometimes an already-resolved record (handler
/// updates). one normalization point instead of duck typing.
#[derive(Debug, Clone)]
pub enum ChannelRef {
    Id(i64),
    Resolved(ChannelInfo),
}

impl ChannelRef {
    pub fn id(&self) -> i64 {
        match self {
            ChannelRef::Id(id) => *id,
            ChannelRef::Resolved(info) => info.id,
        }
    }

    /// resolves the reference through the transport if needed
    pub async fn resolve(
        self,
        messenger: &Arc<dyn Messenger>,
    ) -> Result<ChannelInfo, TransportError> {
        match self {
            ChannelRef::Resolved(info) => Ok(info),
            ChannelRef::Id(id) => messenger.channel_info(id).await,
        }
    }
}

impl From<i64> for ChannelRef {
    fn from(id: i64) -> Self {
        ChannelRef::Id(id)
    }
}

impl From<ChannelInfo> for ChannelRef {
    fn from(info: ChannelInfo) -> Self {
        ChannelRef::Resolved(info)
    }
}

/// `<a href>` hyperlink for a channel, falling back to the bare title when
/// the invite link is unavailable
pub fn channel_hyperlink(info: &ChannelInfo) -> String {
    let title = html_escape::encode_text(&info.title);
    match &info.invite_link {
        Some(link) => format!("<a href='{}'>{}</a>", link, title),
        None => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_uniform_across_variants() {
        assert_eq!(ChannelRef::Id(-100500).id(), -100500);
        let resolved = ChannelRef::Resolved(ChannelInfo {
            id: -100500,
            title: "News".to_string(),
            invite_link: None,
        });
        assert_eq!(resolved.id(), -100500);
    }

    #[test]
    fn hyperlink_escapes_title() {
        let info = ChannelInfo {
            id: 1,
            title: "A <b> channel".to_string(),
            invite_link: Some("https://t.me/+abc".to_string()),
        };
        let link = channel_hyperlink(&info);
        assert!(link.contains("A &lt;b&gt; channel"));
        assert!(link.starts_with("<a href='https://t.me/+abc'>"));
    }
}

use log::{error, info};
use teloxide::prelude::*;
use teloxide::types::{ChatMemberKind, ChatMemberUpdated};

use crate::bot::BotContext;

pub struct MembershipHandler;

impl MembershipHandler {
    /// the bot's own membership in a channel changed. losing admin rights
    /// means subscription checks and button updates stop working there, so
    /// the giveaway cascade runs immediately instead of waiting for the
    /// next failed API call.
    pub async fn handle_my_chat_member(
        ctx: BotContext,
        update: ChatMemberUpdated,
    ) -> ResponseResult<()> {
        if !update.chat.is_channel() {
            return Ok(());
        }
        let channel_id = update.chat.id.0;

        let was_admin = matches!(update.old_chat_member.kind, ChatMemberKind::Administrator(_));
        let lost_admin = was_admin
            && !matches!(update.new_chat_member.kind, ChatMemberKind::Administrator(_));
        let removed = matches!(
            update.new_chat_member.kind,
            ChatMemberKind::Left | ChatMemberKind::Banned(_)
        );

        if lost_admin || removed {
            info!(
                "bot lost access to channel {} (demoted: {}, removed: {})",
                channel_id, lost_admin, removed
            );
            if let Err(err) = ctx.engine.channel_revoked(channel_id).await {
                error!("channel cascade for {} failed: {}", channel_id, err);
            }
        }
        Ok(())
    }
}

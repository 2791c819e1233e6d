use log::error;
use teloxide::prelude::*;

use crate::bot::{BotContext, Command};
use crate::conversation::UserConversation;
use crate::deep_link::{self, StartAction};
use crate::giveaway::GiveawayStatus;
use crate::handlers::{CallbackHandler, CreationHandler, JoinHandler};
use crate::keyboards;
use crate::localization::Lang;
use crate::repository::RepositoryError;

/// telegram caps messages at 4096 UTF-16 code units; stay under it when
/// assembling giveaway listings
const MAX_MESSAGE_LENGTH: usize = 4096;

pub struct CommandHandler;

impl CommandHandler {
    pub async fn handle_command(ctx: BotContext, msg: Message, cmd: Command) -> ResponseResult<()> {
        let lang = Lang::from_code(
            msg.from
                .as_ref()
                .and_then(|user| user.language_code.as_deref()),
        );
        match cmd {
            Command::Start => Self::handle_start(&ctx, &msg, lang).await,
            Command::NewGive => CreationHandler::start(&ctx, &msg, lang).await,
            Command::MyGives => Self::handle_my_gives(&ctx, &msg, lang).await,
            Command::Cancel => Self::handle_cancel(&ctx, &msg, lang).await,
        }
    }

    /// /start: either a deep-link action or the welcome text
    async fn handle_start(ctx: &BotContext, msg: &Message, lang: Lang) -> ResponseResult<()> {
        let user = match msg.from.as_ref() {
            Some(user) => user,
            None => return Ok(()),
        };
        let user_id = user.id.0 as i64;

        if let Err(err) = ctx
            .users
            .get_or_create_user(user_id, user.username.as_deref(), Some(&user.first_name))
            .await
        {
            error!("failed to store user {}: {}", user_id, err);
        }

        let args = msg
            .text()
            .and_then(|text| text.strip_prefix("/start"))
            .map(str::trim)
            .unwrap_or_default();
        match deep_link::parse_start_args(args) {
            Some(StartAction::JoinGiveaway(giveaway_id)) => {
                JoinHandler::handle_join(ctx, msg, giveaway_id, lang).await
            }
            Some(StartAction::CheckGiveaway(giveaway_id)) => {
                Self::handle_check(ctx, msg, giveaway_id, lang).await
            }
            None => {
                ctx.send_text(msg.chat.id.0, lang.start_welcome()).await;
                Ok(())
            }
        }
    }

    /// public verification link: audit text of a finished giveaway
    async fn handle_check(
        ctx: &BotContext,
        msg: &Message,
        giveaway_id: i32,
        lang: Lang,
    ) -> ResponseResult<()> {
        let chat_id = msg.chat.id.0;
        let giveaway = match ctx.repository.get(giveaway_id).await {
            Ok(giveaway) => giveaway,
            Err(RepositoryError::NotFound(_)) => {
                ctx.send_text(chat_id, lang.giveaway_not_found()).await;
                return Ok(());
            }
            Err(err) => {
                error!("failed to load giveaway {}: {}", giveaway_id, err);
                ctx.send_text(chat_id, lang.error_try_later()).await;
                return Ok(());
            }
        };
        if giveaway.status != GiveawayStatus::Finished {
            ctx.send_text(chat_id, lang.giveaway_not_finished_yet()).await;
            return Ok(());
        }

        let mut text = lang.check_header(
            giveaway.id,
            giveaway.post_url.as_deref().unwrap_or_default(),
        );
        text.push_str(&lang.check_counts(giveaway.participants_count, giveaway.winners_count));
        if let Some(end_count) = giveaway.end_count {
            text.push_str(&lang.check_ended_by_count(end_count));
        } else if let Some(end_at) = giveaway.end_at {
            text.push_str(&lang.check_ended_by_time(end_at));
        }
        text.push_str(lang.check_winners_header());
        for (index, winner_id) in giveaway.winner_ids.iter().enumerate() {
            text.push_str(&format!(
                "{}.{}\n",
                index + 1,
                ctx.engine.mention(*winner_id).await
            ));
        }
        ctx.send_text(chat_id, &text).await;
        Ok(())
    }

    /// /mygives: compact listing of the creator's giveaways
    async fn handle_my_gives(ctx: &BotContext, msg: &Message, lang: Lang) -> ResponseResult<()> {
        let user_id = match msg.from.as_ref() {
            Some(user) => user.id.0 as i64,
            None => return Ok(()),
        };
        let chat_id = msg.chat.id.0;

        let giveaways = match ctx.repository.list_by_creator(user_id).await {
            Ok(giveaways) => giveaways,
            Err(err) => {
                error!("failed to list giveaways of {}: {}", user_id, err);
                ctx.send_text(chat_id, lang.error_try_later()).await;
                return Ok(());
            }
        };
        if giveaways.is_empty() {
            ctx.send_text(chat_id, lang.no_giveaways()).await;
            return Ok(());
        }

        let header = lang.my_gives_header();
        let mut chunk = header.to_string();
        for giveaway in &giveaways {
            let line = format!(
                "{} /mygive{} {}\n",
                lang.status_icon(giveaway.status),
                giveaway.id,
                preview_text(&giveaway.text, 35)
            );
            if chunk.len() + line.len() > MAX_MESSAGE_LENGTH {
                ctx.send_text(chat_id, &chunk).await;
                chunk = format!("{}{}", header, line);
            } else {
                chunk.push_str(&line);
            }
        }
        ctx.send_text(chat_id, &chunk).await;
        Ok(())
    }

    async fn handle_cancel(ctx: &BotContext, msg: &Message, lang: Lang) -> ResponseResult<()> {
        let user_id = match msg.from.as_ref() {
            Some(user) => user.id.0 as i64,
            None => return Ok(()),
        };
        let had_state = ctx.conversations.get(user_id).await.is_some();
        ctx.conversations.clear(user_id).await;
        let reply = if had_state {
            lang.cancelled()
        } else {
            lang.nothing_to_cancel()
        };
        ctx.send_text(msg.chat.id.0, reply).await;
        Ok(())
    }

    /// non-command private messages: conversation continuations and the
    /// /mygive<id> detail card
    pub async fn handle_message(ctx: BotContext, msg: Message) -> ResponseResult<()> {
        // conversations and owner menus only make sense in the private chat
        if !msg.chat.is_private() {
            return Ok(());
        }
        let user = match msg.from.as_ref() {
            Some(user) => user,
            None => return Ok(()),
        };
        let user_id = user.id.0 as i64;
        let lang = Lang::from_code(user.language_code.as_deref());

        if let Some(state) = ctx.conversations.get(user_id).await {
            return match state {
                UserConversation::AwaitingCaptcha {
                    giveaway_id,
                    answer,
                    attempts_left,
                    issued_at,
                } => {
                    JoinHandler::handle_captcha_answer(
                        &ctx,
                        &msg,
                        giveaway_id,
                        answer,
                        attempts_left,
                        issued_at,
                        lang,
                    )
                    .await
                }
                UserConversation::AwaitingEndCount { giveaway_id } => {
                    CallbackHandler::handle_end_count_input(&ctx, &msg, giveaway_id, lang).await
                }
                UserConversation::AwaitingEndTime { giveaway_id } => {
                    CallbackHandler::handle_end_time_input(&ctx, &msg, giveaway_id, lang).await
                }
                UserConversation::AwaitingExtraWinners { giveaway_id } => {
                    CallbackHandler::handle_extra_winners_input(&ctx, &msg, giveaway_id, lang).await
                }
                UserConversation::Creating(draft) => {
                    CreationHandler::handle_message(&ctx, &msg, draft, lang).await
                }
            };
        }

        if let Some(id_text) = msg.text().and_then(|text| text.strip_prefix("/mygive")) {
            if let Ok(giveaway_id) = id_text.trim().parse::<i32>() {
                return Self::handle_my_give_details(&ctx, &msg, giveaway_id, lang).await;
            }
        }
        Ok(())
    }

    /// owner card for a single giveaway with status-dependent actions
    async fn handle_my_give_details(
        ctx: &BotContext,
        msg: &Message,
        giveaway_id: i32,
        lang: Lang,
    ) -> ResponseResult<()> {
        let user_id = match msg.from.as_ref() {
            Some(user) => user.id.0 as i64,
            None => return Ok(()),
        };
        let chat_id = msg.chat.id.0;

        let giveaway = match ctx.repository.get(giveaway_id).await {
            Ok(giveaway) if giveaway.creator_user_id == user_id => giveaway,
            Ok(_) | Err(RepositoryError::NotFound(_)) => {
                ctx.send_text(chat_id, &lang.giveaway_not_accessible(giveaway_id))
                    .await;
                return Ok(());
            }
            Err(err) => {
                error!("failed to load giveaway {}: {}", giveaway_id, err);
                ctx.send_text(chat_id, lang.error_try_later()).await;
                return Ok(());
            }
        };

        let participants = if giveaway.status == GiveawayStatus::Finished {
            giveaway.participants_count
        } else {
            ctx.engine.participants().count(giveaway_id).await as i32
        };

        let mut text = format!(
            "<b>#{}</b>\n{}\n",
            giveaway.id,
            lang.status_name(giveaway.status)
        );
        if let Some(url) = &giveaway.post_url {
            text.push_str(&format!("<a href='{}'>→</a>\n", url));
        }
        text.push_str(&lang.check_counts(participants, giveaway.winners_count));
        if let Some(post_at) = giveaway.post_at {
            text.push_str(&format!(
                "🕒 {}\n",
                crate::creation::format_user_datetime(post_at)
            ));
        }
        if let Some(end_count) = giveaway.end_count {
            text.push_str(&lang.summary_end_count(end_count));
        } else if let Some(end_at) = giveaway.end_at {
            text.push_str(&lang.summary_end_at(end_at));
        }

        let mut buttons: Vec<(&str, String)> = Vec::new();
        match giveaway.status {
            GiveawayStatus::NotPublished | GiveawayStatus::Published => {
                buttons.push((
                    lang.btn_change_end_condition(),
                    format!("change_end_condition_{}", giveaway_id),
                ));
            }
            GiveawayStatus::Finished => {}
        }
        if giveaway.status == GiveawayStatus::Published {
            buttons.push((lang.btn_finish_now(), format!("finish_giveaway_{}", giveaway_id)));
        }
        if giveaway.status == GiveawayStatus::Finished {
            buttons.push((lang.btn_result_link(), format!("get_result_link_{}", giveaway_id)));
            buttons.push((lang.btn_add_winners(), format!("add_winners_{}", giveaway_id)));
        }
        buttons.push((
            lang.btn_delete_giveaway(),
            format!("delete_giveaway_{}", giveaway_id),
        ));

        ctx.send_with_keyboard(chat_id, &text, keyboards::callback_column(&buttons))
            .await;
        Ok(())
    }
}

/// first `limit` characters with html tags stripped, for list previews
fn preview_text(text: &str, limit: usize) -> String {
    let mut clean = String::new();
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => clean.push(ch),
            _ => {}
        }
        if clean.chars().count() >= limit {
            break;
        }
    }
    clean.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_strips_tags_and_truncates() {
        assert_eq!(preview_text("<b>hello</b> world", 8), "hello wo");
        assert_eq!(preview_text("line\nbreak", 20), "line break");
    }
}

use chrono::Utc;
use log::error;
use teloxide::prelude::*;

use crate::bot::BotContext;
use crate::conversation::UserConversation;
use crate::creation::{parse_user_datetime, MIN_POST_LEAD};
use crate::deep_link;
use crate::giveaway::{EndCondition, Giveaway};
use crate::handlers::CreationHandler;
use crate::keyboards;
use crate::lifecycle::EngineError;
use crate::localization::Lang;
use crate::repository::RepositoryError;

pub struct CallbackHandler;

impl CallbackHandler {
    pub async fn handle_callback_query(ctx: BotContext, query: CallbackQuery) -> ResponseResult<()> {
        let lang = Lang::from_code(query.from.language_code.as_deref());
        let user_id = query.from.id.0 as i64;
        let data = match query.data.as_deref() {
            Some(data) => data.to_string(),
            None => return Ok(()),
        };

        // stop the client-side loading spinner
        ctx.answer_callback(&query).await;

        if data == "cancel" {
            ctx.conversations.clear(user_id).await;
            ctx.send_text(user_id, lang.cancelled()).await;
            return Ok(());
        }

        // the creation dialog owns its callback vocabulary
        if let Some(UserConversation::Creating(draft)) = ctx.conversations.get(user_id).await {
            return CreationHandler::handle_callback(&ctx, &query, draft, &data, lang).await;
        }

        if let Some(id) = data.strip_prefix("delete_giveaway_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                ctx.send_with_keyboard(
                    user_id,
                    lang.delete_confirm(),
                    keyboards::callback_column(&[
                        (lang.btn_yes(), format!("sure_delete_giveaway_{}", giveaway_id)),
                        (lang.btn_no(), "cancel".to_string()),
                    ]),
                )
                .await;
            }
        } else if let Some(id) = data.strip_prefix("sure_delete_giveaway_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                Self::delete_giveaway(&ctx, user_id, giveaway_id, lang).await;
            }
        } else if let Some(id) = data.strip_prefix("change_end_condition_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                ctx.send_with_keyboard(
                    user_id,
                    lang.end_condition_how(),
                    keyboards::callback_column(&[
                        (lang.btn_end_by_count(), format!("change_end_count_{}", giveaway_id)),
                        (lang.btn_end_by_time(), format!("change_end_time_{}", giveaway_id)),
                        (lang.btn_cancel(), "cancel".to_string()),
                    ]),
                )
                .await;
            }
        } else if let Some(id) = data.strip_prefix("change_end_count_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                ctx.conversations
                    .set(user_id, UserConversation::AwaitingEndCount { giveaway_id })
                    .await;
                ctx.send_text(user_id, lang.ask_end_count()).await;
            }
        } else if let Some(id) = data.strip_prefix("change_end_time_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                ctx.conversations
                    .set(user_id, UserConversation::AwaitingEndTime { giveaway_id })
                    .await;
                ctx.send_text(user_id, lang.ask_end_time()).await;
                ctx.send_text(user_id, &lang.datetime_example(Utc::now())).await;
            }
        } else if let Some(id) = data.strip_prefix("finish_giveaway_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                ctx.send_with_keyboard(
                    user_id,
                    lang.finish_confirm(),
                    keyboards::callback_column(&[
                        (lang.btn_yes(), format!("yes_finish_giveaway_{}", giveaway_id)),
                        (lang.btn_no(), "cancel".to_string()),
                    ]),
                )
                .await;
            }
        } else if let Some(id) = data.strip_prefix("yes_finish_giveaway_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                if Self::owned_giveaway(&ctx, user_id, giveaway_id, lang).await.is_none() {
                    return Ok(());
                }
                ctx.send_text(user_id, lang.finishing_now()).await;
                if let Err(err) = ctx.engine.finish(giveaway_id).await {
                    error!("manual finish of giveaway {} failed: {}", giveaway_id, err);
                    ctx.send_text(user_id, lang.error_try_later()).await;
                }
            }
        } else if let Some(id) = data.strip_prefix("get_result_link_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                let link = deep_link::verify_link(ctx.messenger.bot_username(), giveaway_id);
                ctx.send_text(user_id, &lang.result_link_text(&link)).await;
            }
        } else if let Some(id) = data.strip_prefix("add_winners_") {
            if let Ok(giveaway_id) = id.parse::<i32>() {
                ctx.conversations
                    .set(user_id, UserConversation::AwaitingExtraWinners { giveaway_id })
                    .await;
                ctx.send_with_keyboard(
                    user_id,
                    lang.add_winners_ask(),
                    keyboards::callback_column(&[(lang.btn_cancel(), "cancel".to_string())]),
                )
                .await;
            }
        }
        Ok(())
    }

    async fn delete_giveaway(ctx: &BotContext, user_id: i64, giveaway_id: i32, lang: Lang) {
        if Self::owned_giveaway(ctx, user_id, giveaway_id, lang).await.is_none() {
            return;
        }
        match ctx.repository.delete(giveaway_id).await {
            Ok(_) => {
                ctx.engine.participants().remove(giveaway_id).await;
                ctx.send_text(user_id, lang.deleted_ok()).await;
            }
            Err(err) => {
                error!("failed to delete giveaway {}: {}", giveaway_id, err);
                ctx.send_text(user_id, lang.error_try_later()).await;
            }
        }
    }

    /// loads the giveaway and enforces that the caller created it
    async fn owned_giveaway(
        ctx: &BotContext,
        user_id: i64,
        giveaway_id: i32,
        lang: Lang,
    ) -> Option<Giveaway> {
        match ctx.repository.get(giveaway_id).await {
            Ok(giveaway) if giveaway.creator_user_id == user_id => Some(giveaway),
            Ok(_) | Err(RepositoryError::NotFound(_)) => {
                ctx.send_text(user_id, &lang.giveaway_not_accessible(giveaway_id))
                    .await;
                None
            }
            Err(err) => {
                error!("failed to load giveaway {}: {}", giveaway_id, err);
                ctx.send_text(user_id, lang.error_try_later()).await;
                None
            }
        }
    }

    /// new participant threshold typed by the owner
    pub async fn handle_end_count_input(
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
        let count = match msg.text().and_then(|text| text.trim().parse::<i32>().ok()) {
            Some(count) if count > 0 => count,
            _ => {
                ctx.send_text(chat_id, lang.invalid_number()).await;
                return Ok(());
            }
        };
        if Self::owned_giveaway(ctx, user_id, giveaway_id, lang).await.is_none() {
            ctx.conversations.clear(user_id).await;
            return Ok(());
        }

        // a threshold at or below the current count would fire instantly
        let live = ctx.engine.participants().count(giveaway_id).await;
        if count as usize <= live {
            ctx.send_text(chat_id, &lang.end_count_too_low(live)).await;
            return Ok(());
        }
        match ctx
            .repository
            .update_end_condition(giveaway_id, EndCondition::Count(count))
            .await
        {
            Ok(()) => {
                ctx.conversations.clear(user_id).await;
                ctx.send_text(chat_id, lang.end_count_saved()).await;
            }
            Err(err) => {
                error!(
                    "failed to update the end condition of giveaway {}: {}",
                    giveaway_id, err
                );
                ctx.send_text(chat_id, lang.error_try_later()).await;
            }
        }
        Ok(())
    }

    /// new deadline typed by the owner
    pub async fn handle_end_time_input(
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
        let end_at = match msg.text().and_then(parse_user_datetime) {
            Some(end_at) => end_at,
            None => {
                ctx.send_text(chat_id, lang.invalid_datetime()).await;
                return Ok(());
            }
        };
        if end_at < Utc::now() + MIN_POST_LEAD {
            ctx.send_text(chat_id, lang.datetime_too_soon()).await;
            return Ok(());
        }
        if Self::owned_giveaway(ctx, user_id, giveaway_id, lang).await.is_none() {
            ctx.conversations.clear(user_id).await;
            return Ok(());
        }
        match ctx
            .repository
            .update_end_condition(giveaway_id, EndCondition::At(end_at))
            .await
        {
            Ok(()) => {
                ctx.conversations.clear(user_id).await;
                ctx.send_text(chat_id, lang.end_time_saved()).await;
            }
            Err(err) => {
                error!(
                    "failed to update the end condition of giveaway {}: {}",
                    giveaway_id, err
                );
                ctx.send_text(chat_id, lang.error_try_later()).await;
            }
        }
        Ok(())
    }

    /// number of supplementary winners typed by the owner
    pub async fn handle_extra_winners_input(
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
        let count = match msg.text().and_then(|text| text.trim().parse::<usize>().ok()) {
            Some(count) if count > 0 => count,
            _ => {
                ctx.send_text(chat_id, lang.invalid_number()).await;
                return Ok(());
            }
        };
        if Self::owned_giveaway(ctx, user_id, giveaway_id, lang).await.is_none() {
            ctx.conversations.clear(user_id).await;
            return Ok(());
        }
        ctx.conversations.clear(user_id).await;

        match ctx.engine.add_supplementary_winners(giveaway_id, count).await {
            Ok(winners) if winners.is_empty() => {
                ctx.send_text(chat_id, lang.no_extra_winners()).await;
            }
            Ok(winners) => {
                let mut mentions = String::new();
                for (index, winner) in winners.iter().enumerate() {
                    mentions.push_str(&format!(
                        "\n{}.{}",
                        index + 1,
                        ctx.engine.mention(*winner).await
                    ));
                }
                ctx.send_text(chat_id, &lang.extra_winners_done(&mentions)).await;
            }
            Err(EngineError::NoParticipantsAvailable) => {
                ctx.send_text(chat_id, lang.no_participants_available()).await;
            }
            Err(EngineError::WrongState { .. }) => {
                ctx.send_text(chat_id, lang.giveaway_not_finished_yet()).await;
            }
            Err(err) => {
                error!(
                    "supplementary selection for giveaway {} failed: {}",
                    giveaway_id, err
                );
                ctx.send_text(chat_id, lang.error_try_later()).await;
            }
        }
        Ok(())
    }
}

use log::error;
use teloxide::prelude::*;

use crate::bot::BotContext;
use crate::channel::{channel_hyperlink, ChannelRef};
use crate::conversation::UserConversation;
use crate::creation::{
    parse_user_datetime, CreationStep, GiveawayDraft, PostTime, MIN_END_GAP, MIN_POST_LEAD,
};
use crate::giveaway::{EndCondition, MediaAttachment, MediaKind};
use crate::keyboards;
use crate::localization::Lang;

pub struct CreationHandler;

impl CreationHandler {
    /// /newgive: opens the creation dialog
    pub async fn start(ctx: &BotContext, msg: &Message, lang: Lang) -> ResponseResult<()> {
        let user_id = match msg.from.as_ref() {
            Some(user) => user.id.0 as i64,
            None => return Ok(()),
        };
        let chat_id = msg.chat.id.0;

        ctx.conversations
            .set(user_id, UserConversation::Creating(GiveawayDraft::new(user_id)))
            .await;
        ctx.send_with_keyboard(
            chat_id,
            lang.creation_intro(),
            keyboards::callback_column(&[(lang.btn_cancel(), "cancel".to_string())]),
        )
        .await;
        Ok(())
    }

    /// text/media input while the creation dialog is active
    pub async fn handle_message(
        ctx: &BotContext,
        msg: &Message,
        mut draft: GiveawayDraft,
        lang: Lang,
    ) -> ResponseResult<()> {
        let user_id = match msg.from.as_ref() {
            Some(user) => user.id.0 as i64,
            None => return Ok(()),
        };
        let chat_id = msg.chat.id.0;

        match draft.step {
            CreationStep::CollectContent => {
                Self::collect_content(ctx, msg, draft, user_id, chat_id, lang).await;
            }
            CreationStep::ChooseButton => {
                if let Some(text) = msg.text() {
                    draft.button_label = Some(text.to_string());
                    draft.step = CreationStep::CollectSponsors;
                    ctx.conversations
                        .set(user_id, UserConversation::Creating(draft))
                        .await;
                    ctx.send_text(chat_id, lang.button_saved()).await;
                    ctx.send_with_keyboard(
                        chat_id,
                        lang.ask_sponsors(),
                        keyboards::callback_column(&[(
                            lang.btn_no_sponsors(),
                            "finish_sponsors".to_string(),
                        )]),
                    )
                    .await;
                }
            }
            CreationStep::CollectSponsors => {
                Self::collect_sponsor(ctx, msg, draft, user_id, chat_id, lang).await;
            }
            CreationStep::ChooseWinnersCount => {
                match msg.text().and_then(|text| text.trim().parse::<i32>().ok()) {
                    Some(count) if count > 0 => {
                        draft.winners_count = Some(count);
                        draft.step = CreationStep::ChooseChannel;
                        ctx.conversations
                            .set(user_id, UserConversation::Creating(draft))
                            .await;
                        ctx.send_text(chat_id, &lang.winners_count_saved(count)).await;
                        ctx.send_text(chat_id, lang.ask_channel()).await;
                    }
                    _ => {
                        ctx.send_text(chat_id, lang.invalid_winners_count()).await;
                    }
                }
            }
            CreationStep::ChooseChannel => {
                Self::choose_channel(ctx, msg, draft, user_id, chat_id, lang).await;
            }
            CreationStep::CollectExtraConditions => {
                if let Some(text) = msg.text() {
                    draft.extra_conditions = Some(text.to_string());
                    draft.step = CreationStep::ChoosePostTime;
                    ctx.conversations
                        .set(user_id, UserConversation::Creating(draft))
                        .await;
                    ctx.send_text(chat_id, lang.extra_conditions_saved()).await;
                    Self::ask_post_time(ctx, chat_id, lang).await;
                }
            }
            CreationStep::AwaitPostTimeInput => {
                let parsed = msg.text().and_then(parse_user_datetime);
                match parsed {
                    Some(at) if at >= chrono::Utc::now() + MIN_POST_LEAD => {
                        draft.post_time = Some(PostTime::At(at));
                        draft.step = CreationStep::ChooseEndKind;
                        ctx.conversations
                            .set(user_id, UserConversation::Creating(draft))
                            .await;
                        ctx.send_text(chat_id, lang.post_time_saved()).await;
                        Self::ask_end_kind(ctx, chat_id, lang).await;
                    }
                    Some(_) => {
                        ctx.send_text(chat_id, lang.datetime_too_soon()).await;
                    }
                    None => {
                        ctx.send_text(chat_id, lang.invalid_datetime()).await;
                    }
                }
            }
            CreationStep::AwaitEndTimeInput => {
                let parsed = msg.text().and_then(parse_user_datetime);
                match parsed {
                    Some(end_at) => {
                        let post_floor = match draft.post_time {
                            Some(PostTime::At(post_at)) => post_at,
                            _ => chrono::Utc::now(),
                        };
                        if end_at < post_floor + MIN_END_GAP {
                            ctx.send_text(chat_id, lang.end_too_close_to_post()).await;
                            return Ok(());
                        }
                        draft.end_condition = Some(EndCondition::At(end_at));
                        ctx.send_text(chat_id, lang.end_time_saved()).await;
                        Self::show_preview(ctx, draft, user_id, chat_id, lang).await;
                    }
                    None => {
                        ctx.send_text(chat_id, lang.invalid_datetime()).await;
                    }
                }
            }
            CreationStep::AwaitEndCountInput => {
                match msg.text().and_then(|text| text.trim().parse::<i32>().ok()) {
                    Some(count) if count > 0 => {
                        let winners = draft.winners_count.unwrap_or(1);
                        if count < winners {
                            ctx.send_text(chat_id, lang.end_count_below_winners()).await;
                            return Ok(());
                        }
                        draft.end_condition = Some(EndCondition::Count(count));
                        Self::show_preview(ctx, draft, user_id, chat_id, lang).await;
                    }
                    _ => {
                        ctx.send_text(chat_id, lang.invalid_number()).await;
                    }
                }
            }
            CreationStep::ChoosePostTime
            | CreationStep::ChooseEndKind
            | CreationStep::ConfirmCaptcha => {
                // these steps advance via the inline buttons, stray text is
                // ignored
            }
        }
        Ok(())
    }

    /// inline-button input while the creation dialog is active
    pub async fn handle_callback(
        ctx: &BotContext,
        query: &CallbackQuery,
        mut draft: GiveawayDraft,
        data: &str,
        lang: Lang,
    ) -> ResponseResult<()> {
        let user_id = query.from.id.0 as i64;
        let chat_id = user_id; // creation runs in the private chat

        match (draft.step, data) {
            (CreationStep::ChooseButton, "join_1" | "join_2" | "join_3") => {
                let index = data.trim_start_matches("join_").parse::<usize>().unwrap_or(1);
                draft.button_label = Some(lang.button_preset(index).to_string());
                draft.step = CreationStep::CollectSponsors;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                ctx.send_text(chat_id, lang.button_saved()).await;
                ctx.send_with_keyboard(
                    chat_id,
                    lang.ask_sponsors(),
                    keyboards::callback_column(&[(
                        lang.btn_no_sponsors(),
                        "finish_sponsors".to_string(),
                    )]),
                )
                .await;
            }
            (CreationStep::CollectSponsors, "finish_sponsors") => {
                draft.step = CreationStep::ChooseWinnersCount;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                ctx.send_text(chat_id, lang.ask_winners_count()).await;
            }
            (CreationStep::CollectExtraConditions, "finish_extra_conditions") => {
                draft.step = CreationStep::ChoosePostTime;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                Self::ask_post_time(ctx, chat_id, lang).await;
            }
            (CreationStep::ChoosePostTime, "post_now") => {
                draft.post_time = Some(PostTime::Now);
                draft.step = CreationStep::ChooseEndKind;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                ctx.send_text(chat_id, lang.post_now_ok()).await;
                Self::ask_end_kind(ctx, chat_id, lang).await;
            }
            (CreationStep::ChoosePostTime, "post_plan") => {
                draft.step = CreationStep::AwaitPostTimeInput;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                ctx.send_text(chat_id, lang.ask_post_datetime()).await;
                ctx.send_text(chat_id, &lang.datetime_example(chrono::Utc::now()))
                    .await;
            }
            (CreationStep::ChooseEndKind, "end_time") => {
                draft.step = CreationStep::AwaitEndTimeInput;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                ctx.send_text(chat_id, lang.ask_end_time()).await;
                ctx.send_text(chat_id, &lang.datetime_example(chrono::Utc::now()))
                    .await;
            }
            (CreationStep::ChooseEndKind, "end_count") => {
                draft.step = CreationStep::AwaitEndCountInput;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                ctx.send_text(chat_id, lang.ask_end_count_creation()).await;
            }
            (CreationStep::ConfirmCaptcha, "captcha_on" | "captcha_off") => {
                let enabled = data == "captcha_on";
                draft.captcha = enabled;
                ctx.conversations
                    .set(user_id, UserConversation::Creating(draft))
                    .await;
                let notice = if enabled {
                    lang.captcha_on_text()
                } else {
                    lang.captcha_off_text()
                };
                ctx.send_text(chat_id, notice).await;
                if let Some(message) = query.message.as_ref() {
                    let toggle_label = if enabled {
                        lang.btn_captcha_off()
                    } else {
                        lang.btn_captcha_on()
                    };
                    let message_ref = crate::transport::MessageRef {
                        chat_id: message.chat().id.0,
                        message_id: message.id().0,
                    };
                    let keyboard = keyboards::captcha_toggle(
                        enabled,
                        lang.btn_save_giveaway(),
                        toggle_label,
                    );
                    let _ = ctx.messenger.edit_buttons(&message_ref, keyboard).await;
                }
            }
            (CreationStep::ConfirmCaptcha, "save_giveaway") => {
                ctx.conversations.clear(user_id).await;
                match draft.try_into_definition() {
                    Ok(definition) => match ctx.repository.create(&definition).await {
                        Ok(id) => {
                            log::info!("giveaway {} saved by user {}", id, user_id);
                            ctx.send_text(chat_id, lang.giveaway_saved()).await;
                        }
                        Err(err) => {
                            error!("failed to save giveaway of user {}: {}", user_id, err);
                            ctx.send_text(chat_id, lang.error_try_later()).await;
                        }
                    },
                    Err(err) => {
                        error!("draft of user {} was incomplete at save: {}", user_id, err);
                        ctx.send_text(chat_id, lang.error_try_later()).await;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// first creation step: post text plus an optional single attachment.
    /// a per-user lock serializes album parts so the "only one media file"
    /// warning is sent once per album.
    async fn collect_content(
        ctx: &BotContext,
        msg: &Message,
        mut draft: GiveawayDraft,
        user_id: i64,
        chat_id: i64,
        lang: Lang,
    ) {
        let lock = ctx.user_lock(user_id).await;
        let _guard = lock.lock().await;

        if let Some(group_id) = msg.media_group_id().map(|group| group.to_string()) {
            if draft.seen_media_group.as_deref() == Some(group_id.as_str()) {
                return;
            }
            draft.seen_media_group = Some(group_id);
            ctx.conversations
                .set(user_id, UserConversation::Creating(draft))
                .await;
            ctx.send_text(chat_id, lang.single_media_warning()).await;
            return;
        }

        let media = if let Some(photos) = msg.photo() {
            // telegram sends several sizes; the last one is the largest
            photos.last().map(|photo| MediaAttachment {
                kind: MediaKind::Photo,
                file_id: photo.file.id.clone(),
            })
        } else if let Some(video) = msg.video() {
            Some(MediaAttachment {
                kind: MediaKind::Video,
                file_id: video.file.id.clone(),
            })
        } else if let Some(animation) = msg.animation() {
            Some(MediaAttachment {
                kind: MediaKind::Animation,
                file_id: animation.file.id.clone(),
            })
        } else {
            None
        };

        if media.is_some() {
            ctx.send_text(chat_id, lang.media_added()).await;
        }
        draft.media = media;

        let text = msg.text().or_else(|| msg.caption()).unwrap_or_default();
        if !text.is_empty() {
            ctx.send_text(chat_id, lang.text_added()).await;
        }
        draft.text = Some(text.to_string());
        draft.step = CreationStep::ChooseButton;
        ctx.conversations
            .set(user_id, UserConversation::Creating(draft))
            .await;

        ctx.send_with_keyboard(
            chat_id,
            lang.ask_button(),
            keyboards::callback_column(&[
                (lang.button_preset(1), "join_1".to_string()),
                (lang.button_preset(2), "join_2".to_string()),
                (lang.button_preset(3), "join_3".to_string()),
            ]),
        )
        .await;
    }

    async fn collect_sponsor(
        ctx: &BotContext,
        msg: &Message,
        mut draft: GiveawayDraft,
        user_id: i64,
        chat_id: i64,
        lang: Lang,
    ) {
        let channel_id = match Self::extract_channel_id(msg) {
            Some(channel_id) => channel_id,
            None => {
                ctx.send_text(chat_id, lang.channel_not_found()).await;
                return;
            }
        };
        let info = match ChannelRef::from(channel_id).resolve(&ctx.messenger).await {
            Ok(info) => info,
            Err(_) => {
                ctx.send_text(chat_id, lang.channel_not_found()).await;
                return;
            }
        };
        // an invite link is only visible to channel admins; no link means
        // the bot cannot verify subscriptions there
        if info.invite_link.is_none() {
            ctx.send_text(chat_id, lang.sponsor_needs_admin()).await;
            return;
        }

        if draft.add_sponsor(channel_id) {
            let mut listing = String::new();
            for (index, sponsor_id) in draft.sponsor_channel_ids.iter().enumerate() {
                let line = match ChannelRef::from(*sponsor_id).resolve(&ctx.messenger).await {
                    Ok(info) => channel_hyperlink(&info),
                    Err(_) => sponsor_id.to_string(),
                };
                listing.push_str(&format!("{}) {}\n", index + 1, line));
            }
            ctx.conversations
                .set(user_id, UserConversation::Creating(draft))
                .await;
            ctx.send_with_keyboard(
                chat_id,
                &lang.sponsor_added(&listing),
                keyboards::callback_column(&[(
                    lang.btn_enough_sponsors(),
                    "finish_sponsors".to_string(),
                )]),
            )
            .await;
        }
    }

    async fn choose_channel(
        ctx: &BotContext,
        msg: &Message,
        mut draft: GiveawayDraft,
        user_id: i64,
        chat_id: i64,
        lang: Lang,
    ) {
        let channel_id = match Self::extract_channel_id(msg) {
            Some(channel_id) => channel_id,
            None => {
                ctx.send_text(chat_id, lang.channel_not_found()).await;
                return;
            }
        };
        let info = match ChannelRef::from(channel_id).resolve(&ctx.messenger).await {
            Ok(info) => info,
            Err(_) => {
                ctx.send_text(chat_id, lang.channel_not_found()).await;
                return;
            }
        };
        if info.invite_link.is_none() {
            ctx.send_text(chat_id, lang.sponsor_needs_admin()).await;
            return;
        }

        draft.choose_channel(channel_id);
        ctx.send_text(chat_id, lang.channel_chosen()).await;

        let mut conditions = String::new();
        for sponsor_id in &draft.sponsor_channel_ids {
            let line = match ChannelRef::from(*sponsor_id).resolve(&ctx.messenger).await {
                Ok(info) => lang.subscribe_condition(&channel_hyperlink(&info)),
                Err(_) => lang.subscribe_condition_unavailable().to_string(),
            };
            conditions.push_str(&line);
        }
        draft.step = CreationStep::CollectExtraConditions;
        ctx.conversations
            .set(user_id, UserConversation::Creating(draft))
            .await;
        ctx.send_text(chat_id, &lang.conditions_preview(&conditions))
            .await;
        ctx.send_with_keyboard(
            chat_id,
            lang.ask_extra_conditions(),
            keyboards::callback_column(&[(
                lang.btn_no_extra_conditions(),
                "finish_extra_conditions".to_string(),
            )]),
        )
        .await;
    }

    /// channels arrive either as a forwarded post or as a raw channel id
    fn extract_channel_id(msg: &Message) -> Option<i64> {
        if let Some(chat) = msg.forward_from_chat() {
            return Some(chat.id.0);
        }
        msg.text().and_then(|text| text.trim().parse::<i64>().ok())
    }

    async fn ask_post_time(ctx: &BotContext, chat_id: i64, lang: Lang) {
        ctx.send_with_keyboard(
            chat_id,
            lang.ask_post_time(),
            keyboards::callback_column(&[
                (lang.btn_post_now(), "post_now".to_string()),
                (lang.btn_post_plan(), "post_plan".to_string()),
            ]),
        )
        .await;
    }

    async fn ask_end_kind(ctx: &BotContext, chat_id: i64, lang: Lang) {
        ctx.send_with_keyboard(
            chat_id,
            lang.ask_end_kind(),
            keyboards::callback_column(&[
                (lang.btn_end_by_count(), "end_count".to_string()),
                (lang.btn_end_by_time(), "end_time".to_string()),
            ]),
        )
        .await;
    }

    /// final step: summary card with the captcha toggle and the save button
    async fn show_preview(
        ctx: &BotContext,
        mut draft: GiveawayDraft,
        user_id: i64,
        chat_id: i64,
        lang: Lang,
    ) {
        let channel_link = match draft.channel_id {
            Some(channel_id) => match ChannelRef::from(channel_id).resolve(&ctx.messenger).await {
                Ok(info) => channel_hyperlink(&info),
                Err(_) => channel_id.to_string(),
            },
            None => String::new(),
        };
        let post_line = match draft.post_time {
            Some(PostTime::At(at)) => {
                format!("<b>{}</b>", crate::creation::format_user_datetime(at))
            }
            _ => lang.summary_post_now().to_string(),
        };
        let end_line = match draft.end_condition {
            Some(EndCondition::At(at)) => lang.summary_end_at(at),
            Some(EndCondition::Count(count)) => lang.summary_end_count(count),
            None => String::new(),
        };
        let summary = lang.giveaway_summary(
            &channel_link,
            draft.winners_count.unwrap_or(0),
            &post_line,
            &end_line,
        );

        draft.step = CreationStep::ConfirmCaptcha;
        let captcha = draft.captcha;
        ctx.conversations
            .set(user_id, UserConversation::Creating(draft))
            .await;
        ctx.send_text(chat_id, lang.preview_header()).await;
        ctx.send_with_keyboard(
            chat_id,
            &summary,
            keyboards::captcha_toggle(
                captcha,
                lang.btn_save_giveaway(),
                if captcha {
                    lang.btn_captcha_off()
                } else {
                    lang.btn_captcha_on()
                },
            ),
        )
        .await;
    }
}

use chrono::Utc;
use log::{error, warn};
use teloxide::prelude::*;

use crate::bot::BotContext;
use crate::captcha;
use crate::channel::{channel_hyperlink, ChannelRef};
use crate::conversation::UserConversation;
use crate::giveaway::{Giveaway, GiveawayStatus};
use crate::localization::Lang;
use crate::repository::RepositoryError;

#[derive(Debug, PartialEq, Eq)]
enum CaptchaOutcome {
    Passed,
    /// wrong answer, this many attempts remain
    Retry(u8),
    Exhausted,
}

fn evaluate_captcha(input: &str, answer: &str, attempts_left: u8) -> CaptchaOutcome {
    if input == answer {
        return CaptchaOutcome::Passed;
    }
    let remaining = attempts_left.saturating_sub(1);
    if remaining > 0 {
        CaptchaOutcome::Retry(remaining)
    } else {
        CaptchaOutcome::Exhausted
    }
}

pub struct JoinHandler;

impl JoinHandler {
    /// entry point of the join deep link
    pub async fn handle_join(
        ctx: &BotContext,
        msg: &Message,
        giveaway_id: i32,
        lang: Lang,
    ) -> ResponseResult<()> {
        let user = match msg.from.as_ref() {
            Some(user) => user,
            None => return Ok(()),
        };
        let user_id = user.id.0 as i64;
        let chat_id = msg.chat.id.0;

        // remember the user so winner mentions have a name to fall back to
        if let Err(err) = ctx
            .users
            .get_or_create_user(user_id, user.username.as_deref(), Some(&user.first_name))
            .await
        {
            error!("failed to store user {}: {}", user_id, err);
        }

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

        match giveaway.status {
            GiveawayStatus::Finished => {
                ctx.send_text(chat_id, lang.giveaway_already_finished()).await;
                return Ok(());
            }
            GiveawayStatus::NotPublished => {
                // a join link leaked before publication; nothing to join yet
                ctx.send_text(chat_id, lang.giveaway_not_found()).await;
                return Ok(());
            }
            GiveawayStatus::Published => {}
        }

        if ctx.engine.participants().contains(giveaway_id, user_id).await {
            ctx.send_text(chat_id, lang.already_joined()).await;
            return Ok(());
        }

        let required = giveaway.required_channels();
        let unmet = ctx
            .engine
            .verifier()
            .unmet_channels(&required, user_id)
            .await;
        if !unmet.is_empty() {
            let mut links = String::new();
            for channel_id in unmet {
                match ChannelRef::from(channel_id).resolve(&ctx.messenger).await {
                    Ok(info) => {
                        links.push_str(&lang.subscribe_condition(&channel_hyperlink(&info)));
                    }
                    Err(_) => links.push_str(lang.subscribe_condition_unavailable()),
                }
            }
            ctx.send_text(chat_id, &lang.must_subscribe(&links)).await;
            return Ok(());
        }

        if giveaway.captcha {
            let (answer, png) = captcha::generate_captcha();
            ctx.send_text(chat_id, lang.captcha_intro()).await;
            if let Err(err) = ctx
                .messenger
                .send_png(chat_id, png, lang.captcha_prompt())
                .await
            {
                error!("failed to send captcha to {}: {}", user_id, err);
                ctx.send_text(chat_id, lang.error_try_later()).await;
                return Ok(());
            }
            ctx.conversations
                .set(
                    user_id,
                    UserConversation::AwaitingCaptcha {
                        giveaway_id,
                        answer,
                        attempts_left: captcha::MAX_ATTEMPTS,
                        issued_at: Utc::now(),
                    },
                )
                .await;
            return Ok(());
        }

        Self::register(ctx, &giveaway, user_id, chat_id, lang).await;
        Ok(())
    }

    /// message arriving while the user owes a captcha answer
    pub async fn handle_captcha_answer(
        ctx: &BotContext,
        msg: &Message,
        giveaway_id: i32,
        answer: String,
        attempts_left: u8,
        issued_at: chrono::DateTime<Utc>,
        lang: Lang,
    ) -> ResponseResult<()> {
        let user_id = match msg.from.as_ref() {
            Some(user) => user.id.0 as i64,
            None => return Ok(()),
        };
        let chat_id = msg.chat.id.0;
        let input = msg.text().unwrap_or_default().trim();

        match evaluate_captcha(input, &answer, attempts_left) {
            CaptchaOutcome::Passed => {
                ctx.conversations.clear(user_id).await;
                ctx.send_text(chat_id, lang.captcha_passed()).await;
                match ctx.repository.get(giveaway_id).await {
                    Ok(giveaway) if giveaway.status == GiveawayStatus::Published => {
                        Self::register(ctx, &giveaway, user_id, chat_id, lang).await;
                    }
                    Ok(_) => {
                        ctx.send_text(chat_id, lang.giveaway_already_finished()).await;
                    }
                    Err(err) => {
                        error!("failed to load giveaway {}: {}", giveaway_id, err);
                        ctx.send_text(chat_id, lang.error_try_later()).await;
                    }
                }
            }
            CaptchaOutcome::Retry(attempts_left) => {
                ctx.send_text(chat_id, &lang.captcha_wrong(attempts_left)).await;
                ctx.conversations
                    .set(
                        user_id,
                        UserConversation::AwaitingCaptcha {
                            giveaway_id,
                            answer,
                            attempts_left,
                            issued_at,
                        },
                    )
                    .await;
            }
            CaptchaOutcome::Exhausted => {
                // no penalty beyond restarting the join from the deep link
                ctx.conversations.clear(user_id).await;
                ctx.send_text(chat_id, lang.captcha_exhausted()).await;
            }
        }
        Ok(())
    }

    /// shared tail of the captcha and no-captcha branches
    async fn register(
        ctx: &BotContext,
        giveaway: &Giveaway,
        user_id: i64,
        chat_id: i64,
        lang: Lang,
    ) {
        let newly_added = ctx.engine.participants().add(giveaway.id, user_id).await;
        if !newly_added {
            ctx.send_text(chat_id, lang.already_joined()).await;
            return;
        }

        if let Err(err) = ctx.engine.refresh_join_button(giveaway).await {
            warn!(
                "failed to refresh the button of giveaway {} after a join: {}",
                giveaway.id, err
            );
        }
        ctx.send_text(chat_id, &lang.joined(giveaway.id)).await;

        // count-based giveaways can conclude right now instead of waiting
        // for the next scheduler tick
        if let Some(end_count) = giveaway.end_count {
            let live = ctx.engine.participants().count(giveaway.id).await;
            if live >= end_count as usize {
                if let Err(err) = ctx.engine.finish(giveaway.id).await {
                    error!(
                        "auto-finish of giveaway {} at {} participants failed: {}",
                        giveaway.id, live, err
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_answer_passes_regardless_of_attempts() {
        assert_eq!(evaluate_captcha("1234", "1234", 1), CaptchaOutcome::Passed);
        assert_eq!(evaluate_captcha("1234", "1234", 3), CaptchaOutcome::Passed);
    }

    #[test]
    fn three_wrong_answers_exhaust_the_challenge() {
        // a fresh challenge allows three tries in total
        assert_eq!(evaluate_captcha("0000", "1234", 3), CaptchaOutcome::Retry(2));
        assert_eq!(evaluate_captcha("0000", "1234", 2), CaptchaOutcome::Retry(1));
        assert_eq!(evaluate_captcha("0000", "1234", 1), CaptchaOutcome::Exhausted);
    }
}

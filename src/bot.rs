use log::{error, info};
use std::collections::HashMap;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tokio::sync::Mutex;

use crate::conversation::ConversationStore;
use crate::handlers::{CallbackHandler, CommandHandler, MembershipHandler};
use crate::lifecycle::GiveawayEngine;
use crate::operator_log::OperatorLog;
use crate::repository::GiveawayRepository;
use crate::scheduler;
use crate::transport::Messenger;
use crate::user_manager::UserManager;

// per-user locks serializing the album parts of the creation dialog
pub type UserLocks = Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "start the bot")]
    Start,
    #[command(description = "create a giveaway")]
    NewGive,
    #[command(description = "list your giveaways")]
    MyGives,
    #[command(description = "cancel the current action")]
    Cancel,
}

#[derive(Clone)]
pub struct BotContext {
    pub bot: Arc<Bot>,
    pub messenger: Arc<dyn Messenger>,
    pub engine: GiveawayEngine,
    pub repository: Arc<GiveawayRepository>,
    pub users: Arc<UserManager>,
    pub conversations: ConversationStore,
    pub user_locks: UserLocks,
}

impl BotContext {
    /// best-effort HTML send; handler flows never abort on delivery failures
    pub async fn send_text(&self, chat_id: i64, text: &str) {
        if let Err(err) = self.messenger.send_message(chat_id, text, None).await {
            error!("failed to send message to {}: {}", chat_id, err);
        }
    }

    pub async fn send_with_keyboard(&self, chat_id: i64, text: &str, keyboard: InlineKeyboardMarkup) {
        if let Err(err) = self
            .messenger
            .send_message(chat_id, text, Some(keyboard))
            .await
        {
            error!("failed to send message to {}: {}", chat_id, err);
        }
    }

    pub async fn answer_callback(&self, query: &CallbackQuery) {
        if let Err(err) = self.bot.answer_callback_query(query.id.clone()).await {
            error!("failed to answer callback query: {}", err);
        }
    }

    pub async fn user_lock(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

pub struct GiveawayBot {
    bot: Arc<Bot>,
    ctx: BotContext,
    operator_ids: Vec<i64>,
}

impl GiveawayBot {
    pub fn new(
        bot: Arc<Bot>,
        messenger: Arc<dyn Messenger>,
        engine: GiveawayEngine,
        repository: Arc<GiveawayRepository>,
        users: Arc<UserManager>,
        operator_ids: Vec<i64>,
    ) -> Self {
        let ctx = BotContext {
            bot: bot.clone(),
            messenger,
            engine,
            repository,
            users,
            conversations: ConversationStore::new(),
            user_locks: Arc::new(Mutex::new(HashMap::new())),
        };
        Self {
            bot,
            ctx,
            operator_ids,
        }
    }

    /// best-effort operator broadcast on process start/stop
    async fn announce(&self, text: &str) {
        for operator_id in &self.operator_ids {
            if let Err(err) = self.ctx.messenger.send_message(*operator_id, text, None).await {
                error!("failed to announce to operator {}: {}", operator_id, err);
            }
        }
    }

    pub async fn run(self) {
        info!("Starting giveaway bot...");

        if let Err(err) = self
            .bot
            .set_my_commands(Command::bot_commands())
            .await
        {
            error!("failed to register bot commands: {}", err);
        }

        // the scheduler lives next to the dispatcher for the process lifetime
        let engine = self.ctx.engine.clone();
        tokio::spawn(async move {
            scheduler::run_scheduler(engine).await;
        });

        self.announce("Bot started 🥳").await;

        let ctx = self.ctx.clone();
        let handler = dptree::entry()
            .branch(Update::filter_my_chat_member().endpoint({
                let ctx = ctx.clone();
                move |update: ChatMemberUpdated| {
                    let ctx = ctx.clone();
                    async move { MembershipHandler::handle_my_chat_member(ctx, update).await }
                }
            }))
            .branch(Update::filter_callback_query().endpoint({
                let ctx = ctx.clone();
                move |query: CallbackQuery| {
                    let ctx = ctx.clone();
                    async move { CallbackHandler::handle_callback_query(ctx, query).await }
                }
            }))
            .branch(
                Update::filter_message()
                    .branch(dptree::entry().filter_command::<Command>().endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message, cmd: Command| {
                            let ctx = ctx.clone();
                            async move { CommandHandler::handle_command(ctx, msg, cmd).await }
                        }
                    }))
                    .branch(dptree::endpoint({
                        let ctx = ctx.clone();
                        move |msg: Message| {
                            let ctx = ctx.clone();
                            async move { CommandHandler::handle_message(ctx, msg).await }
                        }
                    })),
            );

        Dispatcher::builder(self.bot.clone(), handler)
            .error_handler(
                teloxide::error_handlers::LoggingErrorHandler::with_custom_text(
                    "An error from the update listener",
                ),
            )
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        self.announce("Bot stopped 😴").await;
    }
}

/// parses the comma-separated ADMIN_IDS env value
pub fn parse_operator_ids(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// builds the operator log sink from the optional LOGS_CHANNEL_ID env value
pub fn operator_log_from_env(messenger: Arc<dyn Messenger>) -> OperatorLog {
    let channel_id = std::env::var("LOGS_CHANNEL_ID")
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok());
    OperatorLog::new(messenger, channel_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_ids_parse_loosely() {
        assert_eq!(parse_operator_ids("1, 2,3"), vec![1, 2, 3]);
        assert_eq!(parse_operator_ids(""), Vec::<i64>::new());
        assert_eq!(parse_operator_ids("7,junk,8"), vec![7, 8]);
    }
}

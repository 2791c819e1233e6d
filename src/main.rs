use clap::Parser;
use log::info;
use std::env;
use std::sync::Arc;
use teloxide::Bot;

use tg_giveaway::bot::{operator_log_from_env, parse_operator_ids, GiveawayBot};
use tg_giveaway::db;
use tg_giveaway::lifecycle::GiveawayEngine;
use tg_giveaway::migrations::MigrationManager;
use tg_giveaway::participants::ParticipantStore;
use tg_giveaway::repository::GiveawayRepository;
use tg_giveaway::subscription::SubscriptionVerifier;
use tg_giveaway::transport::{Messenger, TelegramMessenger};
use tg_giveaway::user_manager::UserManager;

#[derive(Parser)]
#[command(name = "tg-giveaway")]
#[command(about = "A Telegram bot that runs channel giveaways")]
struct Args {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        match e {
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // .env file not found, which is fine
            }
            _ => {
                eprintln!("warning: failed to load .env file: {}", e);
            }
        }
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let _args = Args::parse();

    let bot_token =
        env::var("BOT_TOKEN").map_err(|_| "BOT_TOKEN environment variable is required")?;
    let operator_ids = env::var("ADMIN_IDS")
        .map(|raw| parse_operator_ids(&raw))
        .unwrap_or_default();

    let pool = db::create_pool()?;
    MigrationManager::run_migrations(&pool).await?;

    info!("Starting bot...");

    let bot = Arc::new(Bot::new(&bot_token));
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot.clone()).await?);
    let operator_log = operator_log_from_env(messenger.clone());

    let repository = Arc::new(GiveawayRepository::new(pool.clone()));
    let users = Arc::new(UserManager::new(pool));
    let participants = ParticipantStore::new();
    let verifier = SubscriptionVerifier::new(messenger.clone(), operator_log.clone());
    let engine = GiveawayEngine::new(
        repository.clone(),
        participants,
        messenger.clone(),
        verifier,
        users.clone(),
        operator_log,
    );

    let giveaway_bot = GiveawayBot::new(bot, messenger, engine, repository, users, operator_ids);
    giveaway_bot.run().await;

    Ok(())
}

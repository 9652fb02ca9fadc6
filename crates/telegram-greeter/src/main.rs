//! Telegram greeter bot
//!
//! Greets newcomers to a group once the chat has been active enough since the
//! previous greeting, answers a keyword with a rate-limited notice, and serves
//! the `/welcome` and `/rules` commands.

mod bridge;
mod client;
mod config;
mod env;
mod errors;
mod handlers;
mod health;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use greeter_core::{Greeter, SystemClock};
use teloxide::prelude::*;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::TelegramClient;
use crate::config::Config;
use crate::env::SystemEnv;

pub type BotGreeter = Greeter<SystemClock>;

/// Telegram greeter CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/telegram-greeter.toml")]
    config: String,

    /// Telegram bot token (overrides config file)
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3000")]
    health_port: u16,

    /// Dotenv file loaded before reading the environment
    #[arg(long, default_value = ".env.local")]
    env_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telegram_greeter=debug,greeter_core=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Telegram greeter");

    let args = Args::parse();

    match dotenvy::from_filename(&args.env_file) {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No env file loaded from {}: {}", args.env_file, e),
    }

    // The env file may supply the token after clap has already read the environment.
    let config = Config::load(&args.config, args.bot_token.clone(), &SystemEnv)?;
    config.validate().context("Invalid configuration")?;

    let gate = config.gate.to_gate_config();
    info!(
        greeting_threshold = gate.greeting_threshold,
        trigger_phrase = %gate.trigger_phrase,
        trigger_cooldown = ?gate.trigger_cooldown,
        concurrent_updates = config.telegram.concurrent_updates,
        "Configuration loaded successfully"
    );

    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram.bot_token);

    let bot_username = match bot.get_me().await {
        Ok(me) => {
            let username = me.username().to_string();
            info!("Bot authenticated as: @{}", username);
            username
        }
        Err(e) => {
            error!("Failed to authenticate bot: {}", e);
            return Err(e).context("Bot authentication failed");
        }
    };

    let health_state = health::AppState::new(Some(bot_username.clone()));
    health_state.set_telegram_connected(true).await;

    let health_state_clone = health_state.clone();
    let health_port = args.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state_clone, health_port).await {
            error!("Health check server error: {}", e);
        }
    });

    let greeter: Arc<BotGreeter> = Arc::new(
        Greeter::new(
            TelegramClient::new(bot.clone()),
            SystemClock,
            gate,
            config.messages,
        )
        .with_bot_username(bot_username),
    );

    info!("Bot initialized, starting message dispatcher...");

    let handler = Update::filter_message().endpoint(handlers::handle_message);

    let builder = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![greeter, health_state])
        .enable_ctrlc_handler();

    if config.telegram.concurrent_updates {
        builder
            .distribution_function(|_| None::<std::convert::Infallible>)
            .build()
            .dispatch()
            .await;
    } else {
        builder.build().dispatch().await;
    }

    info!("Telegram greeter stopped");
    Ok(())
}

use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::interval;

use savemedia::core::{config, init_logger, log_startup_configuration};
use savemedia::storage::RequestLedger;
use savemedia::telegram::{create_bot, schema, HandlerDeps};

/// Main entry point for the Telegram bot.
///
/// # Errors
/// Returns an error if initialization fails (logging, missing credential,
/// unreachable Bot API).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    log::info!("Starting bot...");
    log_startup_configuration();

    // Fails fast when BOT_TOKEN is missing
    let bot = create_bot()?;

    let bot_info = bot.get_me().await?;
    log::info!(
        "Connected as @{} (id {})",
        bot_info.username.as_deref().unwrap_or("unknown"),
        bot_info.id
    );

    let ledger = Arc::new(RequestLedger::with_defaults());

    // Background sweep so abandoned previews do not pin ledger entries
    // until someone presses a button
    let sweeper = Arc::clone(&ledger);
    tokio::spawn(async move {
        let mut ticker = interval(config::ledger::sweep_interval());
        ticker.tick().await; // first tick completes immediately
        loop {
            ticker.tick().await;
            sweeper.evict_expired().await;
        }
    });

    let deps = HandlerDeps { ledger };
    let handler = schema(deps);

    // Drop updates that queued up while the bot was down; reacting to
    // day-old links only confuses people
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

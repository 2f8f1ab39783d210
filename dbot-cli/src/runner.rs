//! Run the bot and inspect stored threads.

use anyhow::{Context, Result};
use dbot_core::init_tracing;
use dbot_discord::DiscordBotAdapter;
use serenity::http::Http;
use std::sync::Arc;
use storage::{MessageRepository, MessageStore};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::components::{build_handler_chain, build_llm_client};
use crate::config::{BaseConfig, BotConfig};

/// Main entry: validate config, init logging, open the store, build the chain, then run the
/// gateway until Ctrl-C.
#[instrument(skip_all)]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.base.log_file, &config.base.log_level)?;

    info!(
        database_url = %config.database_url(),
        model = %config.model(),
        bot_id = %config.bot_id(),
        "Initializing bot"
    );

    let store = Arc::new(
        MessageRepository::new(config.database_url())
            .await
            .context("Failed to open message store")?,
    );
    let bot = Arc::new(DiscordBotAdapter::new(Arc::new(Http::new(&config.discord.token))));
    let llm = build_llm_client(&config.llm);

    let cancel = CancellationToken::new();
    let chain = build_handler_chain(&config, store.clone(), bot.clone(), llm, cancel.clone())?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            shutdown.cancel();
        }
    });

    info!("Bot started successfully");
    dbot_discord::run(&config.discord, bot, chain, cancel).await?;

    store.close().await;
    info!("Bot stopped");
    Ok(())
}

/// Transcript of the stored reply chain ending at `message_id` (the message included).
pub async fn show_thread(base: &BaseConfig, message_id: &str) -> Result<String> {
    let store = MessageRepository::new(&base.database_url)
        .await
        .context("Failed to open message store")?;

    let message = store
        .get(message_id)
        .await?
        .with_context(|| format!("Message {} not found in store", message_id))?;
    let mut thread = store.get_chain_from(message_id).await;
    thread.push(message.to_history_item());

    store.close().await;
    Ok(prompt::format_transcript(&thread))
}

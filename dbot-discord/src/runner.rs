//! Gateway runner: serenity events → filtered core messages → intake queue → dispatcher.
//! Also handles bonk reactions (delete the reacted message).

use crate::adapters::{reaction_name, DiscordMessageWrapper};
use crate::bot_adapter::DiscordBotAdapter;
use crate::config::DiscordConfig;
use crate::dispatcher::{dispatch, IntakeQueue, INTAKE_QUEUE_CAPACITY};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use dbot_core::{Channel, Message, ToCoreMessage};
use handler_chain::HandlerChain;
use serenity::all::{Context, EventHandler, GatewayIntents, Reaction, Ready};
use serenity::model::channel::Message as DiscordMessage;
use serenity::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Decides which incoming messages become triggers.
#[derive(Debug, Clone)]
pub struct IntakeFilter {
    pub bot_id: String,
    pub allow_dm: bool,
}

impl IntakeFilter {
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self {
            bot_id: config.bot_id.clone(),
            allow_dm: config.allow_dm,
        }
    }

    /// Own messages are never accepted; direct messages only when allowed.
    pub fn accepts(&self, message: &Message) -> bool {
        if message.author.id == self.bot_id {
            return false;
        }
        if message.channel.is_direct() && !self.allow_dm {
            debug!(message_id = %message.id, "Direct message dropped");
            return false;
        }
        true
    }
}

/// Who may delete a message with which reaction.
#[derive(Debug, Clone)]
pub struct BonkPolicy {
    pub emoji_name: Option<String>,
    pub superuser_id: Option<String>,
    pub from_anyone: bool,
}

impl BonkPolicy {
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self {
            emoji_name: config.bonk_emoji_name.clone(),
            superuser_id: config.superuser_id.clone(),
            from_anyone: config.bonk_from_anyone,
        }
    }

    pub fn should_delete(&self, emoji: Option<&str>, user_id: Option<&str>) -> bool {
        let Some(bonk) = self.emoji_name.as_deref() else {
            return false;
        };
        if emoji != Some(bonk) {
            return false;
        }
        self.from_anyone
            || matches!((self.superuser_id.as_deref(), user_id), (Some(su), Some(user)) if su == user)
    }
}

struct GatewayHandler {
    queue: IntakeQueue,
    filter: IntakeFilter,
    bonk: BonkPolicy,
    bot: Arc<DiscordBotAdapter>,
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, user_id = %ready.user.id, "Discord gateway ready");
    }

    async fn message(&self, _ctx: Context, msg: DiscordMessage) {
        let message = DiscordMessageWrapper(&msg).to_core();
        if !self.filter.accepts(&message) {
            return;
        }
        info!(
            author_id = %message.author.id,
            channel_id = %message.channel.id,
            message_id = %message.id,
            "Received message"
        );
        self.queue.offer(message);
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let user_id = reaction.user_id.map(|id| id.to_string());
        if !self
            .bonk
            .should_delete(reaction_name(&reaction.emoji), user_id.as_deref())
        {
            return;
        }

        let message_id = reaction.message_id.to_string();
        info!(message_id = %message_id, user_id = ?user_id, "Got bonk, removing message");
        let channel = Channel {
            id: reaction.channel_id.to_string(),
            guild_id: reaction.guild_id.map(|id| id.to_string()),
        };
        if let Err(e) = self.bot.delete_message(&channel, &message_id).await {
            error!(error = %e, message_id = %message_id, "Failed to delete message");
        }
    }
}

/// Gateway intents: guild and direct messages with content, plus reactions for bonk.
pub fn gateway_intents() -> GatewayIntents {
    GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
}

/// Connects to the gateway and feeds accepted messages through `chain` until `cancel` fires or
/// the client stops. On return the shards are shut down and the dispatcher has drained.
#[instrument(skip_all)]
pub async fn run(
    config: &DiscordConfig,
    bot: Arc<DiscordBotAdapter>,
    chain: HandlerChain,
    cancel: CancellationToken,
) -> Result<()> {
    let (queue, rx) = IntakeQueue::new(INTAKE_QUEUE_CAPACITY);
    let handler = GatewayHandler {
        queue,
        filter: IntakeFilter::from_config(config),
        bonk: BonkPolicy::from_config(config),
        bot,
    };

    let mut client = Client::builder(&config.token, gateway_intents())
        .event_handler(handler)
        .await
        .context("Failed to create Discord client")?;
    let shard_manager = client.shard_manager.clone();

    info!(handlers = chain.len(), "Starting dispatcher");
    let dispatcher = tokio::spawn(dispatch(rx, chain, cancel.clone()));

    let result = tokio::select! {
        result = client.start() => result.context("Discord client stopped"),
        _ = cancel.cancelled() => {
            info!("Shutting down Discord shards");
            shard_manager.shutdown_all().await;
            Ok(())
        }
    };

    cancel.cancel();
    if let Err(e) = dispatcher.await {
        error!(error = %e, "Dispatcher task failed");
    }
    result
}

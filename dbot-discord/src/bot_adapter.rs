//! Wraps serenity's HTTP client and implements [`dbot_core::Bot`]. Production code talks to
//! Discord; tests substitute another Bot impl.

use crate::adapters::DiscordMessageWrapper;
use async_trait::async_trait;
use dbot_core::{Bot as CoreBot, Channel, DbotError, Message, Result, SentMessage, ToCoreMessage};
use serenity::builder::{CreateAttachment, CreateMessage, EditMessage};
use serenity::http::Http;
use serenity::model::channel::{Message as DiscordMessage, ReactionType};
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;

/// Parses a Discord snowflake id. Zero and non-numeric ids are rejected.
pub fn parse_snowflake(id: &str) -> Result<u64> {
    match id.parse::<u64>() {
        Ok(value) if value != 0 => Ok(value),
        _ => Err(DbotError::Bot(format!("Invalid Discord id: {}", id))),
    }
}

fn channel_id(channel: &Channel) -> Result<ChannelId> {
    Ok(ChannelId::new(parse_snowflake(&channel.id)?))
}

fn message_id(id: &str) -> Result<MessageId> {
    Ok(MessageId::new(parse_snowflake(id)?))
}

fn sent(message: DiscordMessage) -> SentMessage {
    SentMessage {
        id: message.id.to_string(),
        content: message.content,
    }
}

/// Thin wrapper around serenity's `Http` that implements dbot-core's Bot trait.
pub struct DiscordBotAdapter {
    http: Arc<Http>,
}

impl DiscordBotAdapter {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Underlying HTTP client for direct API use when needed.
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    /// Deletes a message. Used by bonk reactions.
    pub async fn delete_message(&self, channel: &Channel, id: &str) -> Result<()> {
        channel_id(channel)?
            .delete_message(&*self.http, message_id(id)?)
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))
    }

    async fn send(&self, channel: &Channel, builder: CreateMessage) -> Result<SentMessage> {
        let message = channel_id(channel)?
            .send_message(&*self.http, builder)
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(sent(message))
    }

    fn reply_builder(message: &Message) -> Result<CreateMessage> {
        let reference = (channel_id(&message.channel)?, message_id(&message.id)?);
        Ok(CreateMessage::new().reference_message(reference))
    }
}

#[async_trait]
impl CoreBot for DiscordBotAdapter {
    async fn send_message(&self, channel: &Channel, text: &str) -> Result<SentMessage> {
        self.send(channel, CreateMessage::new().content(text)).await
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<SentMessage> {
        let builder = Self::reply_builder(message)?.content(text);
        self.send(&message.channel, builder).await
    }

    async fn edit_message(&self, channel: &Channel, id: &str, text: &str) -> Result<SentMessage> {
        let message = channel_id(channel)?
            .edit_message(&*self.http, message_id(id)?, EditMessage::new().content(text))
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))?;
        Ok(sent(message))
    }

    async fn fetch_message(&self, channel: &Channel, id: &str) -> Result<Message> {
        let message = channel_id(channel)?
            .message(&*self.http, message_id(id)?)
            .await
            .map_err(|e| DbotError::Fetch(e.to_string()))?;
        Ok(DiscordMessageWrapper(&message).to_core())
    }

    async fn send_file(&self, message: &Message, filename: &str, data: Vec<u8>) -> Result<SentMessage> {
        let builder =
            Self::reply_builder(message)?.add_file(CreateAttachment::bytes(data, filename));
        self.send(&message.channel, builder).await
    }

    async fn add_reaction(&self, message: &Message, emoji: &str) -> Result<()> {
        channel_id(&message.channel)?
            .create_reaction(
                &*self.http,
                message_id(&message.id)?,
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))
    }

    async fn broadcast_typing(&self, channel: &Channel) -> Result<()> {
        channel_id(channel)?
            .broadcast_typing(&*self.http)
            .await
            .map_err(|e| DbotError::Bot(e.to_string()))
    }
}

//! Core types: user, channel, message, history item, handler response, and Handler trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub is_bot: bool,
}

/// Channel identity. A channel without a guild is a direct (one-on-one) conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: String,
    pub guild_id: Option<String>,
}

impl Channel {
    pub fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}

/// File attached to a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub url: String,
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: String,
}

/// A chat message as delivered by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel: Channel,
    pub author: User,
    pub content: String,
    pub attachments: Vec<Attachment>,
    /// Ids of the users mentioned in the message.
    pub mentions: Vec<String>,
    /// Body of the replied-to message when the platform ships it with the event.
    /// Its own `referenced` is usually `None`; only `referenced_id` is known one level up.
    pub referenced: Option<Box<Message>>,
    /// Id of the replied-to message.
    pub referenced_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Returns true if the replied-to message was authored by `user_id`.
    pub fn replies_to_author(&self, user_id: &str) -> bool {
        self.referenced
            .as_ref()
            .map(|parent| parent.author.id == user_id)
            .unwrap_or(false)
    }

    /// Returns true if `user_id` appears in the message mentions.
    pub fn mentions_user(&self, user_id: &str) -> bool {
        self.mentions.iter().any(|id| id == user_id)
    }
}

/// Read-only projection of a stored message, used as model context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: String,
    pub content: String,
    pub is_bot_message: bool,
    pub attachments: Vec<Attachment>,
}

/// Result of an outbound send or edit: the platform id and the content it now holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: String,
    pub content: String,
}

/// Handler result for the chain. `Reply(text)` carries the response body so later handlers can use it in `after()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Skip this handler, try next.
    Ignore,
    /// Stop the chain and attach the delivered reply text.
    Reply(String),
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// Single handler concept: optional before / handle / after. Chain runs all before → handle until Stop/Reply → all after (reverse).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _message: &Message) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the message. Return Stop or Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &Message) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}

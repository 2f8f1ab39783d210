//! Bot abstraction for sending, editing and fetching messages.
//!
//! [`Bot`] is transport-agnostic; `dbot-discord` implements it on top of serenity, tests use mocks.

use crate::error::Result;
use crate::types::{Channel, Message, SentMessage};
use async_trait::async_trait;

/// Abstraction over the chat platform. Implementations map to a transport (e.g. Discord).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain message to the channel (no reply linkage).
    async fn send_message(&self, channel: &Channel, text: &str) -> Result<SentMessage>;
    /// Sends a reply linked to `message` in its channel.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<SentMessage>;
    /// Edits an already-sent message. `message_id` is transport-specific.
    async fn edit_message(
        &self,
        channel: &Channel,
        message_id: &str,
        text: &str,
    ) -> Result<SentMessage>;
    /// Fetches a message by id from the platform. Used when the local store misses an ancestor.
    async fn fetch_message(&self, channel: &Channel, message_id: &str) -> Result<Message>;
    /// Replies to `message` with a single file attachment.
    async fn send_file(&self, message: &Message, filename: &str, data: Vec<u8>)
        -> Result<SentMessage>;
    /// Adds a unicode emoji reaction to `message`.
    async fn add_reaction(&self, message: &Message, emoji: &str) -> Result<()>;
    /// Shows the typing indicator in the channel.
    async fn broadcast_typing(&self, channel: &Channel) -> Result<()>;
}

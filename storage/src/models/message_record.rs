//! Message record model for persistence.
//!
//! Maps to the `messages` table and is used by MessageRepository.

use chrono::{DateTime, Utc};
use dbot_core::{Attachment, HistoryItem, Message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub is_bot_message: bool,
    pub attachments: Vec<Attachment>,
    /// Id of the message this one replies to.
    pub referenced_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    /// Builds a record from a platform message. `is_bot_message` is decided by the caller (author == bot id).
    pub fn from_message(message: &Message, is_bot_message: bool) -> Self {
        Self {
            id: message.id.clone(),
            channel_id: message.channel.id.clone(),
            author_id: message.author.id.clone(),
            content: message.content.clone(),
            is_bot_message,
            attachments: message.attachments.clone(),
            referenced_id: message.referenced_id.clone(),
            created_at: message.created_at,
        }
    }

    /// Projection used as model context.
    pub fn to_history_item(&self) -> HistoryItem {
        HistoryItem {
            id: self.id.clone(),
            content: self.content.clone(),
            is_bot_message: self.is_bot_message,
            attachments: self.attachments.clone(),
        }
    }
}

/// Raw `messages` row; attachments are stored as a JSON array.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub is_bot_message: bool,
    pub attachments: String,
    pub referenced_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for MessageRecord {
    fn from(row: MessageRow) -> Self {
        let attachments = if row.attachments.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&row.attachments).unwrap_or_else(|e| {
                tracing::error!(error = %e, message_id = %row.id, "Failed to decode attachments");
                Vec::new()
            })
        };
        Self {
            id: row.id,
            channel_id: row.channel_id,
            author_id: row.author_id,
            content: row.content,
            is_bot_message: row.is_bot_message,
            attachments,
            referenced_id: row.referenced_id.filter(|id| !id.is_empty()),
            created_at: row.created_at,
        }
    }
}

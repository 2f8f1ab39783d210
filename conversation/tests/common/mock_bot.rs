//! Mock implementation of [`dbot_core::Bot`] for resolver tests.
//!
//! Serves `fetch_message` from an in-memory map and records every fetched id, so tests can
//! assert which ancestors came from the platform rather than from the store.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dbot_core::{Bot, Channel, DbotError, Message, Result, SentMessage, User};
use std::collections::HashMap;
use std::sync::Mutex;

pub const BOT_ID: &str = "bot";

pub struct MockBot {
    messages: HashMap<String, Message>,
    fetched: Mutex<Vec<String>>,
    /// When true, `fetch_message` never completes.
    hang: bool,
}

impl MockBot {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages: messages.into_iter().map(|m| (m.id.clone(), m)).collect(),
            fetched: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _channel: &Channel, text: &str) -> Result<SentMessage> {
        Ok(SentMessage {
            id: "sent".to_string(),
            content: text.to_string(),
        })
    }

    async fn reply_to(&self, _message: &Message, text: &str) -> Result<SentMessage> {
        Ok(SentMessage {
            id: "sent".to_string(),
            content: text.to_string(),
        })
    }

    async fn edit_message(&self, _channel: &Channel, message_id: &str, text: &str) -> Result<SentMessage> {
        Ok(SentMessage {
            id: message_id.to_string(),
            content: text.to_string(),
        })
    }

    async fn fetch_message(&self, _channel: &Channel, message_id: &str) -> Result<Message> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.fetched.lock().unwrap().push(message_id.to_string());
        self.messages
            .get(message_id)
            .cloned()
            .ok_or_else(|| DbotError::Fetch(format!("unknown message {}", message_id)))
    }

    async fn send_file(&self, _message: &Message, _filename: &str, _data: Vec<u8>) -> Result<SentMessage> {
        Ok(SentMessage {
            id: "file".to_string(),
            content: String::new(),
        })
    }

    async fn add_reaction(&self, _message: &Message, _emoji: &str) -> Result<()> {
        Ok(())
    }

    async fn broadcast_typing(&self, _channel: &Channel) -> Result<()> {
        Ok(())
    }
}

pub fn guild_channel() -> Channel {
    Channel {
        id: "c1".to_string(),
        guild_id: Some("g1".to_string()),
    }
}

/// Message `id` in `c1` by `author`, replying to `parent` (id only, no body).
pub fn msg(id: &str, author: &str, content: &str, parent: Option<&str>, secs: i64) -> Message {
    Message {
        id: id.to_string(),
        channel: guild_channel(),
        author: User {
            id: author.to_string(),
            name: author.to_string(),
            is_bot: author == BOT_ID,
        },
        content: content.to_string(),
        attachments: Vec::new(),
        mentions: Vec::new(),
        referenced: None,
        referenced_id: parent.map(str::to_string),
        created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
    }
}

/// A trigger that mentions the bot and carries its parent's body like a gateway event does.
pub fn trigger(id: &str, content: &str, parent: Option<&Message>, secs: i64) -> Message {
    let mut m = msg(id, "alice", content, parent.map(|p| p.id.as_str()), secs);
    m.mentions = vec![BOT_ID.to_string()];
    m.referenced = parent.map(|p| Box::new(p.clone()));
    m
}

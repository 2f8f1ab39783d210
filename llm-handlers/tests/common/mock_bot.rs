//! Mock implementation of [`dbot_core::Bot`] for handler tests.
//!
//! Records every outbound call so tests can assert on what the user would see without
//! hitting Discord. Sent messages get ids `out-1`, `out-2`, ...

use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, Channel, DbotError, Message, Result, SentMessage, User};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const BOT_ID: &str = "bot";

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send { channel_id: String, text: String },
    Reply { to: String, text: String },
    Edit { message_id: String, text: String },
    File { to: String, filename: String, len: usize },
    Reaction { to: String, emoji: String },
    Typing,
}

#[derive(Default)]
pub struct MockBot {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
    /// When true, `reply_to` and `send_message` fail.
    pub fail_sends: bool,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn sent(&self, text: &str) -> SentMessage {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        SentMessage {
            id: format!("out-{}", n),
            content: text.to_string(),
        }
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, channel: &Channel, text: &str) -> Result<SentMessage> {
        if self.fail_sends {
            return Err(DbotError::Bot("send failed".to_string()));
        }
        self.record(Call::Send {
            channel_id: channel.id.clone(),
            text: text.to_string(),
        });
        Ok(self.sent(text))
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<SentMessage> {
        if self.fail_sends {
            return Err(DbotError::Bot("reply failed".to_string()));
        }
        self.record(Call::Reply {
            to: message.id.clone(),
            text: text.to_string(),
        });
        Ok(self.sent(text))
    }

    async fn edit_message(&self, _channel: &Channel, message_id: &str, text: &str) -> Result<SentMessage> {
        self.record(Call::Edit {
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        Ok(SentMessage {
            id: message_id.to_string(),
            content: text.to_string(),
        })
    }

    async fn fetch_message(&self, _channel: &Channel, message_id: &str) -> Result<Message> {
        Err(DbotError::Fetch(format!("unknown message {}", message_id)))
    }

    async fn send_file(&self, message: &Message, filename: &str, data: Vec<u8>) -> Result<SentMessage> {
        self.record(Call::File {
            to: message.id.clone(),
            filename: filename.to_string(),
            len: data.len(),
        });
        Ok(self.sent(""))
    }

    async fn add_reaction(&self, message: &Message, emoji: &str) -> Result<()> {
        self.record(Call::Reaction {
            to: message.id.clone(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn broadcast_typing(&self, _channel: &Channel) -> Result<()> {
        self.record(Call::Typing);
        Ok(())
    }
}

/// A guild trigger mentioning the bot.
pub fn trigger(id: &str, content: &str) -> Message {
    Message {
        id: id.to_string(),
        channel: Channel {
            id: "c1".to_string(),
            guild_id: Some("g1".to_string()),
        },
        author: User {
            id: "alice".to_string(),
            name: "alice".to_string(),
            is_bot: false,
        },
        content: content.to_string(),
        attachments: Vec::new(),
        mentions: vec![BOT_ID.to_string()],
        referenced: None,
        referenced_id: None,
        created_at: Utc::now(),
    }
}

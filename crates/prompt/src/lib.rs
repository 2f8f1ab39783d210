//! # Prompt
//!
//! Turns a resolved conversation into the chat message list sent to the model.
//!
//! ## Format
//!
//! - **System** (optional): first message, role `system`
//! - **History**: one message per history item, oldest-first; bot messages become `assistant`,
//!   everything else `user`. Items with empty content are skipped.
//! - **Current message**: last message, role `user`, carrying image URLs when present
//!
//! ## External interactions
//!
//! - **AI models**: output is converted to OpenAI Chat Completions requests by `openai-client`.

use dbot_core::HistoryItem;

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    /// Image URLs sent alongside the text (user messages only).
    pub images: Vec<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Attaches image URLs to this message.
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            images: Vec::new(),
        }
    }
}

/// Short instruction used when the configured system prompt is bypassed.
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "Keep your response short. Be concise and say only important things, not filler words.";

/// Builds the chat message list: optional system, history (oldest-first), then the current message.
///
/// An empty or whitespace-only `system_message` is omitted.
pub fn build_messages(
    system_message: Option<&str>,
    history: &[HistoryItem],
    message: &str,
    images: &[String],
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);

    if let Some(system) = system_message.filter(|s| !s.trim().is_empty()) {
        messages.push(ChatMessage::system(system));
    }

    for item in history.iter().filter(|item| !item.content.is_empty()) {
        messages.push(history_message(item));
    }

    messages.push(ChatMessage::user(message).with_images(images.to_vec()));
    messages
}

/// Maps a history item to its chat role.
pub fn history_message(item: &HistoryItem) -> ChatMessage {
    if item.is_bot_message {
        ChatMessage::assistant(item.content.as_str())
    } else {
        ChatMessage::user(item.content.as_str())
    }
}

/// Renders history as "User: ..." / "Assistant: ..." lines, for logs and the CLI.
pub fn format_transcript(history: &[HistoryItem]) -> String {
    history
        .iter()
        .map(|item| {
            let role = if item.is_bot_message { "Assistant" } else { "User" };
            format!("{}: {}", role, item.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

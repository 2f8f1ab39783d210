//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait and an OpenAI implementation. Transport-agnostic;
//! used by llm-handlers.
//!
//! Streaming returns a boxed stream of chunks so that [`LlmClient`] stays object-safe (dyn compatible).

use anyhow::Result;
use async_trait::async_trait;
use dbot_core::HistoryItem;
use futures::stream::BoxStream;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, ImageUrlArgs,
};
use prompt::{ChatMessage, MessageRole};

mod config;
mod openai_llm;

pub use config::{normalize_base_url, EnvLlmConfig, LlmConfig};
pub use openai_llm::OpenAILlmClient;

/// A chunk of streamed LLM output; aligned with `openai_client::StreamChunk`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
}

impl StreamChunk {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            done: false,
        }
    }

    pub fn done() -> Self {
        Self {
            content: String::new(),
            done: true,
        }
    }
}

/// Everything one inference call needs.
#[derive(Debug, Clone, Default)]
pub struct InferenceRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    /// Current user message.
    pub message: String,
    /// Conversation context, oldest-first.
    pub history: Vec<HistoryItem>,
    /// Image URLs attached to the current message.
    pub images: Vec<String>,
}

impl InferenceRequest {
    /// Chat message list for this request (system, history, current message).
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        prompt::build_messages(
            self.system_prompt.as_deref(),
            &self.history,
            &self.message,
            &self.images,
        )
    }
}

/// Stream of chunks; errors arrive as `Err` items and end delivery.
pub type ChunkStream = BoxStream<'static, Result<StreamChunk>>;

/// LLM client interface: blocking completion or incremental stream.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the full model reply.
    async fn infer(&self, request: InferenceRequest) -> Result<String>;

    /// Starts an incremental completion.
    async fn stream(&self, request: InferenceRequest) -> Result<ChunkStream>;

    /// False when the backend cannot stream; callers then use [`LlmClient::infer`].
    fn supports_streaming(&self) -> bool {
        true
    }
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
/// User messages with images become a text part followed by one image part per URL.
pub fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User if msg.images.is_empty() => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => {
            let mut parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(content)
                    .build()?,
            )];
            for url in &msg.images {
                parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImageArgs::default()
                        .image_url(
                            ImageUrlArgs::default().url(url.as_str()).build()?,
                        )
                        .build()?,
                ));
            }
            ChatCompletionRequestUserMessageArgs::default()
                .content(ChatCompletionRequestUserMessageContent::Array(parts))
                .build()?
                .into()
        }
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_with_images_becomes_parts() {
        let msg = ChatMessage::user("what is this?")
            .with_images(vec!["https://cdn.example.com/a.png".to_string()]);
        let converted = chat_message_to_openai(&msg).unwrap();

        match converted {
            ChatCompletionRequestMessage::User(user) => match user.content {
                ChatCompletionRequestUserMessageContent::Array(parts) => assert_eq!(parts.len(), 2),
                other => panic!("expected content parts, got {:?}", other),
            },
            other => panic!("expected user message, got {:?}", other),
        }
    }

    #[test]
    fn test_roles_map_to_openai_messages() {
        assert!(matches!(
            chat_message_to_openai(&ChatMessage::system("s")).unwrap(),
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            chat_message_to_openai(&ChatMessage::assistant("a")).unwrap(),
            ChatCompletionRequestMessage::Assistant(_)
        ));
        assert!(matches!(
            chat_message_to_openai(&ChatMessage::user("u")).unwrap(),
            ChatCompletionRequestMessage::User(_)
        ));
    }

    #[test]
    fn test_request_to_messages_puts_message_last() {
        let request = InferenceRequest {
            model: "m".to_string(),
            system_prompt: Some("sys".to_string()),
            message: "now".to_string(),
            history: vec![HistoryItem {
                id: "1".to_string(),
                content: "before".to_string(),
                is_bot_message: true,
                attachments: Vec::new(),
            }],
            images: Vec::new(),
        };
        let messages = request.to_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[2].content, "now");
    }
}

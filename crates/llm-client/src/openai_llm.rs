//! OpenAI-backed [`LlmClient`]: builds chat messages from the request and calls openai-client.

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use openai_client::ChatCompletionRequestMessage;
use tracing::instrument;

use super::{chat_message_to_openai, ChunkStream, InferenceRequest, LlmClient, StreamChunk};

/// LlmClient implementation on top of openai-client.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    streaming: bool,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self::from_client(openai_client::OpenAIClient::new(api_key))
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self::from_client(openai_client::OpenAIClient::with_base_url(api_key, base_url))
    }

    pub fn from_client(client: openai_client::OpenAIClient) -> Self {
        Self {
            client,
            streaming: true,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.client = self.client.with_temperature(temperature);
        self
    }

    /// Disables streaming; callers fall back to one blocking call.
    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    fn openai_messages(request: &InferenceRequest) -> Result<Vec<ChatCompletionRequestMessage>> {
        request
            .to_messages()
            .iter()
            .map(chat_message_to_openai)
            .collect()
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, request), fields(model = %request.model, history_len = request.history.len()))]
    async fn infer(&self, request: InferenceRequest) -> Result<String> {
        let messages = Self::openai_messages(&request)?;
        self.client.chat_completion(&request.model, messages).await
    }

    #[instrument(skip(self, request), fields(model = %request.model, history_len = request.history.len()))]
    async fn stream(&self, request: InferenceRequest) -> Result<ChunkStream> {
        let messages = Self::openai_messages(&request)?;
        let stream = self
            .client
            .chat_completion_stream(&request.model, messages)
            .await?;
        Ok(stream
            .map(|item| {
                item.map(|chunk| StreamChunk {
                    content: chunk.content,
                    done: chunk.done,
                })
            })
            .boxed())
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }
}

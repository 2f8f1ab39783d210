//! Scripted [`llm_client::LlmClient`] for handler tests.

use async_trait::async_trait;
use futures::StreamExt;
use llm_client::{ChunkStream, InferenceRequest, LlmClient, StreamChunk};
use std::sync::Mutex;

pub enum Script {
    /// Streams these pieces, then a done chunk.
    Chunks(Vec<String>),
    /// Returns this text from `infer`; streaming is unsupported.
    Blocking(String),
    /// Fails before producing anything.
    Fail,
    /// Never answers.
    Hang,
}

pub struct MockLlm {
    script: Script,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl MockLlm {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn streaming(pieces: &[&str]) -> Self {
        Self::new(Script::Chunks(pieces.iter().map(|p| p.to_string()).collect()))
    }

    pub fn blocking(text: &str) -> Self {
        Self::new(Script::Blocking(text.to_string()))
    }

    pub fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn infer(&self, request: InferenceRequest) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(request);
        match &self.script {
            Script::Blocking(text) => Ok(text.clone()),
            Script::Chunks(pieces) => Ok(pieces.concat()),
            Script::Fail => anyhow::bail!("model unavailable"),
            Script::Hang => std::future::pending().await,
        }
    }

    async fn stream(&self, request: InferenceRequest) -> anyhow::Result<ChunkStream> {
        self.requests.lock().unwrap().push(request);
        match &self.script {
            Script::Chunks(pieces) => {
                let mut chunks: Vec<anyhow::Result<StreamChunk>> =
                    pieces.iter().map(|p| Ok(StreamChunk::text(p.clone()))).collect();
                chunks.push(Ok(StreamChunk::done()));
                Ok(futures::stream::iter(chunks).boxed())
            }
            Script::Blocking(_) => anyhow::bail!("streaming not supported"),
            Script::Fail => anyhow::bail!("model unavailable"),
            Script::Hang => std::future::pending().await,
        }
    }

    fn supports_streaming(&self) -> bool {
        !matches!(self.script, Script::Blocking(_))
    }
}

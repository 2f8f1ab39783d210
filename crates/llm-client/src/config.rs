//! LLM configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// LLM configuration interface for OpenAI-compatible APIs.
pub trait LlmConfig: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    fn image_model(&self) -> &str;
    fn temperature(&self) -> Option<f32>;
    fn use_streaming(&self) -> bool;
    /// Placeholder shown before the first streamed chunk; `None` creates the reply on first output.
    fn thinking_message(&self) -> Option<&str>;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub llm_model: String,
    pub image_model: String,
    pub temperature: Option<f32>,
    pub llm_use_streaming: bool,
    pub llm_thinking_message: Option<String>,
}

impl LlmConfig for EnvLlmConfig {
    fn api_key(&self) -> &str {
        &self.openai_api_key
    }
    fn base_url(&self) -> &str {
        &self.openai_base_url
    }
    fn model(&self) -> &str {
        &self.llm_model
    }
    fn image_model(&self) -> &str {
        &self.image_model
    }
    fn temperature(&self) -> Option<f32> {
        self.temperature
    }
    fn use_streaming(&self) -> bool {
        self.llm_use_streaming
    }
    fn thinking_message(&self) -> Option<&str> {
        self.llm_thinking_message.as_deref()
    }
}

impl EnvLlmConfig {
    /// Load from environment variables.
    ///
    /// `OPENAI_API_KEY` and `MODEL` are required. The base URL comes from `OPENAI_ENDPOINT` or
    /// `OPENAI_BASE_URL` and may be given as a full `/chat/completions` URL.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url = env::var("OPENAI_ENDPOINT")
            .or_else(|_| env::var("OPENAI_BASE_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| normalize_base_url(&s))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let llm_model = env::var("MODEL").context("MODEL not set")?;
        let image_model = env::var("IMAGE_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
        let temperature = match env::var("OPENAI_TEMPERATURE") {
            Ok(s) if !s.trim().is_empty() => Some(
                s.trim()
                    .parse::<f32>()
                    .with_context(|| format!("OPENAI_TEMPERATURE is not a number: {}", s))?,
            ),
            _ => None,
        };
        let llm_use_streaming = env::var("USE_STREAMING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);
        let llm_thinking_message = env::var("THINKING_MESSAGE")
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            openai_api_key,
            openai_base_url,
            llm_model,
            image_model,
            temperature,
            llm_use_streaming,
            llm_thinking_message,
        })
    }
}

/// Strips a trailing `/chat/completions` and slashes so the value works as an API base.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/chat/completions")
        .unwrap_or(trimmed)
        .to_string()
}

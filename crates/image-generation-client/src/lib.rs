//! Image generation client.
//!
//! [`ImageGenerator`] is the seam used by the image keyword handler; [`ImageGenerationClient`]
//! implements it with the OpenAI images API and returns the URL of one generated image.

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateImageRequestArgs, ImageModel, ImageResponseFormat, ImageSize},
    Client,
};
use async_trait::async_trait;
use openai_client::mask_token;
use std::sync::Arc;
use tracing;

/// Text-to-image backend.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates one image for `prompt` and returns its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct ImageGenerationClient {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    size: ImageSize,
    api_key_for_logging: Option<String>,
}

impl ImageGenerationClient {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.clone());
        Self::with_config(config, Some(api_key))
    }

    /// Client for an OpenAI-compatible service at `base_url`.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url);
        Self::with_config(config, Some(api_key))
    }

    fn with_config(config: OpenAIConfig, api_key_for_logging: Option<String>) -> Self {
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "dall-e-3".to_string(),
            size: ImageSize::S1024x1024,
            api_key_for_logging,
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ImageGenerator for ImageGenerationClient {
    #[tracing::instrument(skip(self, prompt))]
    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let masked = self
            .api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string());

        tracing::info!(
            model = %self.model,
            size = ?self.size,
            prompt_preview = %prompt.chars().take(100).collect::<String>(),
            api_key = %masked,
            "OpenAI image generation request"
        );

        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(ImageModel::Other(self.model.clone()))
            .size(self.size)
            .response_format(ImageResponseFormat::Url)
            .n(1)
            .build()?;

        if let Ok(json) = serde_json::to_string(&request) {
            tracing::debug!(request_json = %json, "OpenAI image generation request JSON");
        }

        let response = self.client.images().create(request).await?;

        match response.data.first().and_then(|d| match d.as_ref() {
            async_openai::types::Image::Url { url, .. } => Some(url.clone()),
            _ => None,
        }) {
            Some(url) => {
                tracing::info!(image_url = %url, "OpenAI image generation completed");
                Ok(url)
            }
            None => anyhow::bail!("No image URL in response"),
        }
    }
}

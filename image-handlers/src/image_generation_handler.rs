//! Image generation handler: an addressed trigger containing the image keyword gets one generated
//! image back as a file reply instead of a text answer.

use crate::download::{attachment_file_name, ImageDownloader};
use async_trait::async_trait;
use conversation::is_addressed;
use dbot_core::{Bot, Handler, HandlerResponse, Message, Result};
use image_generation_client::ImageGenerator;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const PAINTING_REACTION: &str = "👨🏻‍🎨";

#[derive(Debug, Clone)]
pub struct ImageHandlerConfig {
    pub bot_id: String,
    /// Empty disables the handler.
    pub keyword: String,
    pub dm_requires_mention: bool,
}

pub struct ImageGenerationHandler {
    bot: Arc<dyn Bot>,
    generator: Arc<dyn ImageGenerator>,
    downloader: Arc<dyn ImageDownloader>,
    config: ImageHandlerConfig,
}

impl ImageGenerationHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        generator: Arc<dyn ImageGenerator>,
        downloader: Arc<dyn ImageDownloader>,
        config: ImageHandlerConfig,
    ) -> Self {
        Self {
            bot,
            generator,
            downloader,
            config,
        }
    }

    fn is_image_request(&self, message: &Message) -> bool {
        !self.config.keyword.is_empty()
            && message.content.contains(&self.config.keyword)
            && is_addressed(message, &self.config.bot_id, self.config.dm_requires_mention)
    }

    /// Generates, downloads and uploads one image. Failures are logged; the trigger stays handled.
    async fn generate_and_send(&self, message: &Message, prompt: &str) {
        let url = match self.generator.generate_image(prompt).await {
            Ok(url) => url,
            Err(e) => {
                error!(error = %e, "Image generation failed");
                return;
            }
        };

        let data = match self.downloader.download(&url).await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, url = %url, "Failed to download image");
                return;
            }
        };

        let filename = attachment_file_name(&url);
        match self.bot.send_file(message, &filename, data).await {
            Ok(sent) => info!(message_id = %sent.id, filename = %filename, "Image sent"),
            Err(e) => error!(error = %e, "Failed to send image"),
        }
    }
}

#[async_trait]
impl Handler for ImageGenerationHandler {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !self.is_image_request(message) {
            return Ok(HandlerResponse::Continue);
        }

        if let Err(e) = self.bot.add_reaction(message, PAINTING_REACTION).await {
            warn!(error = %e, "Failed to add reaction");
        }

        let prompt = message.content.replace(&self.config.keyword, "");
        let prompt = prompt.trim();
        info!(
            prompt_preview = %prompt.chars().take(50).collect::<String>(),
            "Processing image generation request"
        );
        self.generate_and_send(message, prompt).await;

        Ok(HandlerResponse::Stop)
    }
}

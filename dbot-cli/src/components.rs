//! Component factory: builds the LLM client and handler chain from config. Isolates assembly
//! logic from the runner.

use anyhow::{Context, Result};
use conversation::{ContextResolver, ResolverConfig, DEFAULT_WINDOW_SIZE};
use dbot_core::Bot;
use handler_chain::HandlerChain;
use image_generation_client::ImageGenerationClient;
use image_handlers::{HttpImageDownloader, ImageGenerationHandler, ImageHandlerConfig};
use llm_client::{EnvLlmConfig, LlmClient, LlmConfig, OpenAILlmClient};
use llm_handlers::{CommandExtractor, DeliveryConfig, DeliveryEngine, ReplyConfig, ReplyHandler};
use std::sync::Arc;
use storage::MessageStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::config::BotConfig;

/// OpenAI-compatible chat client for the configured endpoint.
pub fn build_llm_client(llm: &EnvLlmConfig) -> Arc<dyn LlmClient> {
    Arc::new(
        OpenAILlmClient::with_base_url(llm.api_key().to_string(), llm.base_url().to_string())
            .with_temperature(llm.temperature())
            .with_streaming(llm.use_streaming()),
    )
}

/// Image handler (when the image keyword is set) followed by the reply handler.
#[instrument(skip_all)]
pub fn build_handler_chain(
    config: &BotConfig,
    store: Arc<dyn MessageStore>,
    bot: Arc<dyn Bot>,
    llm: Arc<dyn LlmClient>,
    cancel: CancellationToken,
) -> Result<HandlerChain> {
    let mut chain = HandlerChain::new();

    if let Some(keyword) = &config.reply.make_image_keyword {
        let generator = ImageGenerationClient::with_base_url(
            config.llm.api_key().to_string(),
            config.llm.base_url().to_string(),
        )
        .with_model(config.llm.image_model().to_string());
        let downloader = HttpImageDownloader::new().context("Failed to build HTTP client")?;
        info!(keyword = %keyword, model = %config.llm.image_model(), "Image generation enabled");
        chain = chain.add_handler(Arc::new(ImageGenerationHandler::new(
            bot.clone(),
            Arc::new(generator),
            Arc::new(downloader),
            ImageHandlerConfig {
                bot_id: config.discord.bot_id.clone(),
                keyword: keyword.clone(),
                dm_requires_mention: config.discord.dm_require_mention,
            },
        )));
    }

    let resolver = ContextResolver::new(
        store.clone(),
        bot.clone(),
        ResolverConfig {
            bot_id: config.discord.bot_id.clone(),
            override_keyword: config.reply.ignore_system_keyword.clone(),
            dm_requires_mention: config.discord.dm_require_mention,
            window_size: DEFAULT_WINDOW_SIZE,
        },
    );
    let engine = DeliveryEngine::new(
        store,
        config.discord.bot_id.clone(),
        DeliveryConfig {
            placeholder: config.llm.thinking_message().map(str::to_string),
            ..DeliveryConfig::default()
        },
    );
    let extractor = CommandExtractor::from_command_line(&config.reply.extractor_command)
        .context("Invalid EXTRACTOR_COMMAND")?
        .with_dir(&config.reply.extractor_dir);

    let reply_config = ReplyConfig {
        model: config.llm.model().to_string(),
        system_prompt_path: config.reply.system_prompt_path.clone(),
        ignore_system_keyword: config.reply.ignore_system_keyword.clone(),
        dm_clean_system: config.reply.dm_clean_system,
        typing: config.reply.typing,
        attach_images: config.reply.attach_images,
        use_streaming: config.llm.use_streaming(),
    };
    let reply_handler = ReplyHandler::new(
        Arc::new(resolver),
        llm,
        Arc::new(engine),
        bot,
        Arc::new(extractor),
        reply_config,
    )
    .with_cancellation(cancel);

    Ok(chain.add_handler(Arc::new(reply_handler)))
}

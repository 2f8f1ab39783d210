//! Reply handler: answers addressed triggers with a model-generated reply.
//!
//! Flow per trigger: resolve context → pick system prompt → optional link reading → optional
//! image attachment → inference (streaming or blocking) → delivery through [`DeliveryEngine`].

use crate::attachments::find_images;
use crate::stream_edit::{BotReplySink, DeliveryEngine};
use crate::url::find_url;
use crate::webpage::ContentExtractor;
use async_trait::async_trait;
use conversation::{contains_keyword, strip_keyword, ContextResolver, Resolution};
use dbot_core::{Bot, DbotError, Handler, HandlerResponse, HistoryItem, Message, Result};
use llm_client::{InferenceRequest, LlmClient};
use prompt::DEFAULT_SYSTEM_MESSAGE;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Reply sent when a link could not be read.
pub const LINK_FAILED_REPLY: &str = "I couldn't read that link.";
const READING_REACTION: &str = "👀";

#[derive(Debug, Clone)]
pub struct ReplyConfig {
    pub model: String,
    pub system_prompt_path: PathBuf,
    /// Keyword that bypasses the system prompt (and reduces context).
    pub ignore_system_keyword: Option<String>,
    /// No system prompt in direct contexts.
    pub dm_clean_system: bool,
    pub typing: bool,
    /// Send the first image attachment to the model.
    pub attach_images: bool,
    pub use_streaming: bool,
}

impl ReplyConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt_path: PathBuf::from("system-prompt.txt"),
            ignore_system_keyword: None,
            dm_clean_system: false,
            typing: false,
            attach_images: false,
            use_streaming: true,
        }
    }
}

pub struct ReplyHandler {
    resolver: Arc<ContextResolver>,
    llm: Arc<dyn LlmClient>,
    engine: Arc<DeliveryEngine>,
    bot: Arc<dyn Bot>,
    extractor: Arc<dyn ContentExtractor>,
    config: ReplyConfig,
    cancel: CancellationToken,
}

impl ReplyHandler {
    pub fn new(
        resolver: Arc<ContextResolver>,
        llm: Arc<dyn LlmClient>,
        engine: Arc<DeliveryEngine>,
        bot: Arc<dyn Bot>,
        extractor: Arc<dyn ContentExtractor>,
        config: ReplyConfig,
    ) -> Self {
        Self {
            resolver,
            llm,
            engine,
            bot,
            extractor,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token observed by resolution and delivery; cancel it to abort in-flight replies.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn keyword(&self) -> Option<&str> {
        self.config.ignore_system_keyword.as_deref()
    }

    /// True when the configured system prompt must not be used for this trigger.
    fn ignores_system_prompt(&self, trigger: &Message, history: &[HistoryItem]) -> bool {
        let keyword = self.keyword();
        contains_keyword(&trigger.content, keyword)
            || history
                .iter()
                .any(|item| !item.is_bot_message && contains_keyword(&item.content, keyword))
            || (trigger.channel.is_direct() && self.config.dm_clean_system)
    }

    async fn system_prompt(&self, ignore_system: bool) -> Result<String> {
        if ignore_system {
            info!("Ignoring system prompt");
            return Ok(DEFAULT_SYSTEM_MESSAGE.to_string());
        }
        let path = &self.config.system_prompt_path;
        let prompt = tokio::fs::read_to_string(path).await.map_err(|e| {
            DbotError::Config(format!(
                "failed to read system prompt {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(prompt.trim().to_string())
    }

    fn find_link<'a>(&self, trigger: &'a Message) -> Option<&'a str> {
        find_url(&trigger.content).or_else(|| {
            trigger
                .referenced
                .as_deref()
                .and_then(|parent| find_url(&parent.content))
        })
    }

    async fn infer_and_deliver(&self, trigger: &Message, request: InferenceRequest) -> Result<String> {
        let sink = BotReplySink::new(self.bot.clone(), trigger.clone());

        let outcome = if self.config.use_streaming && self.llm.supports_streaming() {
            let chunks = tokio::select! {
                _ = self.cancel.cancelled() => return Err(DbotError::Cancelled),
                result = self.llm.stream(request) => result.map_err(|e| {
                    error!(error = %e, "Inference stream failed to start");
                    DbotError::Inference(e.to_string())
                })?,
            };
            self.engine
                .deliver(chunks, &sink, trigger, &self.cancel)
                .await?
        } else {
            let text = tokio::select! {
                _ = self.cancel.cancelled() => return Err(DbotError::Cancelled),
                result = self.llm.infer(request) => result.map_err(|e| {
                    error!(error = %e, "Inference failed");
                    DbotError::Inference(e.to_string())
                })?,
            };
            self.engine.deliver_blocking(&text, &sink, trigger).await?
        };
        Ok(outcome.text)
    }
}

#[async_trait]
impl Handler for ReplyHandler {
    #[instrument(skip(self, message), fields(message_id = %message.id, channel_id = %message.channel.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let context = match self.resolver.resolve(message, &self.cancel).await? {
            Resolution::NotAddressed => return Ok(HandlerResponse::Ignore),
            Resolution::Resolved(context) => context,
        };
        let mut history = context.history;

        let ignore_system = self.ignores_system_prompt(message, &history);
        let system_prompt = self.system_prompt(ignore_system).await?;

        if self.config.typing {
            if let Err(e) = self.bot.broadcast_typing(&message.channel).await {
                warn!(error = %e, "Failed to show typing indicator");
            }
        }

        let content = match (ignore_system, self.keyword()) {
            (true, Some(keyword)) => strip_keyword(&message.content, keyword),
            _ => message.content.clone(),
        };

        let link = self.find_link(message).map(str::to_string);
        let user_message = match link {
            Some(url) if history.len() <= 1 => {
                info!(url = %url, "Found url to read");
                if ignore_system {
                    history.push(HistoryItem {
                        id: message.id.clone(),
                        content: content.replace(&url, "").trim().to_string(),
                        is_bot_message: false,
                        attachments: Vec::new(),
                    });
                }
                if let Err(e) = self.bot.add_reaction(message, READING_REACTION).await {
                    warn!(error = %e, "Failed to add reaction");
                }
                match self.extractor.extract(&url).await {
                    Ok(page) => format!("URL: {}\nContent:\n{}", url, page),
                    Err(e) => {
                        warn!(error = %e, url = %url, "Failed to read link");
                        if let Err(e) = self.bot.reply_to(message, LINK_FAILED_REPLY).await {
                            error!(error = %e, "Failed to send link failure reply");
                        }
                        return Ok(HandlerResponse::Stop);
                    }
                }
            }
            _ => content,
        };

        let images = if self.config.attach_images {
            find_images(message, &history)
        } else {
            Vec::new()
        };
        if !images.is_empty() {
            info!(images = ?images, "Attaching images");
        }

        debug!(
            history_len = history.len(),
            mode = ?context.mode,
            ignore_system = ignore_system,
            "Inferencing"
        );
        let request = InferenceRequest {
            model: self.config.model.clone(),
            system_prompt: Some(system_prompt),
            message: user_message,
            history,
            images,
        };

        let text = self.infer_and_deliver(message, request).await?;
        Ok(HandlerResponse::Reply(text))
    }
}

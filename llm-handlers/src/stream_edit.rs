//! Stream-edit delivery: consumes model chunks and keeps one outbound reply up to date.
//!
//! # Entry points
//!
//! - **[`DeliveryEngine::deliver`]** – Streaming path. Creates the reply on the first non-empty
//!   chunk (or up front with a placeholder), edits it at most once per throttle interval, and
//!   always issues one final edit.
//! - **[`DeliveryEngine::deliver_blocking`]** – Non-streaming path: one send, no edits.
//!
//! Both truncate to [`MAX_REPLY_CHARS`] characters, show [`NO_RESPONSE_MARKER`] instead of an
//! empty reply, and write the delivered reply back to the store as a bot message replying to
//! the trigger.

use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, DbotError, Message, Result, SentMessage};
use futures::StreamExt;
use llm_client::ChunkStream;
use std::sync::Arc;
use std::time::Duration;
use storage::{MessageRecord, MessageStore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

// ---------- Tuning constants ----------

/// Discord rejects messages over 2000 characters.
pub const MAX_REPLY_CHARS: usize = 1999;
/// Minimum interval between two intermediate edits.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);
/// Shown when the model produced no text.
pub const NO_RESPONSE_MARKER: &str = "*(no response generated)*";
/// Shown when generation or delivery failed after the reply was created.
pub const ERROR_MARKER: &str = "*(something went wrong while generating this response)*";

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ---------- Sink ----------

/// Where the reply goes: create once, then edit by id.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn create(&self, text: &str) -> Result<SentMessage>;
    async fn edit(&self, message_id: &str, text: &str) -> Result<SentMessage>;
}

/// [`ReplySink`] over a [`Bot`]: a linked reply in guild channels, a plain message in direct contexts.
pub struct BotReplySink {
    bot: Arc<dyn Bot>,
    trigger: Message,
}

impl BotReplySink {
    pub fn new(bot: Arc<dyn Bot>, trigger: Message) -> Self {
        Self { bot, trigger }
    }
}

#[async_trait]
impl ReplySink for BotReplySink {
    async fn create(&self, text: &str) -> Result<SentMessage> {
        if self.trigger.channel.is_direct() {
            self.bot.send_message(&self.trigger.channel, text).await
        } else {
            self.bot.reply_to(&self.trigger, text).await
        }
    }

    async fn edit(&self, message_id: &str, text: &str) -> Result<SentMessage> {
        self.bot
            .edit_message(&self.trigger.channel, message_id, text)
            .await
    }
}

// ---------- Session ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Placeholder sent, no model output shown yet.
    Created,
    Updating,
    Finalized,
    Errored,
}

/// Per-trigger delivery state.
#[derive(Debug)]
pub struct StreamSession {
    pub buffer: String,
    pub outbound_message_id: Option<String>,
    pub last_edit: Option<Instant>,
    pub state: SessionState,
}

impl StreamSession {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            outbound_message_id: None,
            last_edit: None,
            state: SessionState::Idle,
        }
    }

    fn edit_due(&self, now: Instant, throttle: Duration) -> bool {
        self.state == SessionState::Created
            || self
                .last_edit
                .map_or(true, |last| now.duration_since(last) >= throttle)
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub throttle: Duration,
    pub max_chars: usize,
    /// Text of a reply created before any output arrives.
    pub placeholder: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
            max_chars: MAX_REPLY_CHARS,
            placeholder: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub message_id: String,
    /// Text the reply shows after the final edit.
    pub text: String,
    pub state: SessionState,
}

// ---------- Engine ----------

pub struct DeliveryEngine {
    store: Arc<dyn MessageStore>,
    bot_id: String,
    config: DeliveryConfig,
}

impl DeliveryEngine {
    pub fn new(store: Arc<dyn MessageStore>, bot_id: impl Into<String>, config: DeliveryConfig) -> Self {
        Self {
            store,
            bot_id: bot_id.into(),
            config,
        }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Consumes `chunks` in arrival order and mirrors them into one reply.
    ///
    /// Ends on a `done` chunk or the end of the stream. An `Err` chunk or a sink failure moves the
    /// session to [`SessionState::Errored`], edits the reply to [`ERROR_MARKER`] once (when a
    /// reply exists) and returns the error. Cancellation returns [`DbotError::Cancelled`] and
    /// leaves the reply as last edited.
    #[instrument(skip_all, fields(trigger_id = %trigger.id, channel_id = %trigger.channel.id))]
    pub async fn deliver(
        &self,
        mut chunks: ChunkStream,
        sink: &dyn ReplySink,
        trigger: &Message,
        cancel: &CancellationToken,
    ) -> Result<DeliveryOutcome> {
        let mut session = StreamSession::new();

        if let Some(placeholder) = &self.config.placeholder {
            match sink.create(placeholder).await {
                Ok(sent) => {
                    session.outbound_message_id = Some(sent.id);
                    session.last_edit = Some(Instant::now());
                    session.state = SessionState::Created;
                }
                Err(e) => return self.fail(&mut session, sink, e).await,
            }
        }

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(state = ?session.state, "Delivery cancelled");
                    return Err(DbotError::Cancelled);
                }
                next = chunks.next() => next,
            };

            match next {
                None => break,
                Some(Err(e)) => {
                    let err = DbotError::Inference(e.to_string());
                    return self.fail(&mut session, sink, err).await;
                }
                Some(Ok(chunk)) => {
                    session.buffer.push_str(&chunk.content);
                    // The final chunk is shown by the finalize edit only.
                    if chunk.done {
                        break;
                    }
                    if !chunk.content.is_empty() {
                        if let Err(e) = self.apply(&mut session, sink).await {
                            return self.fail(&mut session, sink, e).await;
                        }
                    }
                }
            }
        }

        let text = match self.finalize(&mut session, sink).await {
            Ok(text) => text,
            Err(e) => return self.fail(&mut session, sink, e).await,
        };
        let message_id = session.outbound_message_id.clone().unwrap_or_default();
        self.write_back(&message_id, &text, trigger).await;

        info!(
            message_id = %message_id,
            chars = text.chars().count(),
            "Streamed reply finalized"
        );
        Ok(DeliveryOutcome {
            message_id,
            text,
            state: session.state,
        })
    }

    /// Sends `text` as a single reply (no intermediate edits).
    #[instrument(skip_all, fields(trigger_id = %trigger.id, channel_id = %trigger.channel.id))]
    pub async fn deliver_blocking(
        &self,
        text: &str,
        sink: &dyn ReplySink,
        trigger: &Message,
    ) -> Result<DeliveryOutcome> {
        let shown = self.shown_text(text);
        let sent = sink.create(&shown).await.map_err(|e| {
            error!(error = %e, "Failed to send reply");
            e
        })?;
        self.write_back(&sent.id, &shown, trigger).await;

        info!(message_id = %sent.id, chars = shown.chars().count(), "Reply sent");
        Ok(DeliveryOutcome {
            message_id: sent.id,
            text: shown,
            state: SessionState::Finalized,
        })
    }

    /// Creates the reply on first output, otherwise edits when the throttle interval has passed.
    async fn apply(&self, session: &mut StreamSession, sink: &dyn ReplySink) -> Result<()> {
        let now = Instant::now();
        match session.outbound_message_id.clone() {
            None => {
                let sent = sink
                    .create(&truncate_chars(&session.buffer, self.config.max_chars))
                    .await?;
                debug!(message_id = %sent.id, "Reply created");
                session.outbound_message_id = Some(sent.id);
                session.last_edit = Some(now);
                session.state = SessionState::Updating;
            }
            Some(id) if session.edit_due(now, self.config.throttle) => {
                sink.edit(&id, &truncate_chars(&session.buffer, self.config.max_chars))
                    .await?;
                session.last_edit = Some(now);
                session.state = SessionState::Updating;
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Final edit with the full (truncated) buffer or the empty marker. Returns the shown text.
    async fn finalize(&self, session: &mut StreamSession, sink: &dyn ReplySink) -> Result<String> {
        let text = self.shown_text(&session.buffer);
        match session.outbound_message_id.clone() {
            Some(id) => {
                sink.edit(&id, &text).await?;
            }
            None => {
                let sent = sink.create(&text).await?;
                session.outbound_message_id = Some(sent.id);
            }
        }
        session.last_edit = Some(Instant::now());
        session.state = SessionState::Finalized;
        Ok(text)
    }

    async fn fail<T>(
        &self,
        session: &mut StreamSession,
        sink: &dyn ReplySink,
        err: DbotError,
    ) -> Result<T> {
        session.state = SessionState::Errored;
        error!(error = %err, "Reply delivery failed");
        if let Some(id) = &session.outbound_message_id {
            if let Err(e) = sink.edit(id, ERROR_MARKER).await {
                warn!(error = %e, message_id = %id, "Failed to show error marker");
            }
        }
        Err(err)
    }

    fn shown_text(&self, text: &str) -> String {
        if text.trim().is_empty() {
            NO_RESPONSE_MARKER.to_string()
        } else {
            truncate_chars(text, self.config.max_chars)
        }
    }

    /// Stores the delivered reply; failures are logged and swallowed.
    async fn write_back(&self, message_id: &str, text: &str, trigger: &Message) {
        let record = MessageRecord {
            id: message_id.to_string(),
            channel_id: trigger.channel.id.clone(),
            author_id: self.bot_id.clone(),
            content: text.to_string(),
            is_bot_message: true,
            attachments: Vec::new(),
            referenced_id: Some(trigger.id.clone()),
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.upsert(&record).await {
            warn!(error = %e, message_id = %message_id, "Failed to store bot reply");
        }
    }
}

//! Context resolver: turns a trigger message into the ordered history sent to the model.
//!
//! The reply chain comes from the store first; where the store runs out the resolver walks the
//! rest with live fetches through [`Bot::fetch_message`] and writes every fetched message back.
//! In full mode the chain is followed by recent channel messages whose text is not already present.

use crate::mention::{contains_keyword, is_addressed, strip_keyword};
use dbot_core::{Bot, Channel, DbotError, HistoryItem, Message, Result};
use std::collections::HashSet;
use std::sync::Arc;
use storage::{ChainEnd, MessageRecord, MessageStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Number of recent channel records used for enrichment.
pub const DEFAULT_WINDOW_SIZE: i64 = 50;

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub bot_id: String,
    /// Keyword that switches to reduced context (parent only, no window).
    pub override_keyword: Option<String>,
    /// Keep the mention/reply check in direct contexts.
    pub dm_requires_mention: bool,
    pub window_size: i64,
}

impl ResolverConfig {
    pub fn new(bot_id: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            override_keyword: None,
            dm_requires_mention: false,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    /// Reply chain plus recent channel window.
    Full,
    /// Immediate parent only.
    Reduced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    /// Chain oldest-first, then window items in scan order.
    pub history: Vec<HistoryItem>,
    pub mode: ContextMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The bot was not addressed; nothing was written.
    NotAddressed,
    Resolved(ResolvedContext),
}

pub struct ContextResolver {
    store: Arc<dyn MessageStore>,
    bot: Arc<dyn Bot>,
    config: ResolverConfig,
}

impl ContextResolver {
    pub fn new(store: Arc<dyn MessageStore>, bot: Arc<dyn Bot>, config: ResolverConfig) -> Self {
        Self { store, bot, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves the context of `trigger`. Returns [`DbotError::Cancelled`] if `cancel` fires
    /// while a live fetch is pending.
    #[instrument(skip(self, trigger, cancel), fields(message_id = %trigger.id, channel_id = %trigger.channel.id))]
    pub async fn resolve(&self, trigger: &Message, cancel: &CancellationToken) -> Result<Resolution> {
        if !is_addressed(trigger, &self.config.bot_id, self.config.dm_requires_mention) {
            debug!("Bot not addressed, skipping");
            return Ok(Resolution::NotAddressed);
        }

        self.store_message(trigger).await;
        if let Some(parent) = trigger.referenced.as_deref() {
            self.store_message(parent).await;
        }

        if contains_keyword(&trigger.content, self.config.override_keyword.as_deref()) {
            let history = self.reduced_history(trigger, cancel).await?;
            info!(history_len = history.len(), "Resolved reduced context");
            return Ok(Resolution::Resolved(ResolvedContext {
                history,
                mode: ContextMode::Reduced,
            }));
        }

        let mut history = self.assemble_chain(trigger, cancel).await?;
        let chain_len = history.len();
        self.enrich_with_window(trigger, &mut history).await;

        info!(
            chain_len = chain_len,
            window_added = history.len() - chain_len,
            "Resolved full context"
        );
        Ok(Resolution::Resolved(ResolvedContext {
            history,
            mode: ContextMode::Full,
        }))
    }

    /// Reply chain of the trigger, oldest-first, excluding the trigger.
    async fn assemble_chain(
        &self,
        trigger: &Message,
        cancel: &CancellationToken,
    ) -> Result<Vec<HistoryItem>> {
        let Some(parent_id) = trigger.referenced_id.as_deref() else {
            return Ok(Vec::new());
        };

        let visited = HashSet::from([trigger.id.clone()]);
        let walk = self.store.walk_ancestors(parent_id, visited).await;

        match walk.end {
            ChainEnd::Missing(missing_id) => {
                debug!(
                    stored = walk.items.len(),
                    missing_id = %missing_id,
                    "Store chain incomplete, fetching remaining ancestors"
                );
                let mut visited = walk.visited;
                visited.remove(&missing_id);
                let mut chain = self
                    .fetch_ancestors(&trigger.channel, missing_id, visited, cancel)
                    .await?;
                chain.extend(walk.items);
                Ok(chain)
            }
            ChainEnd::Cycle(id) => {
                warn!(message_id = %id, "Reply cycle detected, chain truncated");
                Ok(walk.items)
            }
            ChainEnd::Root => Ok(walk.items),
        }
    }

    /// Walks ancestors from `start_id` with live fetches, writing each one through to the store.
    /// Returns them oldest-first. A failed fetch ends the walk, keeping what was found.
    async fn fetch_ancestors(
        &self,
        channel: &Channel,
        start_id: String,
        mut visited: HashSet<String>,
        cancel: &CancellationToken,
    ) -> Result<Vec<HistoryItem>> {
        let mut newest_first = Vec::new();
        let mut next = Some(start_id);

        while let Some(id) = next.take() {
            if !visited.insert(id.clone()) {
                warn!(message_id = %id, "Reply cycle detected during live fetch");
                break;
            }
            let message = match self.fetch(channel, &id, cancel).await? {
                Some(message) => message,
                None => break,
            };
            self.store_message(&message).await;
            newest_first.push(self.history_item(&message));
            next = message.referenced_id;
        }

        newest_first.reverse();
        Ok(newest_first)
    }

    /// Live fetch raced against cancellation. `Ok(None)` when the platform call fails.
    async fn fetch(
        &self,
        channel: &Channel,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Message>> {
        let fetched = tokio::select! {
            _ = cancel.cancelled() => return Err(DbotError::Cancelled),
            result = self.bot.fetch_message(channel, id) => result,
        };
        match fetched {
            Ok(message) => Ok(Some(message)),
            Err(e) => {
                warn!(error = %e, message_id = %id, "Live fetch failed, chain truncated");
                Ok(None)
            }
        }
    }

    /// Reduced mode: the immediate parent only, keyword stripped.
    async fn reduced_history(
        &self,
        trigger: &Message,
        cancel: &CancellationToken,
    ) -> Result<Vec<HistoryItem>> {
        let Some(parent_id) = trigger.referenced_id.as_deref() else {
            return Ok(Vec::new());
        };

        let mut item = match self.store.get(parent_id).await {
            Ok(Some(record)) => Some(record.to_history_item()),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, message_id = %parent_id, "Failed to read parent from store");
                None
            }
        };
        if item.is_none() {
            item = trigger
                .referenced
                .as_deref()
                .map(|parent| self.history_item(parent));
        }
        if item.is_none() {
            if let Some(parent) = self.fetch(&trigger.channel, parent_id, cancel).await? {
                self.store_message(&parent).await;
                item = Some(self.history_item(&parent));
            }
        }

        let keyword = self.config.override_keyword.as_deref().unwrap_or_default();
        Ok(item
            .map(|mut parent| {
                parent.content = strip_keyword(&parent.content, keyword);
                parent
            })
            .into_iter()
            .collect())
    }

    /// Appends recent channel records whose content is not already present (trigger included).
    async fn enrich_with_window(&self, trigger: &Message, history: &mut Vec<HistoryItem>) {
        let window = match self
            .store
            .get_recent_window(&trigger.channel.id, self.config.window_size)
            .await
        {
            Ok(window) => window,
            Err(e) => {
                warn!(error = %e, channel_id = %trigger.channel.id, "Failed to read channel window");
                return;
            }
        };

        let mut seen_ids: HashSet<String> = history.iter().map(|h| h.id.clone()).collect();
        seen_ids.insert(trigger.id.clone());
        let mut seen_contents: HashSet<String> = history.iter().map(|h| h.content.clone()).collect();
        seen_contents.insert(trigger.content.clone());

        for record in window {
            if seen_ids.contains(&record.id) || !seen_contents.insert(record.content.clone()) {
                continue;
            }
            seen_ids.insert(record.id.clone());
            history.push(record.to_history_item());
        }
    }

    fn history_item(&self, message: &Message) -> HistoryItem {
        self.record(message).to_history_item()
    }

    fn record(&self, message: &Message) -> MessageRecord {
        MessageRecord::from_message(message, message.author.id == self.config.bot_id)
    }

    /// Write-through; failures are logged and swallowed.
    async fn store_message(&self, message: &Message) {
        if let Err(e) = self.store.upsert(&self.record(message)).await {
            warn!(error = %e, message_id = %message.id, "Failed to store message");
        }
    }
}

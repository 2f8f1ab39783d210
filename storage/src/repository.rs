//! [`MessageStore`]: the persisted message store contract.
//!
//! Implemented by [`crate::MessageRepository`] (SQLite). The chain walk is provided on top of
//! [`MessageStore::get`], so any implementation gets the same cycle guard.

use crate::error::StorageError;
use crate::models::{ChainEnd, ChainWalk, MessageRecord};
use async_trait::async_trait;
use dbot_core::HistoryItem;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Write-through cache of observed messages, keyed by message id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Inserts or overwrites the record with the same id (last write wins, never a merge).
    async fn upsert(&self, record: &MessageRecord) -> Result<(), StorageError>;

    /// Returns the record with this id, if stored.
    async fn get(&self, id: &str) -> Result<Option<MessageRecord>, StorageError>;

    /// Most recent records of a channel, newest-first, at most `limit`.
    async fn get_recent_window(
        &self,
        channel_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, StorageError>;

    /// Walks `referenced_id` pointers starting at `start_id`. Ids in `visited` are never entered.
    ///
    /// Stops at a root, a missing record, or a repeated id. Read errors are logged and reported as
    /// [`ChainEnd::Missing`] so the caller can fall back to a live fetch.
    async fn walk_ancestors(&self, start_id: &str, mut visited: HashSet<String>) -> ChainWalk {
        let mut newest_first = Vec::new();
        let mut current = start_id.to_string();

        let end = loop {
            if !visited.insert(current.clone()) {
                break ChainEnd::Cycle(current);
            }
            let record = match self.get(&current).await {
                Ok(Some(record)) => record,
                Ok(None) => {
                    debug!(message_id = %current, "Message not found in store");
                    break ChainEnd::Missing(current);
                }
                Err(e) => {
                    warn!(error = %e, message_id = %current, "Failed to read message from store");
                    break ChainEnd::Missing(current);
                }
            };
            newest_first.push(record.to_history_item());
            match record.referenced_id {
                Some(parent) => current = parent,
                None => break ChainEnd::Root,
            }
        };

        newest_first.reverse();
        ChainWalk {
            items: newest_first,
            visited,
            end,
        }
    }

    /// Ancestors of the message `id`, oldest-first, excluding the message itself.
    /// Truncates silently at a missing record, a null reference or a cycle.
    async fn get_chain_from(&self, id: &str) -> Vec<HistoryItem> {
        let parent = match self.get(id).await {
            Ok(Some(record)) => record.referenced_id,
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, message_id = %id, "Failed to read message from store");
                None
            }
        };
        match parent {
            Some(parent) => {
                let visited = HashSet::from([id.to_string()]);
                self.walk_ancestors(&parent, visited).await.items
            }
            None => Vec::new(),
        }
    }
}

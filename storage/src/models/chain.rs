//! Result of walking a reply chain through the store.

use dbot_core::HistoryItem;
use std::collections::HashSet;

/// Why a chain walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEnd {
    /// Reached a record with no reference.
    Root,
    /// The record with this id is not available (absent or unreadable).
    Missing(String),
    /// This id was already visited in the current resolution.
    Cycle(String),
}

/// Ancestors found by a walk, oldest-first, plus the ids visited on the way.
#[derive(Debug, Clone)]
pub struct ChainWalk {
    pub items: Vec<HistoryItem>,
    pub visited: HashSet<String>,
    pub end: ChainEnd,
}

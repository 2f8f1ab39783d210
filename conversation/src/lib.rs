//! # conversation
//!
//! Context resolution for a trigger message: addressing check, reply-chain assembly (store first,
//! live fetch fallback), recent-window enrichment and the reduced (parent-only) mode.

pub mod mention;
pub mod resolver;

pub use mention::{contains_keyword, is_addressed, strip_keyword};
pub use resolver::{
    ContextMode, ContextResolver, ResolvedContext, Resolution, ResolverConfig, DEFAULT_WINDOW_SIZE,
};

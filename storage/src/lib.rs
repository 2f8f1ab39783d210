//! Storage crate: persisted message store.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – MessageRecord, ChainWalk
//! - [`repository`] – MessageStore trait (upsert, get, chain walk, recent window)
//! - [`message_repo`] – MessageRepository (SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod message_repo;
mod models;
mod repository;
mod sqlite_pool;

pub use error::StorageError;
pub use message_repo::MessageRepository;
pub use models::{ChainEnd, ChainWalk, MessageRecord};
pub use repository::MessageStore;
pub use sqlite_pool::SqlitePoolManager;

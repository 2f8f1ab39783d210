//! # dbot-core
//!
//! Core types and traits for the bot: [`Bot`], [`Handler`], message, channel and history types,
//! and tracing initialization. Transport-agnostic; used by dbot-discord, storage, conversation and llm-handlers.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{DbotError, Result};
pub use logger::init_tracing;
pub use types::{
    Attachment, Channel, Handler, HandlerResponse, HistoryItem, Message, SentMessage,
    ToCoreMessage, User,
};

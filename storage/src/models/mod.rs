//! Data models for storage (message records, chain walks).

mod chain;
mod message_record;

pub use chain::{ChainEnd, ChainWalk};
pub use message_record::MessageRecord;
pub(crate) use message_record::MessageRow;

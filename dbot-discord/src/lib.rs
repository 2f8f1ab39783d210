//! # dbot-discord
//!
//! Discord bot framework layer: serenity adapters, [`dbot_core::Bot`] implementation, minimal
//! config, gateway runner with a bounded intake queue and per-trigger dispatch.
//! Handles only Discord connectivity and handler-chain execution; no persistence or AI logic.

mod adapters;
mod bot_adapter;
mod config;
mod dispatcher;
mod runner;

pub use adapters::{reaction_name, DiscordMessageWrapper, DiscordUserWrapper};
pub use bot_adapter::{parse_snowflake, DiscordBotAdapter};
pub use config::{bool_var, DiscordConfig};
pub use dispatcher::{dispatch, IntakeQueue, INTAKE_QUEUE_CAPACITY};
pub use runner::{gateway_intents, run, BonkPolicy, IntakeFilter};

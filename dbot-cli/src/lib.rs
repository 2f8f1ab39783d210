//! # dbot-cli
//!
//! CLI foundation for the `dbot` binary: argument parsing, aggregated config, component wiring
//! and the run / thread commands.

pub mod cli;
pub mod components;
pub mod config;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_handler_chain, build_llm_client};
pub use config::{BaseConfig, BotConfig, ReplySettings};
pub use runner::{run_bot, show_thread};

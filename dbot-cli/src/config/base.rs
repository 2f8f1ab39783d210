//! Base config: logging and the message database. Loaded from env.

use anyhow::Result;
use std::env;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_DATABASE_URL: &str = "messages.db";
pub const DEFAULT_LOG_FILE: &str = "logs/dbot.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// DB_PATH or DATABASE_URL (SQLite path or URL)
    pub database_url: String,
    /// LOG_FILE
    pub log_file: String,
    /// LOG_LEVEL; used when RUST_LOG is unset
    pub log_level: String,
}

fn var_or(keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default.to_string())
}

impl BaseConfig {
    pub fn load() -> Result<Self> {
        Ok(Self {
            database_url: var_or(&["DB_PATH", "DATABASE_URL"], DEFAULT_DATABASE_URL),
            log_file: var_or(&["LOG_FILE"], DEFAULT_LOG_FILE),
            log_level: var_or(&["LOG_LEVEL"], DEFAULT_LOG_LEVEL),
        })
    }

    /// LOG_LEVEL must be a valid tracing filter directive.
    pub fn validate(&self) -> Result<()> {
        if EnvFilter::try_new(&self.log_level).is_err() {
            anyhow::bail!("LOG_LEVEL is not a valid filter: {}", self.log_level);
        }
        Ok(())
    }
}

//! Minimal Discord framework config: token, bot identity, intake and bonk settings.
//! Loaded from `DISCORD_*` environment variables.

use anyhow::{Context, Result};
use std::env;

pub struct DiscordConfig {
    pub token: String,
    pub bot_id: String,
    /// User allowed to delete messages with the bonk reaction.
    pub superuser_id: Option<String>,
    /// Reaction that deletes the reacted message; `None` disables bonk.
    pub bonk_emoji_name: Option<String>,
    pub bonk_from_anyone: bool,
    pub allow_dm: bool,
    pub dm_require_mention: bool,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a boolean variable; unset or empty means `default`.
pub fn bool_var(key: &str, default: bool) -> Result<bool> {
    match non_empty_var(key) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("{} must be a boolean, got '{}'", key, other),
        },
    }
}

impl DiscordConfig {
    /// Loads from env: `DISCORD_TOKEN` and `DISCORD_BOT_ID` required, the rest optional.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Like [`Self::from_env`]; `token` overrides `DISCORD_TOKEN` if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let token = match token {
            Some(token) => token,
            None => non_empty_var("DISCORD_TOKEN").context("DISCORD_TOKEN not set")?,
        };
        let bot_id = non_empty_var("DISCORD_BOT_ID").context("DISCORD_BOT_ID not set")?;
        Ok(Self {
            token,
            bot_id,
            superuser_id: non_empty_var("DISCORD_SUPERUSER_ID"),
            bonk_emoji_name: non_empty_var("DISCORD_BONK_EMOJI_NAME"),
            bonk_from_anyone: bool_var("DISCORD_BONK_FROM_ANYONE", false)?,
            allow_dm: bool_var("DISCORD_ALLOW_DM", false)?,
            dm_require_mention: bool_var("DISCORD_DM_REQUIRE_MENTION", false)?,
        })
    }

    /// Config with the given token and bot id; everything else off.
    pub fn with_token(token: String, bot_id: String) -> Self {
        Self {
            token,
            bot_id,
            superuser_id: None,
            bonk_emoji_name: None,
            bonk_from_anyone: false,
            allow_dm: false,
            dm_require_mention: false,
        }
    }
}

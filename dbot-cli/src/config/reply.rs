//! Reply behaviour settings: system prompt, keywords, link reading, attachments.

use anyhow::Result;
use dbot_discord::bool_var;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_SYSTEM_PROMPT_PATH: &str = "system-prompt.txt";
pub const DEFAULT_EXTRACTOR_COMMAND: &str = "node index.js";
pub const DEFAULT_EXTRACTOR_DIR: &str = "content-from-webpage";

#[derive(Debug, Clone)]
pub struct ReplySettings {
    pub system_prompt_path: PathBuf,
    /// DISCORD_IGNORE_SYSTEM_KEYWORD: no system prompt, reduced context
    pub ignore_system_keyword: Option<String>,
    /// DISCORD_MAKE_IMAGE_KEYWORD
    pub make_image_keyword: Option<String>,
    pub dm_clean_system: bool,
    pub typing: bool,
    pub attach_images: bool,
    /// Command line of the webpage extractor; the URL is appended
    pub extractor_command: String,
    pub extractor_dir: PathBuf,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ReplySettings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            system_prompt_path: non_empty_var("SYSTEM_PROMPT_PATH")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT_PATH.to_string())
                .into(),
            ignore_system_keyword: non_empty_var("DISCORD_IGNORE_SYSTEM_KEYWORD"),
            make_image_keyword: non_empty_var("DISCORD_MAKE_IMAGE_KEYWORD"),
            dm_clean_system: bool_var("DISCORD_DM_CLEAN_SYSTEM", false)?,
            typing: bool_var("DISCORD_TYPING", false)?,
            attach_images: bool_var("ATTACH_IMAGES", false)?,
            extractor_command: non_empty_var("EXTRACTOR_COMMAND")
                .unwrap_or_else(|| DEFAULT_EXTRACTOR_COMMAND.to_string()),
            extractor_dir: non_empty_var("EXTRACTOR_DIR")
                .unwrap_or_else(|| DEFAULT_EXTRACTOR_DIR.to_string())
                .into(),
        })
    }
}

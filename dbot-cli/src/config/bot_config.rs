//! BotConfig: BaseConfig + Discord + LLM + reply settings. Use load() for env-based loading.

use anyhow::Result;
use dbot_discord::{parse_snowflake, DiscordConfig};
use llm_client::{EnvLlmConfig, LlmConfig};

use super::{BaseConfig, ReplySettings};

pub struct BotConfig {
    pub base: BaseConfig,
    pub discord: DiscordConfig,
    pub llm: EnvLlmConfig,
    pub reply: ReplySettings,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides DISCORD_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        Ok(Self {
            base: BaseConfig::load()?,
            discord: DiscordConfig::load(token)?,
            llm: EnvLlmConfig::from_env()?,
            reply: ReplySettings::from_env()?,
        })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;

        parse_snowflake(&self.discord.bot_id)
            .map_err(|_| anyhow::anyhow!("DISCORD_BOT_ID is not a Discord id: {}", self.discord.bot_id))?;
        if let Some(superuser) = &self.discord.superuser_id {
            parse_snowflake(superuser)
                .map_err(|_| anyhow::anyhow!("DISCORD_SUPERUSER_ID is not a Discord id: {}", superuser))?;
        }

        if let Some(temperature) = self.llm.temperature() {
            if !(0.0..=2.0).contains(&temperature) {
                anyhow::bail!("OPENAI_TEMPERATURE must be between 0 and 2, got {}", temperature);
            }
        }

        if !self.reply.system_prompt_path.is_file() {
            anyhow::bail!(
                "SYSTEM_PROMPT_PATH does not point to a file: {}",
                self.reply.system_prompt_path.display()
            );
        }
        if self.reply.extractor_command.trim().is_empty() {
            anyhow::bail!("EXTRACTOR_COMMAND is empty");
        }
        Ok(())
    }

    pub fn bot_id(&self) -> &str {
        &self.discord.bot_id
    }
    pub fn model(&self) -> &str {
        self.llm.model()
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
}

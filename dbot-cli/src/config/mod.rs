//! Bot configuration: BaseConfig (log + DB) + Discord + LLM + reply settings, loaded from env.

mod base;
mod bot_config;
mod reply;


pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use reply::ReplySettings;

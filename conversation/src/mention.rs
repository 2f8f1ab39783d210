//! Addressing and keyword helpers.

use dbot_core::Message;

/// Returns true when the trigger is meant for the bot.
///
/// A trigger is addressed when it mentions `bot_id` or replies to a message authored by `bot_id`.
/// Direct contexts are always addressed unless `dm_requires_mention` is set.
pub fn is_addressed(trigger: &Message, bot_id: &str, dm_requires_mention: bool) -> bool {
    if trigger.channel.is_direct() && !dm_requires_mention {
        return true;
    }
    trigger.mentions_user(bot_id) || trigger.replies_to_author(bot_id)
}

/// Returns true when `keyword` is configured (non-empty) and occurs in `text`.
pub fn contains_keyword(text: &str, keyword: Option<&str>) -> bool {
    match keyword {
        Some(k) if !k.is_empty() => text.contains(k),
        _ => false,
    }
}

/// Removes every occurrence of `keyword` from `text` and trims the result.
pub fn strip_keyword(text: &str, keyword: &str) -> String {
    if keyword.is_empty() {
        return text.trim().to_string();
    }
    text.replace(keyword, "").trim().to_string()
}

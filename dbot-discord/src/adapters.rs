//! Adapters from Discord (serenity) types to dbot_core types.
//! Depends only on serenity model and dbot_core type definitions.

use chrono::{DateTime, Utc};
use dbot_core::{Attachment, Channel, Message, ToCoreMessage, User};
use serenity::model::channel::{Message as DiscordMessage, ReactionType};
use serenity::model::Timestamp;

/// Wraps a serenity User for conversion to core [`User`].
pub struct DiscordUserWrapper<'a>(pub &'a serenity::model::user::User);

impl<'a> DiscordUserWrapper<'a> {
    pub fn to_core(&self) -> User {
        User {
            id: self.0.id.to_string(),
            name: self.0.name.clone(),
            is_bot: self.0.bot,
        }
    }
}

/// Wraps a serenity Message for conversion to core [`Message`].
pub struct DiscordMessageWrapper<'a>(pub &'a DiscordMessage);

impl<'a> ToCoreMessage for DiscordMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let msg = self.0;
        Message {
            id: msg.id.to_string(),
            channel: Channel {
                id: msg.channel_id.to_string(),
                guild_id: msg.guild_id.map(|id| id.to_string()),
            },
            author: DiscordUserWrapper(&msg.author).to_core(),
            content: msg.content.clone(),
            attachments: msg
                .attachments
                .iter()
                .map(|a| Attachment {
                    url: a.url.clone(),
                    content_type: a.content_type.clone(),
                    filename: a.filename.clone(),
                })
                .collect(),
            mentions: msg.mentions.iter().map(|u| u.id.to_string()).collect(),
            referenced: msg
                .referenced_message
                .as_deref()
                .map(|parent| Box::new(DiscordMessageWrapper(parent).to_core())),
            referenced_id: self.referenced_id(),
            created_at: to_utc(&msg.timestamp),
        }
    }
}

impl<'a> DiscordMessageWrapper<'a> {
    /// Id of the replied-to message, from the reference or the embedded parent.
    fn referenced_id(&self) -> Option<String> {
        self.0
            .message_reference
            .as_ref()
            .and_then(|r| r.message_id)
            .or_else(|| self.0.referenced_message.as_ref().map(|m| m.id))
            .map(|id| id.to_string())
    }
}

/// Full millisecond precision; same-second messages must keep their order in the store.
fn to_utc(timestamp: &Timestamp) -> DateTime<Utc> {
    **timestamp
}

/// Name used to match a reaction against the configured emoji: the character itself for
/// unicode emoji, the name for custom ones.
pub fn reaction_name(reaction: &ReactionType) -> Option<&str> {
    match reaction {
        ReactionType::Unicode(name) => Some(name.as_str()),
        ReactionType::Custom { name, .. } => name.as_deref(),
        _ => None,
    }
}

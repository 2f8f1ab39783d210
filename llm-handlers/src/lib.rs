//! # llm-handlers
//!
//! Reply generation for addressed triggers:
//!
//! - [`stream_edit`] – delivery engine: creates the reply and edits it as chunks arrive
//! - [`reply_handler`] – [`ReplyHandler`]: resolve context, build the request, infer, deliver
//! - [`webpage`] – content extraction for links (external command)
//! - [`url`] / [`attachments`] – link and image detection

pub mod attachments;
pub mod reply_handler;
pub mod stream_edit;
pub mod url;
pub mod webpage;

pub use attachments::{find_images, is_image_content_type, IMAGE_CONTENT_TYPES};
pub use reply_handler::{ReplyConfig, ReplyHandler, LINK_FAILED_REPLY};
pub use stream_edit::{
    truncate_chars, BotReplySink, DeliveryConfig, DeliveryEngine, DeliveryOutcome, ReplySink,
    SessionState, StreamSession, ERROR_MARKER, MAX_REPLY_CHARS, NO_RESPONSE_MARKER,
};
pub use url::find_url;
pub use webpage::{CommandExtractor, ContentExtractor};

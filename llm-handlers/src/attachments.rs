//! Image attachment selection.

use dbot_core::{HistoryItem, Message};

/// Content types sent to the model as images.
pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/tiff",
    "image/bmp",
    "image/x-icon",
    "image/vnd.microsoft.icon",
    "image/heic",
    "image/heif",
    "image/avif",
    "image/jxl",
];

pub fn is_image_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .map(|ct| IMAGE_CONTENT_TYPES.contains(&ct.as_str()))
        .unwrap_or(false)
}

/// URL of the first image attached to the trigger, else to the first history item that has one.
/// At most one image is returned.
pub fn find_images(trigger: &Message, history: &[HistoryItem]) -> Vec<String> {
    trigger
        .attachments
        .iter()
        .chain(history.iter().flat_map(|item| item.attachments.iter()))
        .find(|a| is_image_content_type(a.content_type.as_deref()))
        .map(|a| vec![a.url.clone()])
        .unwrap_or_default()
}

//! Link detection.

use regex::Regex;
use std::sync::LazyLock;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://[^\s]+").expect("hardcoded url regex"));

/// First `https://` URL in `text`, up to the next whitespace.
pub fn find_url(text: &str) -> Option<&str> {
    URL_PATTERN.find(text).map(|m| m.as_str())
}

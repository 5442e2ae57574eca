//! Post metadata derivation
//!
//! Titles, body text and author labels for extracted links. Post markup is
//! partial more often than not, so every accessor has a fallback and none
//! of them fail.

use super::dom::{text_content, LinkCandidate, PostElement};
use crate::config::PlatformProfile;
use regex::Regex;
use scraper::Selector;
use std::sync::OnceLock;
use tracing::warn;

/// Author label used when a post carries no identity markup
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Characters of post text used for a derived title
pub const TITLE_CHARS: usize = 50;

/// Title used when a link has no text, no host and no URL
pub const UNTITLED_LINK: &str = "Untitled link";

const MIN_ANCHOR_TITLE_CHARS: usize = 3;

fn handle_pattern() -> &'static Regex {
    static HANDLE: OnceLock<Regex> = OnceLock::new();
    HANDLE.get_or_init(|| Regex::new(r"@[A-Za-z0-9_]+").expect("static regex"))
}

/// Parse a selector from configuration, logging and skipping bad ones
pub(crate) fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("Ignoring invalid selector {:?}: {:?}", raw, e);
            None
        }
    }
}

/// Derives title, text and author for a link inside a post
#[derive(Debug, Clone)]
pub struct MetadataDeriver {
    body_text: Option<Selector>,
    author: Vec<Selector>,
}

impl MetadataDeriver {
    /// Create a deriver using a platform's selectors
    pub fn new(platform: &PlatformProfile) -> Self {
        Self {
            body_text: parse_selector(&platform.body_text_selector),
            author: platform
                .author_selectors
                .iter()
                .filter_map(|s| parse_selector(s))
                .collect(),
        }
    }

    /// Trimmed body text of the post, or an empty string
    pub fn post_text(&self, post: &PostElement<'_>) -> String {
        self.body_text
            .as_ref()
            .and_then(|sel| post.find(sel))
            .map(|el| text_content(el).trim().to_string())
            .unwrap_or_default()
    }

    /// Human-readable title for a link; never empty
    pub fn title(&self, link: &LinkCandidate, post: &PostElement<'_>) -> String {
        let anchor = link.text.trim();
        if !anchor.is_empty()
            && !anchor.contains("http")
            && anchor.chars().count() >= MIN_ANCHOR_TITLE_CHARS
        {
            return anchor.to_string();
        }

        let text = self.post_text(post);
        if !text.is_empty() {
            let head: String = text.chars().take(TITLE_CHARS).collect();
            let head = head.trim();
            if !head.is_empty() {
                return if head.chars().count() == TITLE_CHARS {
                    format!("{}...", head)
                } else {
                    head.to_string()
                };
            }
        }

        if let Some(host) = link.host().filter(|h| !h.is_empty()) {
            return host;
        }

        [link.url.trim(), anchor]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(UNTITLED_LINK)
            .to_string()
    }

    /// Author handle, first word of the author markup, or [`UNKNOWN_AUTHOR`]
    pub fn author(&self, post: &PostElement<'_>) -> String {
        let Some(element) = self.author.iter().find_map(|sel| post.find(sel)) else {
            return UNKNOWN_AUTHOR.to_string();
        };

        let text = text_content(element);
        if let Some(handle) = handle_pattern().find(&text) {
            return handle.as_str().to_string();
        }

        text.split_whitespace()
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }
}

impl Default for MetadataDeriver {
    fn default() -> Self {
        Self::new(&PlatformProfile::x())
    }
}

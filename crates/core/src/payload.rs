//! Projection of a snapshot into the payload handed to generation.

use serde::{Deserialize, Serialize};

use crate::snapshot::{CssFacts, Layout, PageMetadata, Snapshot, Typography};

/// Default cap on the sanitized DOM excerpt, in characters.
pub const DEFAULT_DOM_EXCERPT_CHARS: usize = 20_000;

/// Default cap on the raw HTML handed to generation, in characters.
pub const DEFAULT_RAW_HTML_CHARS: usize = 50_000;

/// Size limits applied while projecting a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PayloadLimits {
    pub dom_excerpt_chars: usize,
    pub raw_html_chars: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            dom_excerpt_chars: DEFAULT_DOM_EXCERPT_CHARS,
            raw_html_chars: DEFAULT_RAW_HTML_CHARS,
        }
    }
}

/// Everything the generation collaborator receives for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationPayload {
    pub url: String,
    pub dom_excerpt: String,
    pub raw_html: String,
    pub colors: Vec<String>,
    pub typography: Typography,
    pub layout: Layout,
    pub css: CssFacts,
    pub metadata: PageMetadata,
}

impl GenerationPayload {
    pub fn from_snapshot(snapshot: &Snapshot, limits: PayloadLimits) -> Self {
        let extraction = &snapshot.extraction;
        Self {
            url: snapshot.url.clone(),
            dom_excerpt: truncate_chars(&extraction.dom, limits.dom_excerpt_chars).to_string(),
            raw_html: truncate_chars(&extraction.raw_html, limits.raw_html_chars).to_string(),
            colors: extraction.colors.clone(),
            typography: extraction.typography.clone(),
            layout: extraction.layout.clone(),
            css: extraction.css.clone(),
            metadata: extraction.metadata.clone(),
        }
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

//! Snapshot extraction for webclone.
//!
//! [`ScrapeEngine`] validates a URL, opens one render session per attempt,
//! loads the page and runs the [`ExtractionPipeline`] over it, retrying
//! failed attempts with exponential backoff.

pub mod engine;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod sanitize;

pub use engine::{ScrapeEngine, Scraper, MAX_RETRIES_EXCEEDED};
pub use error::{panic_message, ExtractionError, ScrapeError};
pub use pipeline::ExtractionPipeline;

use webclone_browser::BrowserError;

/// A single extraction stage failed. Never leaves the pipeline: the stage's
/// field falls back to its default.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The in-page script returned a value of the wrong shape.
    #[error("Unexpected script result: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Extractor panicked: {0}")]
    Panicked(String),
}

/// One scrape attempt failed and may be retried.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// No render session could be opened.
    #[error("Failed to acquire browser session: {0}")]
    Session(BrowserError),

    /// The page did not load within the navigation timeout or errored.
    #[error("Failed to load page: {0}")]
    Navigation(BrowserError),

    #[error("Scrape attempt panicked: {0}")]
    Panicked(String),
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

use std::time::Duration;

/// Errors raised by the browser automation layer.
///
/// Every variant is recoverable from the scrape engine's point of view: it
/// fails the current attempt, which is then retried.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    /// The browser settings are incomplete or malformed.
    #[error("Browser configuration error: {0}")]
    Config(String),

    /// Launching a local browser process failed.
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Connecting to a remote browser endpoint failed.
    #[error("Failed to connect to browser: {0}")]
    Connection(String),

    /// The hosted-session API rejected the request.
    #[error("Remote session API error (status {status}): {message}")]
    RemoteSession { status: u16, message: String },

    /// Navigation or load failed.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Navigation did not finish within the allowed time.
    #[error("Navigation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// In-page script evaluation failed.
    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    /// Screenshot capture failed.
    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    /// Any other DevTools protocol failure.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Protocol(err.to_string())
    }
}

impl From<reqwest::Error> for BrowserError {
    fn from(err: reqwest::Error) -> Self {
        BrowserError::Connection(err.to_string())
    }
}

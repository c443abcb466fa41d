//! The browser automation contract.
//!
//! The scrape engine only sees these traits. [`SessionFactory::open`]
//! acquires a [`RenderSession`] (one browser plus one isolated context),
//! [`RenderSession::navigate`] loads the target, and extractors work
//! against the loaded page through [`PageHandle`]. Sessions must be
//! released with [`RenderSession::close`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BrowserError;
use crate::viewport::Viewport;

/// Coarse resource type of a request observed during page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Font,
    Script,
    Other,
}

/// One request from the session's network log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub url: String,
    pub kind: ResourceKind,
}

impl NetworkRequest {
    pub fn new(url: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}

/// Capabilities extractors need from a loaded page.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Evaluate a script expression in the page and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// Serialized markup of the current document.
    async fn content(&self) -> Result<String, BrowserError>;

    /// Resize the page's viewport.
    async fn set_viewport(&self, viewport: &Viewport) -> Result<(), BrowserError>;

    /// Capture the full scrollable page as PNG bytes.
    async fn screenshot(&self) -> Result<Vec<u8>, BrowserError>;

    /// Requests observed since the session was opened.
    fn network_requests(&self) -> Vec<NetworkRequest>;
}

/// One browser instance plus one isolated browsing context.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Load `url`, wait for network quiescence and let deferred scripts
    /// settle. Fails with [`BrowserError::Timeout`] when the bounded
    /// navigation timeout expires.
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// The page loaded by [`navigate`](Self::navigate).
    fn page(&self) -> &dyn PageHandle;

    /// Tear down the context and browser.
    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}

/// Acquires fresh render sessions, one per scrape attempt.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn RenderSession>, BrowserError>;
}

//! Scrape engine: URL validation, attempts with backoff, session lifecycle.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use webclone_browser::SessionFactory;
use webclone_core::retry::{with_retry, RetryPolicy, Sleeper, TokioSleeper};
use webclone_core::snapshot::Extraction;
use webclone_core::validation::validate_url;
use webclone_core::Snapshot;

use crate::error::{panic_message, ScrapeError};
use crate::pipeline::ExtractionPipeline;

/// Failure message once every attempt has failed.
pub const MAX_RETRIES_EXCEEDED: &str = "Max retries exceeded";

/// Produces a snapshot for a URL. Never fails: problems are reported in the
/// returned snapshot.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self, url: &str, max_attempts: u32) -> Snapshot;
}

pub struct ScrapeEngine {
    sessions: Arc<dyn SessionFactory>,
    pipeline: ExtractionPipeline,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ScrapeEngine {
    pub fn new(sessions: Arc<dyn SessionFactory>, pipeline: ExtractionPipeline) -> Self {
        Self {
            sessions,
            pipeline,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Backoff parameters. `max_attempts` is overridden per call.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// One attempt: open a session, load the page, extract, release.
    ///
    /// The session is closed on every path out of the attempt, including a
    /// panic while loading or extracting.
    async fn attempt(&self, url: &str) -> Result<Extraction, ScrapeError> {
        let mut session = self.sessions.open().await.map_err(ScrapeError::Session)?;

        let outcome = AssertUnwindSafe(async {
            session.navigate(url).await.map_err(ScrapeError::Navigation)?;
            Ok(self.pipeline.run(session.page()).await)
        })
        .catch_unwind()
        .await;

        if let Err(e) = session.close().await {
            tracing::warn!(url, error = %e, "Failed to release browser session");
        }

        outcome.unwrap_or_else(|payload| Err(ScrapeError::Panicked(panic_message(payload.as_ref()))))
    }
}

#[async_trait]
impl Scraper for ScrapeEngine {
    async fn scrape(&self, url: &str, max_attempts: u32) -> Snapshot {
        let target = match validate_url(url) {
            Ok(parsed) => parsed.to_string(),
            Err(e) => {
                tracing::warn!(url, error = %e, "Rejected scrape request");
                return Snapshot::failed(url, e.to_string());
            }
        };

        let policy = self.policy.clone().with_max_attempts(max_attempts);
        let target = target.as_str();
        let result = with_retry(&policy, self.sleeper.as_ref(), move |attempt| {
            tracing::debug!(url = target, attempt = attempt + 1, "Starting scrape attempt");
            self.attempt(target)
        })
        .await;

        match result {
            Ok(extraction) => {
                tracing::info!(url = target, "Scrape succeeded");
                Snapshot::succeeded(url, extraction)
            }
            Err(exhausted) => {
                tracing::error!(
                    url = target,
                    attempts = exhausted.attempts,
                    last_error = %exhausted
                        .last_error
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    "Scrape failed after all attempts",
                );
                Snapshot::failed(url, MAX_RETRIES_EXCEEDED)
            }
        }
    }
}

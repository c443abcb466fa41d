//! Job orchestrator: drives each job through its stages on a background
//! task.
//!
//! `pending -> scraping -> processing -> generating -> completed`, with any
//! error or panic along the way ending the job in `failed`. Every applied
//! transition emits exactly one progress event.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio_util::task::TaskTracker;
use webclone_core::payload::{GenerationPayload, PayloadLimits};
use webclone_core::{CloneResult, CoreError, Job, JobId, JobStatus, Transition};
use webclone_events::ProgressSink;
use webclone_pipeline::{panic_message, Scraper};

use crate::generator::{GenerationError, Generator};
use crate::store::JobStore;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The scrape produced a failed snapshot; carries its message verbatim.
    #[error("{0}")]
    Scrape(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The job was deleted while it was running.
    #[error("Job {0} no longer exists")]
    JobGone(JobId),

    #[error(transparent)]
    Store(CoreError),
}

impl From<CoreError> for OrchestratorError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(id) => OrchestratorError::JobGone(id),
            other => OrchestratorError::Store(other),
        }
    }
}

/// Per-job execution parameters.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub max_scrape_attempts: u32,
    pub payload_limits: PayloadLimits,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_scrape_attempts: 3,
            payload_limits: PayloadLimits::default(),
        }
    }
}

/// Owns job lifecycles. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<dyn JobStore>,
    scraper: Arc<dyn Scraper>,
    generator: Arc<dyn Generator>,
    sink: Arc<dyn ProgressSink>,
    tracker: TaskTracker,
    config: OrchestratorConfig,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        scraper: Arc<dyn Scraper>,
        generator: Arc<dyn Generator>,
        sink: Arc<dyn ProgressSink>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            scraper,
            generator,
            sink,
            tracker: TaskTracker::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Register a `pending` job for `url` and start it in the background.
    ///
    /// Returns immediately with the job as created. URL problems surface
    /// later as a `failed` job.
    pub fn create_job(&self, url: impl Into<String>) -> Job {
        let job = Job::new(url);
        self.store.put(job.clone());
        tracing::info!(job_id = %job.id, url = %job.url, "Clone job created");

        let this = self.clone();
        let job_id = job.id;
        self.tracker.spawn(async move { this.run_job(job_id).await });
        job
    }

    /// Drive one job to a terminal state.
    ///
    /// Never panics and never returns an error: every failure is recorded
    /// on the job.
    pub async fn run_job(&self, job_id: JobId) {
        let failure = match AssertUnwindSafe(self.drive(job_id)).catch_unwind().await {
            Ok(Ok(())) => return,
            Ok(Err(OrchestratorError::JobGone(_))) => {
                tracing::info!(job_id = %job_id, "Job deleted while running, stopping");
                return;
            }
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("Unexpected error: {}", panic_message(payload.as_ref())),
        };

        tracing::error!(job_id = %job_id, error = %failure, "Clone job failed");
        if let Err(e) = self.transition(job_id, Transition::Fail(failure)) {
            tracing::warn!(job_id = %job_id, error = %e, "Could not record job failure");
        }
    }

    async fn drive(&self, job_id: JobId) -> Result<(), OrchestratorError> {
        let job = self.transition(job_id, Transition::Advance(JobStatus::Scraping))?;
        let snapshot = self
            .scraper
            .scrape(&job.url, self.config.max_scrape_attempts)
            .await;
        if !snapshot.success {
            return Err(OrchestratorError::Scrape(
                snapshot.error_message.unwrap_or_default(),
            ));
        }

        self.transition(job_id, Transition::Advance(JobStatus::Processing))?;
        let payload = GenerationPayload::from_snapshot(&snapshot, self.config.payload_limits);

        self.transition(job_id, Transition::Advance(JobStatus::Generating))?;
        let html = self.generator.generate(&payload).await?;

        let result = CloneResult::new(job.url.clone(), html, &snapshot);
        self.transition(job_id, Transition::Complete(result))?;
        tracing::info!(job_id = %job_id, "Clone job completed");
        Ok(())
    }

    /// Apply `transition` in the registry and emit the resulting event.
    fn transition(&self, job_id: JobId, transition: Transition) -> Result<Job, OrchestratorError> {
        let job = self.store.update(job_id, transition)?;
        tracing::debug!(
            job_id = %job_id,
            status = %job.status,
            progress = job.progress,
            "Job transitioned",
        );
        self.sink.emit(job.progress_event());
        Ok(job)
    }

    /// Stop accepting work and wait up to `timeout` for running jobs.
    ///
    /// Returns `true` if every job finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight clone jobs");
        }
        tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok()
    }
}

//! Clone job record and its lifecycle state machine.
//!
//! A [`Job`] only changes through [`Job::apply`], which enforces the stage
//! order `pending -> scraping -> processing -> generating -> completed` and
//! lets any non-terminal stage drop to `failed`. The status/progress pair
//! and the `error_message`/`result` invariants are maintained here so no
//! caller can produce a half-updated record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job_events::ProgressEvent;
use crate::snapshot::{AssetCategory, Snapshot};
use crate::types::{JobId, Timestamp};

/// Error text recorded when a failure carries no message of its own.
const UNKNOWN_FAILURE: &str = "Unknown error";

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Lifecycle stage of a clone job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Scraping,
    Processing,
    Generating,
    Completed,
    Failed,
}

impl JobStatus {
    /// Progress percentage reported while a job sits in this stage.
    pub fn progress(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Scraping => 10,
            JobStatus::Processing => 50,
            JobStatus::Generating => 70,
            JobStatus::Completed => 100,
            JobStatus::Failed => 0,
        }
    }

    /// `completed` and `failed` accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// The stage that follows this one on the success path.
    pub fn successor(self) -> Option<JobStatus> {
        match self {
            JobStatus::Pending => Some(JobStatus::Scraping),
            JobStatus::Scraping => Some(JobStatus::Processing),
            JobStatus::Processing => Some(JobStatus::Generating),
            JobStatus::Generating => Some(JobStatus::Completed),
            JobStatus::Completed | JobStatus::Failed => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Scraping => "scraping",
            JobStatus::Processing => "processing",
            JobStatus::Generating => "generating",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CloneResult
// ---------------------------------------------------------------------------

/// Output of a completed job: the generated markup plus summary counts
/// derived from the snapshot it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneResult {
    pub url: String,
    pub html: String,
    pub colors_found: usize,
    pub images_found: usize,
    pub fonts_found: usize,
    /// Names of the viewports that were captured.
    pub screenshots: Vec<String>,
}

impl CloneResult {
    pub fn new(url: impl Into<String>, html: String, snapshot: &Snapshot) -> Self {
        let extraction = &snapshot.extraction;
        Self {
            url: url.into(),
            html,
            colors_found: extraction.colors.len(),
            images_found: extraction
                .assets
                .get(&AssetCategory::Images)
                .map_or(0, Vec::len),
            fonts_found: extraction.typography.fonts.len(),
            screenshots: extraction.screenshots.keys().cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// A requested state change for a [`Job`].
#[derive(Debug, Clone)]
pub enum Transition {
    /// Move to the next in-progress stage (`scraping`, `processing`, `generating`).
    Advance(JobStatus),
    /// Finish successfully with the generated result.
    Complete(CloneResult),
    /// Finish with an error message.
    Fail(String),
}

impl Transition {
    /// The status the job ends up in once this transition is applied.
    pub fn target(&self) -> JobStatus {
        match self {
            Transition::Advance(status) => *status,
            Transition::Complete(_) => JobStatus::Completed,
            Transition::Fail(_) => JobStatus::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One clone request and everything known about its progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub result: Option<CloneResult>,
}

impl Job {
    /// Create a fresh `pending` job for `url` with a random id.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            url: url.into(),
            status: JobStatus::Pending,
            progress: JobStatus::Pending.progress(),
            created_at: chrono::Utc::now(),
            completed_at: None,
            error_message: None,
            result: None,
        }
    }

    /// Apply a transition, rejecting anything the state machine forbids.
    ///
    /// On error the job is left untouched.
    pub fn apply(&mut self, transition: Transition) -> Result<(), CoreError> {
        let to = transition.target();
        let legal = match &transition {
            Transition::Advance(target) => {
                !target.is_terminal() && self.status.successor() == Some(*target)
            }
            Transition::Complete(_) => self.status == JobStatus::Generating,
            Transition::Fail(_) => !self.status.is_terminal(),
        };
        if !legal {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        self.progress = to.progress();
        match transition {
            Transition::Advance(_) => {}
            Transition::Complete(result) => {
                self.result = Some(result);
                self.completed_at = Some(chrono::Utc::now());
            }
            Transition::Fail(message) => {
                let message = if message.trim().is_empty() {
                    UNKNOWN_FAILURE.to_string()
                } else {
                    message
                };
                self.error_message = Some(message);
                self.completed_at = Some(chrono::Utc::now());
            }
        }
        Ok(())
    }

    /// The notification describing this job's current state.
    pub fn progress_event(&self) -> ProgressEvent {
        ProgressEvent {
            job_id: self.id,
            status: self.status,
            progress: self.progress,
            error_message: self.error_message.clone(),
        }
    }
}

//! Progress notifications pushed to live subscribers of a job.

use serde::{Deserialize, Serialize};

use crate::job::JobStatus;
use crate::types::JobId;

/// Ephemeral status update for one job.
///
/// Serialized as `{"job_id", "status", "progress", "error_message"?}`.
/// Never stored; a subscriber that connects late does not see earlier events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

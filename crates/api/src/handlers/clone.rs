//! Handlers for the `/api/clone` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use webclone_core::{CloneResult, CoreError, Job, JobId, JobStatus, Timestamp};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /api/clone`.
#[derive(Debug, Deserialize)]
pub struct CloneRequest {
    pub url: String,
}

/// Public view of a job, without its result payload.
#[derive(Debug, Serialize)]
pub struct JobStatusView {
    pub job_id: JobId,
    pub status: JobStatus,
    pub url: String,
    pub progress: u8,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            url: job.url.clone(),
            progress: job.progress,
            created_at: job.created_at,
            completed_at: job.completed_at,
            error_message: job.error_message.clone(),
        }
    }
}

/// Parse a path segment as a job id, rejecting malformed ids with 400.
pub fn parse_job_id(raw: &str) -> AppResult<JobId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid job id: {raw}")))
}

fn find_job(state: &AppState, job_id: JobId) -> AppResult<Job> {
    state
        .jobs()
        .get(job_id)
        .ok_or(AppError::Core(CoreError::NotFound(job_id)))
}

/// The result of a completed job, or 409 while it is still running or failed.
fn completed_result(job: Job) -> AppResult<CloneResult> {
    match job.result {
        Some(result) if job.status == JobStatus::Completed => Ok(result),
        _ => Err(AppError::Core(CoreError::Conflict(format!(
            "Job {} is not completed (status: {})",
            job.id, job.status
        )))),
    }
}

/// POST /api/clone
///
/// Validation of the URL itself happens in the job; only a blank URL is
/// rejected up front.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CloneRequest>,
) -> AppResult<(StatusCode, Json<JobStatusView>)> {
    let url = input.url.trim();
    if url.is_empty() {
        return Err(AppError::BadRequest("url must not be empty".into()));
    }
    let job = state.orchestrator.create_job(url);
    Ok((StatusCode::ACCEPTED, Json(JobStatusView::from(&job))))
}

/// GET /api/clone/{job_id}/status
pub async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobStatusView>> {
    let job = find_job(&state, parse_job_id(&job_id)?)?;
    Ok(Json(JobStatusView::from(&job)))
}

/// GET /api/clone/{job_id}/result
pub async fn result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<CloneResult>> {
    let job = find_job(&state, parse_job_id(&job_id)?)?;
    Ok(Json(completed_result(job)?))
}

/// GET /api/clone/{job_id}/preview
pub async fn preview(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Html<String>> {
    let job = find_job(&state, parse_job_id(&job_id)?)?;
    Ok(Html(completed_result(job)?.html))
}

/// Response body for `DELETE /api/clone/{job_id}`.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: JobId,
}

/// DELETE /api/clone/{job_id}
///
/// A running job notices the deletion at its next stage boundary and stops.
pub async fn delete(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<DeletedResponse>> {
    let job_id = parse_job_id(&job_id)?;
    state
        .jobs()
        .delete(job_id)
        .ok_or(AppError::Core(CoreError::NotFound(job_id)))?;
    state.hub.unsubscribe(job_id).await;
    tracing::info!(job_id = %job_id, "Clone job deleted");
    Ok(Json(DeletedResponse { deleted: job_id }))
}

pub mod health;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the clone job route tree.
///
/// ```text
/// POST   /api/clone                    create job (202)
/// GET    /api/clone/{job_id}/status    status view
/// GET    /api/clone/{job_id}/result    result JSON (completed only)
/// GET    /api/clone/{job_id}/preview   generated HTML (completed only)
/// DELETE /api/clone/{job_id}           delete job
///
/// GET    /ws/clone/{job_id}            WebSocket progress stream
/// ```
pub fn clone_routes() -> Router<AppState> {
    Router::new()
        .route("/api/clone", post(handlers::clone::create))
        .route("/api/clone/{job_id}", delete(handlers::clone::delete))
        .route("/api/clone/{job_id}/status", get(handlers::clone::status))
        .route("/api/clone/{job_id}/result", get(handlers::clone::result))
        .route("/api/clone/{job_id}/preview", get(handlers::clone::preview))
        .route("/ws/clone/{job_id}", get(ws::ws_handler))
}

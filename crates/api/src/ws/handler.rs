use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tokio::time::MissedTickBehavior;
use webclone_core::{CoreError, JobId};
use webclone_events::NotificationHub;

use crate::error::{AppError, AppResult};
use crate::handlers::clone::parse_job_id;
use crate::state::AppState;

/// Interval between heartbeat pings.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// GET /ws/clone/{job_id}
///
/// Upgrades to a WebSocket that receives the job's progress events as JSON
/// text frames. Unknown jobs are refused before the upgrade.
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let job_id = parse_job_id(&job_id)?;
    if state.jobs().get(job_id).is_none() {
        return Err(AppError::Core(CoreError::NotFound(job_id)));
    }
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, job_id, state.hub))
        .into_response())
}

/// Manage a single WebSocket connection after upgrade.
///
/// Subscribes to the hub, forwards events and heartbeat pings from a sender
/// task, and reads inbound frames until the client goes away.
async fn handle_socket(socket: WebSocket, job_id: JobId, hub: Arc<NotificationHub>) {
    let (conn_id, mut rx) = hub.subscribe(job_id).await;
    tracing::info!(job_id = %job_id, conn_id, "WebSocket connected");

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        heartbeat.tick().await;

        loop {
            tokio::select! {
                event = rx.recv() => {
                    // Replaced or shut down: close the socket.
                    let Some(event) = event else {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(job_id = %job_id, error = %e, "Failed to encode progress event");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        tracing::debug!(job_id = %job_id, conn_id, "WebSocket sink closed");
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                        tracing::debug!(job_id = %job_id, conn_id, "WebSocket sink closed");
                        break;
                    }
                }
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(job_id = %job_id, conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(job_id = %job_id, conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    hub.unsubscribe_connection(job_id, conn_id).await;
    send_task.abort();
    tracing::info!(job_id = %job_id, conn_id, "WebSocket disconnected");
}

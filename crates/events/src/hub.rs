//! Routes progress events to the live connection watching each job.
//!
//! Each job id maps to at most one connection. Delivery is at-most-once and
//! never buffered for absent subscribers: a client that subscribes after an
//! event was published does not receive it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{broadcast, mpsc, RwLock};
use webclone_core::{JobId, ProgressEvent, Timestamp};

/// Identifies one subscription so a stale connection cannot evict its
/// replacement.
pub type ConnectionId = u64;

/// Channel sender half for pushing events to one connection.
pub type EventSender = mpsc::UnboundedSender<ProgressEvent>;

struct Subscription {
    conn_id: ConnectionId,
    sender: EventSender,
    connected_at: Timestamp,
}

/// Job id -> subscriber map.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct NotificationHub {
    subscriptions: RwLock<HashMap<JobId, Subscription>>,
    next_conn_id: AtomicU64,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Register a connection for `job_id`, replacing any existing one.
    ///
    /// Returns the connection id and the receiver the caller forwards to its
    /// socket. A replaced connection's receiver yields `None` from then on.
    pub async fn subscribe(
        &self,
        job_id: JobId,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        let subscription = Subscription {
            conn_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };

        let replaced = self
            .subscriptions
            .write()
            .await
            .insert(job_id, subscription);
        if let Some(old) = replaced {
            tracing::debug!(
                job_id = %job_id,
                replaced_conn_id = old.conn_id,
                subscribed_since = %old.connected_at,
                "Subscriber replaced",
            );
        }
        (conn_id, rx)
    }

    /// Remove whatever connection is subscribed to `job_id`. Idempotent.
    pub async fn unsubscribe(&self, job_id: JobId) {
        self.subscriptions.write().await.remove(&job_id);
    }

    /// Remove the subscription for `job_id` only if it still belongs to
    /// `conn_id`. Returns whether anything was removed.
    pub async fn unsubscribe_connection(&self, job_id: JobId, conn_id: ConnectionId) -> bool {
        let mut subs = self.subscriptions.write().await;
        match subs.get(&job_id) {
            Some(sub) if sub.conn_id == conn_id => {
                subs.remove(&job_id);
                true
            }
            _ => false,
        }
    }

    /// Deliver `event` to the connection subscribed to its job, if any.
    ///
    /// Returns `true` when the event was handed to a live connection. A
    /// subscription whose receiver is gone is pruned.
    pub async fn publish(&self, event: ProgressEvent) -> bool {
        let job_id = event.job_id;
        let dead_conn = {
            let subs = self.subscriptions.read().await;
            let Some(sub) = subs.get(&job_id) else {
                return false;
            };
            match sub.sender.send(event) {
                Ok(()) => return true,
                Err(_) => sub.conn_id,
            }
        };

        if self.unsubscribe_connection(job_id, dead_conn).await {
            tracing::debug!(job_id = %job_id, conn_id = dead_conn, "Pruned closed subscriber");
        }
        false
    }

    /// Drain the progress bus, publishing every event.
    ///
    /// Exits when the bus is dropped.
    pub async fn run(&self, mut receiver: broadcast::Receiver<ProgressEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.publish(event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification hub lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Progress bus closed, notification hub shutting down");
                    break;
                }
            }
        }
    }

    /// Number of jobs with a live subscriber.
    pub async fn connection_count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Drop every subscription, closing each connection's channel.
    ///
    /// Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut subs = self.subscriptions.write().await;
        let count = subs.len();
        subs.clear();
        tracing::info!(count, "Closed all progress subscriptions");
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::Arc;

use webclone_events::NotificationHub;
use webclone_worker::{JobOrchestrator, JobStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind `Arc` or clones shallowly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Creates and runs clone jobs; owns the job registry.
    pub orchestrator: JobOrchestrator,
    /// Live progress channels, one per watched job.
    pub hub: Arc<NotificationHub>,
}

impl AppState {
    pub fn jobs(&self) -> &Arc<dyn JobStore> {
        self.orchestrator.store()
    }
}

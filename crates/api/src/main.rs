use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webclone_api::config::ServerConfig;
use webclone_api::router::build_app_router;
use webclone_api::state::AppState;
use webclone_browser::{BrowserSettings, ChromiumSessionFactory};
use webclone_events::{EventBus, NotificationHub};
use webclone_pipeline::{ExtractionPipeline, ScrapeEngine};
use webclone_worker::{
    InMemoryJobStore, JobOrchestrator, JobStore, OrchestratorConfig, TemplateGenerator,
    WorkerConfig,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "webclone_api=debug,webclone_worker=debug,webclone_pipeline=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let worker_config = WorkerConfig::from_env();
    let browser_settings = BrowserSettings::from_env().expect("Invalid browser configuration");
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Browser sessions ---
    let sessions =
        ChromiumSessionFactory::new(browser_settings).expect("Failed to prepare browser sessions");
    let engine = ScrapeEngine::new(Arc::new(sessions), ExtractionPipeline::new())
        .with_policy(worker_config.retry_policy());

    // --- Event bus + notification hub ---
    let event_bus = Arc::new(EventBus::default());
    let hub = Arc::new(NotificationHub::new());
    let hub_handle = {
        let hub = Arc::clone(&hub);
        let receiver = event_bus.subscribe();
        tokio::spawn(async move { hub.run(receiver).await })
    };
    tracing::info!("Notification hub started");

    // --- Orchestrator ---
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let orchestrator = JobOrchestrator::new(
        store,
        Arc::new(engine),
        Arc::new(TemplateGenerator),
        event_bus.clone(),
        OrchestratorConfig {
            max_scrape_attempts: worker_config.max_scrape_attempts,
            ..OrchestratorConfig::default()
        },
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator: orchestrator.clone(),
        hub: Arc::clone(&hub),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let drained = orchestrator
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if drained {
        tracing::info!("All clone jobs finished");
    } else {
        tracing::warn!("Shutdown timeout reached with clone jobs still running");
    }

    // Dropping the last bus handle closes the channel and ends the hub loop.
    drop(orchestrator);
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), hub_handle).await;

    hub.shutdown_all().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

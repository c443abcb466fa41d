//! One-shot clone: `webclone-worker <url>`.
//!
//! Runs a single job in the foreground, logs its progress and prints the
//! finished job record as JSON.

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use webclone_browser::{BrowserSettings, ChromiumSessionFactory};
use webclone_core::{Job, JobStatus};
use webclone_events::EventBus;
use webclone_pipeline::{ExtractionPipeline, ScrapeEngine};
use webclone_worker::{
    InMemoryJobStore, JobOrchestrator, JobStore, OrchestratorConfig, TemplateGenerator,
    WorkerConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webclone_worker=debug,webclone_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Some(url) = std::env::args().nth(1) else {
        bail!("usage: webclone-worker <url>");
    };

    let worker_config = WorkerConfig::from_env();
    let browser_settings = BrowserSettings::from_env().context("invalid browser settings")?;
    let sessions = ChromiumSessionFactory::new(browser_settings)
        .context("failed to prepare browser sessions")?;

    let engine = ScrapeEngine::new(Arc::new(sessions), ExtractionPipeline::new())
        .with_policy(worker_config.retry_policy());

    let bus = Arc::new(EventBus::default());
    let progress_log = tokio::spawn(log_progress(bus.subscribe()));

    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let orchestrator = JobOrchestrator::new(
        Arc::clone(&store),
        Arc::new(engine),
        Arc::new(TemplateGenerator),
        bus.clone(),
        OrchestratorConfig {
            max_scrape_attempts: worker_config.max_scrape_attempts,
            ..OrchestratorConfig::default()
        },
    );

    let job = Job::new(url);
    let job_id = job.id;
    store.put(job);
    orchestrator.run_job(job_id).await;

    drop(orchestrator);
    drop(bus);
    let _ = progress_log.await;

    let job = store
        .get(job_id)
        .context("job disappeared from the registry")?;
    println!("{}", serde_json::to_string_pretty(&job)?);

    if job.status != JobStatus::Completed {
        bail!(
            "clone failed: {}",
            job.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

async fn log_progress(mut receiver: broadcast::Receiver<webclone_core::ProgressEvent>) {
    while let Ok(event) = receiver.recv().await {
        tracing::info!(
            job_id = %event.job_id,
            status = %event.status,
            progress = event.progress,
            "Progress",
        );
    }
}

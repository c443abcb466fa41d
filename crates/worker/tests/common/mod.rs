#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use webclone_core::payload::GenerationPayload;
use webclone_core::snapshot::{AssetCategory, Extraction, Typography};
use webclone_core::{ProgressEvent, Snapshot};
use webclone_events::ProgressSink;
use webclone_pipeline::Scraper;
use webclone_worker::{
    GenerationError, Generator, InMemoryJobStore, JobOrchestrator, JobStore, OrchestratorConfig,
    TemplateGenerator,
};

// ---------------------------------------------------------------------------
// Scrapers
// ---------------------------------------------------------------------------

pub enum ScrapeOutcome {
    Succeed(Extraction),
    Fail(String),
    Panic,
}

/// Returns a canned outcome, optionally waiting for a release signal first.
pub struct StubScraper {
    outcome: ScrapeOutcome,
    gate: Option<Arc<Notify>>,
    pub calls: AtomicU32,
    pub last_attempts: AtomicU32,
}

impl StubScraper {
    pub fn new(outcome: ScrapeOutcome) -> Self {
        Self {
            outcome,
            gate: None,
            calls: AtomicU32::new(0),
            last_attempts: AtomicU32::new(0),
        }
    }

    /// Block every scrape until `gate` is notified.
    pub fn gated(outcome: ScrapeOutcome, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(outcome)
        }
    }
}

#[async_trait]
impl Scraper for StubScraper {
    async fn scrape(&self, url: &str, max_attempts: u32) -> Snapshot {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_attempts.store(max_attempts, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.outcome {
            ScrapeOutcome::Succeed(extraction) => Snapshot::succeeded(url, extraction.clone()),
            ScrapeOutcome::Fail(message) => Snapshot::failed(url, message.clone()),
            ScrapeOutcome::Panic => panic!("scraper blew up"),
        }
    }
}

/// A populated extraction with known counts: 3 colors, 2 images, 2 fonts,
/// 3 screenshots.
pub fn rich_extraction() -> Extraction {
    let mut assets = BTreeMap::new();
    assets.insert(
        AssetCategory::Images,
        vec!["https://example.com/a.png".into(), "https://example.com/b.png".into()],
    );
    let screenshots = ["desktop", "tablet", "mobile"]
        .into_iter()
        .map(|name| (name.to_string(), "iVBORw0KGgo=".to_string()))
        .collect();

    Extraction {
        screenshots,
        dom: "<body><h1>Example</h1><p>Hello</p></body>".into(),
        raw_html: "<html><body><h1>Example</h1><p>Hello</p></body></html>".into(),
        colors: vec![
            "rgb(255, 255, 255)".into(),
            "rgb(0, 0, 0)".into(),
            "rgb(0, 102, 204)".into(),
        ],
        typography: Typography {
            fonts: vec!["Georgia, serif".into(), "Inter, sans-serif".into()],
            ..Default::default()
        },
        assets,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn generate(&self, _payload: &GenerationPayload) -> Result<String, GenerationError> {
        Err(GenerationError::Failed("model unavailable".into()))
    }
}

/// Records the payload it was given, then delegates to the template.
#[derive(Default)]
pub struct CapturingGenerator {
    pub payloads: Mutex<Vec<GenerationPayload>>,
}

#[async_trait]
impl Generator for CapturingGenerator {
    async fn generate(&self, payload: &GenerationPayload) -> Result<String, GenerationError> {
        self.payloads.lock().unwrap().push(payload.clone());
        TemplateGenerator.generate(payload).await
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub orchestrator: JobOrchestrator,
    pub store: Arc<dyn JobStore>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness(scraper: Arc<dyn Scraper>, generator: Arc<dyn Generator>) -> Harness {
    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = JobOrchestrator::new(
        Arc::clone(&store),
        scraper,
        generator,
        sink.clone(),
        OrchestratorConfig::default(),
    );
    Harness {
        orchestrator,
        store,
        sink,
    }
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tower::ServiceExt;

use webclone_api::config::ServerConfig;
use webclone_api::router::build_app_router;
use webclone_api::state::AppState;
use webclone_browser::{BrowserError, RenderSession, SessionFactory};
use webclone_core::snapshot::{AssetCategory, Extraction};
use webclone_core::Snapshot;
use webclone_events::{EventBus, NotificationHub};
use webclone_pipeline::{ExtractionPipeline, ScrapeEngine, Scraper};
use webclone_worker::{
    InMemoryJobStore, JobOrchestrator, JobStore, OrchestratorConfig, TemplateGenerator,
};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Succeeds with a small fixed extraction, or fails with a fixed message.
pub struct StubScraper {
    failure: Option<String>,
}

impl StubScraper {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self { failure: None })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.to_string()),
        })
    }
}

#[async_trait]
impl Scraper for StubScraper {
    async fn scrape(&self, url: &str, _max_attempts: u32) -> Snapshot {
        match &self.failure {
            Some(message) => Snapshot::failed(url, message.clone()),
            None => Snapshot::succeeded(url, sample_extraction()),
        }
    }
}

/// Succeeds like [`StubScraper::succeeding`], but only once `gate` is
/// notified.
pub struct GatedScraper {
    pub gate: Arc<Notify>,
}

#[async_trait]
impl Scraper for GatedScraper {
    async fn scrape(&self, url: &str, _max_attempts: u32) -> Snapshot {
        self.gate.notified().await;
        Snapshot::succeeded(url, sample_extraction())
    }
}

pub fn sample_extraction() -> Extraction {
    let mut extraction = Extraction {
        dom: "<body><h1>Hello clone</h1></body>".into(),
        raw_html: "<html><body><h1>Hello clone</h1></body></html>".into(),
        colors: vec!["rgb(255, 255, 255)".into(), "rgb(17, 17, 17)".into()],
        ..Default::default()
    };
    extraction.assets.insert(
        AssetCategory::Images,
        vec!["https://example.com/logo.png".into()],
    );
    extraction
        .screenshots
        .insert("desktop".into(), "iVBORw0KGgo=".into());
    extraction
}

/// A browser that can never be reached.
pub struct OfflineSessions;

#[async_trait]
impl SessionFactory for OfflineSessions {
    async fn open(&self) -> Result<Box<dyn RenderSession>, BrowserError> {
        Err(BrowserError::Launch("browser unavailable in tests".into()))
    }
}

/// The real scrape engine, wired to a browser that never starts.
pub fn offline_engine() -> Arc<ScrapeEngine> {
    Arc::new(ScrapeEngine::new(
        Arc::new(OfflineSessions),
        ExtractionPipeline::new(),
    ))
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Keeps the bus alive and drives the hub for the lifetime of the test.
    pub bus: Arc<EventBus>,
}

impl TestApp {
    /// Wait for every spawned clone job to finish.
    pub async fn settle(&self) {
        assert!(
            self.state
                .orchestrator
                .shutdown(Duration::from_secs(5))
                .await,
            "clone jobs did not finish in time"
        );
    }
}

/// Build the application the way `main.rs` does, with `scraper` in place
/// of the browser-backed engine.
pub fn build_test_app(scraper: Arc<dyn Scraper>) -> TestApp {
    let config = test_config();
    let bus = Arc::new(EventBus::default());
    let hub = Arc::new(NotificationHub::new());
    {
        let hub = Arc::clone(&hub);
        let receiver = bus.subscribe();
        tokio::spawn(async move { hub.run(receiver).await });
    }

    let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let orchestrator = JobOrchestrator::new(
        store,
        scraper,
        Arc::new(TemplateGenerator),
        bus.clone(),
        OrchestratorConfig::default(),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator,
        hub,
    };
    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        bus,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Create a job through the API and return its id.
pub async fn create_job(app: &TestApp, url: &str) -> String {
    let response = post_json(app, "/api/clone", serde_json::json!({ "url": url })).await;
    assert_eq!(response.status(), axum::http::StatusCode::ACCEPTED);
    body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use webclone_browser::{
    BrowserError, NetworkRequest, PageHandle, RenderSession, ResourceKind, SessionFactory, Viewport,
};
use webclone_core::retry::Sleeper;

// ---------------------------------------------------------------------------
// Fake page
// ---------------------------------------------------------------------------

/// How the fake page reacts to one extractor's script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    Error,
    Panic,
}

/// When `FakePage::screenshot` fails.
#[derive(Clone, Copy, Default)]
enum ScreenshotFault {
    #[default]
    Never,
    Always,
    /// Only while the page is sized to the named viewport.
    At(&'static str),
}

/// A page that answers each extractor's script with canned data, keyed by a
/// substring unique to that script.
#[derive(Clone, Default)]
pub struct FakePage {
    faults: Vec<(&'static str, Fault)>,
    screenshot_fault: ScreenshotFault,
    viewports: Arc<Mutex<Vec<String>>>,
}

/// Marker substrings identifying each extractor's in-page script.
pub const CSS_SCRIPT: &str = "'.wrapper'";
pub const COLORS_SCRIPT: &str = "borderColor";
pub const TYPOGRAPHY_SCRIPT: &str = "line_height";
pub const LAYOUT_SCRIPT: &str = "grid_template_columns";
pub const ASSETS_SCRIPT: &str = "stylesheet";
pub const METADATA_SCRIPT: &str = "og:";

pub const SAMPLE_HTML: &str = r#"<html><head><title>Example</title><script>track()</script></head><body><header class="top">Hi</header><div class="gtm-slot">x</div><p>Body</p></body></html>"#;

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault(mut self, script_marker: &'static str, fault: Fault) -> Self {
        self.faults.push((script_marker, fault));
        self
    }

    pub fn with_failing_screenshots(mut self) -> Self {
        self.screenshot_fault = ScreenshotFault::Always;
        self
    }

    pub fn with_failing_screenshot_at(mut self, viewport: &'static str) -> Self {
        self.screenshot_fault = ScreenshotFault::At(viewport);
        self
    }

    /// Viewport names applied, in order.
    pub fn viewport_history(&self) -> Vec<String> {
        self.viewports.lock().unwrap().clone()
    }

    fn canned(script: &str) -> Value {
        if script.contains(CSS_SCRIPT) {
            json!({
                "body": {"color": "rgb(17, 17, 17)", "background-color": "rgb(255, 255, 255)"},
                "header": {"display": "flex"},
                "selectors": {"h1": {"font-size": "40px"}}
            })
        } else if script.contains(COLORS_SCRIPT) {
            json!([
                "rgb(255, 255, 255)", "rgb(17, 17, 17)", "rgba(0, 0, 0, 0)",
                "rgb(255, 255, 255)", "rgb(0, 102, 204)", null
            ])
        } else if script.contains(TYPOGRAPHY_SCRIPT) {
            json!({
                "fonts": ["Inter, sans-serif", "Georgia, serif"],
                "headings": {"h1": {"font_family": "Georgia, serif", "font_size": "40px", "font_weight": "700", "line_height": "48px"}},
                "body": {"font_family": "Inter, sans-serif", "font_size": "16px", "font_weight": "400", "line_height": "24px"}
            })
        } else if script.contains(LAYOUT_SCRIPT) {
            json!({
                "structure": {"header": {"present": true, "count": 1, "classes": ["top"]}},
                "flow": {"header.top": {"display": "flex", "flex_direction": "row", "justify_content": "normal", "align_items": "normal", "grid_template_columns": "none", "gap": "normal"}}
            })
        } else if script.contains(ASSETS_SCRIPT) {
            json!({
                "images": ["https://example.com/logo.png"],
                "stylesheets": ["https://example.com/site.css"],
                "fonts": [],
                "icons": ["https://example.com/favicon.ico"],
                "scripts": []
            })
        } else if script.contains(METADATA_SCRIPT) {
            json!({
                "title": "Example",
                "description": "An example page",
                "keywords": null,
                "viewport": "width=device-width",
                "charset": "UTF-8",
                "open_graph": {"og:title": "Example"}
            })
        } else {
            Value::Null
        }
    }
}

#[async_trait]
impl PageHandle for FakePage {
    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        for (marker, fault) in &self.faults {
            if script.contains(marker) {
                match fault {
                    Fault::Error => {
                        return Err(BrowserError::Evaluation("injected failure".into()))
                    }
                    Fault::Panic => panic!("injected panic in extractor"),
                }
            }
        }
        Ok(Self::canned(script))
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(SAMPLE_HTML.to_string())
    }

    async fn set_viewport(&self, viewport: &Viewport) -> Result<(), BrowserError> {
        self.viewports.lock().unwrap().push(viewport.name.clone());
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, BrowserError> {
        let current = self.viewports.lock().unwrap().last().cloned();
        let fails = match self.screenshot_fault {
            ScreenshotFault::Never => false,
            ScreenshotFault::Always => true,
            ScreenshotFault::At(name) => current.as_deref() == Some(name),
        };
        if fails {
            return Err(BrowserError::Screenshot("injected failure".into()));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    fn network_requests(&self) -> Vec<NetworkRequest> {
        vec![
            NetworkRequest::new("https://example.com/", ResourceKind::Document),
            NetworkRequest::new("https://example.com/app.js", ResourceKind::Script),
            NetworkRequest::new("https://example.com/logo.png", ResourceKind::Image),
        ]
    }
}

// ---------------------------------------------------------------------------
// Counting session factory
// ---------------------------------------------------------------------------

/// What `navigate` does in every session the factory opens.
#[derive(Clone, Copy, Debug)]
pub enum NavigateBehavior {
    Load,
    TimeOut,
    Panic,
}

#[derive(Default)]
pub struct SessionCounters {
    opened: AtomicU32,
    closed: AtomicU32,
}

/// Session factory recording every acquisition and release.
pub struct CountingSessionFactory {
    page: FakePage,
    navigate: NavigateBehavior,
    fail_open: bool,
    counters: Arc<SessionCounters>,
}

impl CountingSessionFactory {
    pub fn new(page: FakePage, navigate: NavigateBehavior) -> Arc<Self> {
        Arc::new(Self {
            page,
            navigate,
            fail_open: false,
            counters: Arc::default(),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            page: FakePage::new(),
            navigate: NavigateBehavior::Load,
            fail_open: true,
            counters: Arc::default(),
        })
    }

    pub fn opened(&self) -> u32 {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> u32 {
        self.counters.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for CountingSessionFactory {
    async fn open(&self) -> Result<Box<dyn RenderSession>, BrowserError> {
        if self.fail_open {
            return Err(BrowserError::Launch("no browser available".into()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            page: self.page.clone(),
            navigate: self.navigate,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct FakeSession {
    page: FakePage,
    navigate: NavigateBehavior,
    counters: Arc<SessionCounters>,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn navigate(&mut self, _url: &str) -> Result<(), BrowserError> {
        match self.navigate {
            NavigateBehavior::Load => Ok(()),
            NavigateBehavior::TimeOut => Err(BrowserError::Timeout(Duration::from_secs(30))),
            NavigateBehavior::Panic => panic!("injected panic during navigation"),
        }
    }

    fn page(&self) -> &dyn PageHandle {
        &self.page
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sleeper
// ---------------------------------------------------------------------------

/// Records requested delays without waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

//! The ordered extraction stages run against a loaded page.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use webclone_browser::{PageHandle, Viewport};
use webclone_core::snapshot::Extraction;

use crate::error::{panic_message, ExtractionError};
use crate::extractors::{assets, colors, css, dom, layout, metadata, screenshots, typography};

/// Runs every extractor in a fixed order. Each stage is isolated: an error
/// or panic leaves that field at its default and the rest still run.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    viewports: Vec<Viewport>,
    default_viewport: Viewport,
    screenshot_settle: Duration,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self {
            viewports: Viewport::standard_set(),
            default_viewport: Viewport::desktop(),
            screenshot_settle: Duration::from_secs(1),
        }
    }
}

impl ExtractionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause between resizing the page and capturing it.
    pub fn with_screenshot_settle(mut self, settle: Duration) -> Self {
        self.screenshot_settle = settle;
        self
    }

    pub fn with_viewports(mut self, viewports: Vec<Viewport>, default_viewport: Viewport) -> Self {
        self.viewports = viewports;
        self.default_viewport = default_viewport;
        self
    }

    pub async fn run(&self, page: &dyn PageHandle) -> Extraction {
        let screenshots = isolate(
            "screenshots",
            screenshots::capture(
                page,
                &self.viewports,
                self.screenshot_settle,
                &self.default_viewport,
            ),
        )
        .await;
        let (dom, raw_html) = isolate("dom", dom::capture(page)).await;
        let css = isolate("css", css::extract(page)).await;
        let colors = isolate("colors", colors::extract(page)).await;
        let typography = isolate("typography", typography::extract(page)).await;
        let layout = isolate("layout", layout::extract(page)).await;
        let assets = isolate("assets", assets::extract(page)).await;
        let metadata = isolate("metadata", metadata::extract(page)).await;

        tracing::debug!(
            screenshots = screenshots.len(),
            colors = colors.len(),
            fonts = typography.fonts.len(),
            "Extraction finished",
        );

        Extraction {
            screenshots,
            dom,
            raw_html,
            css,
            colors,
            typography,
            layout,
            assets,
            metadata,
        }
    }
}

/// Await one stage, turning an error or panic into the field's default.
async fn isolate<T, F>(stage: &'static str, fut: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, ExtractionError>>,
{
    let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(ExtractionError::Panicked(panic_message(payload.as_ref()))),
    };

    outcome.unwrap_or_else(|e| {
        tracing::warn!(stage, error = %e, "Extraction stage failed, using default");
        T::default()
    })
}

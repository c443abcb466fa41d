//! Full-page screenshots at each standard viewport.

use std::collections::BTreeMap;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use webclone_browser::{PageHandle, Viewport};

use crate::error::ExtractionError;

/// Capture one base64 PNG per viewport, keyed by viewport name.
///
/// The page is resized to each viewport in turn and left to settle before
/// capture. Afterwards it is returned to `restore`, whether or not every
/// capture succeeded, so later stages measure the default layout. A failure
/// at any viewport fails the whole stage.
pub async fn capture(
    page: &dyn PageHandle,
    viewports: &[Viewport],
    settle: Duration,
    restore: &Viewport,
) -> Result<BTreeMap<String, String>, ExtractionError> {
    let captured = capture_each(page, viewports, settle).await;
    let restored = page.set_viewport(restore).await;
    let shots = captured?;
    restored?;
    Ok(shots)
}

async fn capture_each(
    page: &dyn PageHandle,
    viewports: &[Viewport],
    settle: Duration,
) -> Result<BTreeMap<String, String>, ExtractionError> {
    let mut shots = BTreeMap::new();

    for viewport in viewports {
        page.set_viewport(viewport).await?;
        tokio::time::sleep(settle).await;
        let png = page.screenshot().await?;
        tracing::debug!(
            viewport = %viewport.name,
            bytes = png.len(),
            "Screenshot captured",
        );
        shots.insert(viewport.name.clone(), STANDARD.encode(png));
    }
    Ok(shots)
}

use webclone_browser::PageHandle;

use crate::error::ExtractionError;
use crate::sanitize::sanitize_html;

/// Captured markup: `(sanitized, raw)`.
pub async fn capture(page: &dyn PageHandle) -> Result<(String, String), ExtractionError> {
    let raw = page.content().await?;
    let sanitized = sanitize_html(&raw);
    Ok((sanitized, raw))
}

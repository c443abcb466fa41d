//! One extractor per snapshot field.
//!
//! Every extractor takes only the loaded page and returns its field or an
//! [`ExtractionError`]. In-page work is a self-invoking script evaluated in
//! the page; filtering, ordering and caps are applied in Rust afterwards so
//! they hold regardless of what the page returns.

pub mod assets;
pub mod colors;
pub mod css;
pub mod dom;
pub mod layout;
pub mod metadata;
pub mod screenshots;
pub mod typography;

use serde::de::DeserializeOwned;
use webclone_browser::PageHandle;

use crate::error::ExtractionError;

/// Evaluate `script` and decode its result into `T`.
pub(crate) async fn evaluate_as<T: DeserializeOwned>(
    page: &dyn PageHandle,
    script: &str,
) -> Result<T, ExtractionError> {
    let value = page.evaluate(script).await?;
    Ok(serde_json::from_value(value)?)
}

//! Input validation for clone requests.

use url::Url;

use crate::error::CoreError;

/// Parse a submitted URL, accepting only absolute `http`/`https` URLs with
/// a host.
///
/// Rejections are [`CoreError::InvalidUrl`] and are never retried.
pub fn validate_url(raw: &str) -> Result<Url, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidUrl("URL must not be empty".to_string()));
    }

    let parsed =
        Url::parse(trimmed).map_err(|e| CoreError::InvalidUrl(format!("{trimmed} ({e})")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::InvalidUrl(format!(
            "{trimmed} (unsupported scheme '{}')",
            parsed.scheme()
        )));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(CoreError::InvalidUrl(format!("{trimmed} (missing host)"))),
    }
}

use webclone_browser::PageHandle;
use webclone_core::snapshot::PageMetadata;

use super::evaluate_as;
use crate::error::ExtractionError;

const SCRIPT: &str = r#"(() => {
  const meta = (name) => {
    const el = document.querySelector(`meta[name="${name}"]`);
    return el ? el.getAttribute('content') : null;
  };
  const charsetEl = document.querySelector('meta[charset]');
  const open_graph = {};
  for (const el of document.querySelectorAll('meta[property^="og:"]')) {
    const key = el.getAttribute('property');
    const value = el.getAttribute('content');
    if (key && value !== null && !(key in open_graph)) open_graph[key] = value;
  }
  return {
    title: document.title || null,
    description: meta('description'),
    keywords: meta('keywords'),
    viewport: meta('viewport'),
    charset: charsetEl ? charsetEl.getAttribute('charset') : (document.characterSet || null),
    open_graph,
  };
})()"#;

pub async fn extract(page: &dyn PageHandle) -> Result<PageMetadata, ExtractionError> {
    let metadata: PageMetadata = evaluate_as(page, SCRIPT).await?;
    Ok(normalize(metadata))
}

/// Trim every value and treat blank ones as absent.
fn normalize(metadata: PageMetadata) -> PageMetadata {
    let clean = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    PageMetadata {
        title: clean(metadata.title),
        description: clean(metadata.description),
        keywords: clean(metadata.keywords),
        viewport: clean(metadata.viewport),
        charset: clean(metadata.charset),
        open_graph: metadata
            .open_graph
            .into_iter()
            .filter(|(key, _)| key.starts_with("og:"))
            .map(|(key, value)| (key, value.trim().to_string()))
            .collect(),
    }
}

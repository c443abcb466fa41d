//! Computed styles for the page body, header and common selectors.

use webclone_browser::PageHandle;
use webclone_core::snapshot::CssFacts;

use super::evaluate_as;
use crate::error::ExtractionError;

/// Selectors sampled besides `body` and `header`; first match only.
pub const SAMPLED_SELECTORS: [&str; 9] = [
    "h1",
    "h2",
    "h3",
    "p",
    "a",
    "button",
    ".container",
    ".wrapper",
    "nav",
];

const SCRIPT: &str = r#"(() => {
  const props = ['font-size', 'font-weight', 'color', 'margin', 'padding', 'display', 'background-color'];
  const read = (el) => {
    if (!el) return null;
    const cs = window.getComputedStyle(el);
    const out = {};
    for (const p of props) out[p] = cs.getPropertyValue(p);
    return out;
  };
  const selectors = {};
  for (const sel of ['h1', 'h2', 'h3', 'p', 'a', 'button', '.container', '.wrapper', 'nav']) {
    const style = read(document.querySelector(sel));
    if (style) selectors[sel] = style;
  }
  return {
    body: read(document.body),
    header: read(document.querySelector('header')),
    selectors,
  };
})()"#;

pub async fn extract(page: &dyn PageHandle) -> Result<CssFacts, ExtractionError> {
    let mut facts: CssFacts = evaluate_as(page, SCRIPT).await?;
    facts
        .selectors
        .retain(|selector, _| SAMPLED_SELECTORS.contains(&selector.as_str()));
    Ok(facts)
}

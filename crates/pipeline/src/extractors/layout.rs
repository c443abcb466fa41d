//! Structural landmarks and flex/grid containers.

use webclone_browser::PageHandle;
use webclone_core::snapshot::Layout;

use super::evaluate_as;
use crate::error::ExtractionError;

/// Landmark tags summarised in [`Layout::structure`].
pub const STRUCTURAL_TAGS: [&str; 7] =
    ["header", "nav", "main", "section", "aside", "footer", "article"];

/// Class attributes kept per landmark tag.
pub const CLASS_SAMPLE: usize = 5;

/// Elements scanned for flex and grid containers.
pub const SCANNED_ELEMENTS: usize = 300;

const SCRIPT: &str = r#"(() => {
  const structure = {};
  for (const tag of ['header', 'nav', 'main', 'section', 'aside', 'footer', 'article']) {
    const els = Array.from(document.querySelectorAll(tag));
    structure[tag] = {
      present: els.length > 0,
      count: els.length,
      classes: els.slice(0, 5)
        .map((el) => (typeof el.className === 'string' ? el.className.trim() : ''))
        .filter((c) => c.length > 0),
    };
  }
  const flow = {};
  for (const el of Array.from(document.querySelectorAll('*')).slice(0, 300)) {
    const cs = window.getComputedStyle(el);
    if (!['flex', 'inline-flex', 'grid', 'inline-grid'].includes(cs.display)) continue;
    const key = [el.tagName.toLowerCase(), ...Array.from(el.classList)].join('.');
    if (key in flow) continue;
    flow[key] = {
      display: cs.display,
      flex_direction: cs.flexDirection,
      justify_content: cs.justifyContent,
      align_items: cs.alignItems,
      grid_template_columns: cs.gridTemplateColumns,
      gap: cs.gap,
    };
  }
  return { structure, flow };
})()"#;

pub async fn extract(page: &dyn PageHandle) -> Result<Layout, ExtractionError> {
    let layout: Layout = evaluate_as(page, SCRIPT).await?;
    Ok(normalize(layout))
}

fn normalize(mut layout: Layout) -> Layout {
    layout
        .structure
        .retain(|tag, _| STRUCTURAL_TAGS.contains(&tag.as_str()));
    for element in layout.structure.values_mut() {
        element.classes.truncate(CLASS_SAMPLE);
        element.present = element.count > 0;
    }
    layout
}

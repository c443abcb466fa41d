//! Font families in use plus heading and body text metrics.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use webclone_browser::PageHandle;
use webclone_core::snapshot::{FontMetrics, Typography};

use super::evaluate_as;
use crate::error::ExtractionError;

/// Elements scanned for `font-family`.
pub const SCANNED_ELEMENTS: usize = 200;

const SCRIPT: &str = r#"(() => {
  const metrics = (el) => {
    if (!el) return null;
    const cs = window.getComputedStyle(el);
    return {
      font_family: cs.fontFamily,
      font_size: cs.fontSize,
      font_weight: cs.fontWeight,
      line_height: cs.lineHeight,
    };
  };
  const fonts = Array.from(document.querySelectorAll('*'))
    .slice(0, 200)
    .map((el) => window.getComputedStyle(el).fontFamily);
  const headings = {};
  for (const tag of ['h1', 'h2', 'h3', 'h4', 'h5', 'h6']) {
    const m = metrics(document.querySelector(tag));
    if (m) headings[tag] = m;
  }
  return { fonts, headings, body: metrics(document.querySelector('body p') || document.querySelector('p')) };
})()"#;

#[derive(Debug, Default, Deserialize)]
struct RawTypography {
    #[serde(default)]
    fonts: Vec<Option<String>>,
    #[serde(default)]
    headings: BTreeMap<String, FontMetrics>,
    #[serde(default)]
    body: Option<FontMetrics>,
}

pub async fn extract(page: &dyn PageHandle) -> Result<Typography, ExtractionError> {
    let raw: RawTypography = evaluate_as(page, SCRIPT).await?;
    Ok(summarize(raw))
}

fn summarize(raw: RawTypography) -> Typography {
    let fonts: BTreeSet<String> = raw
        .fonts
        .into_iter()
        .flatten()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    let headings = raw
        .headings
        .into_iter()
        .filter(|(tag, _)| matches!(tag.as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6"))
        .collect();

    Typography {
        fonts: fonts.into_iter().collect(),
        headings,
        body: raw.body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fonts_are_sorted_and_unique() {
        let raw: RawTypography = serde_json::from_value(serde_json::json!({
            "fonts": ["Inter, sans-serif", "Georgia, serif", "Inter, sans-serif", "", null],
            "headings": {},
            "body": null
        }))
        .unwrap();
        let typography = summarize(raw);
        assert_eq!(typography.fonts, vec!["Georgia, serif", "Inter, sans-serif"]);
        assert!(typography.body.is_none());
    }

    #[test]
    fn keeps_only_heading_levels() {
        let raw: RawTypography = serde_json::from_value(serde_json::json!({
            "fonts": [],
            "headings": {
                "h1": {"font_family": "Inter", "font_size": "40px", "font_weight": "700", "line_height": "48px"},
                "title": {"font_family": "Inter"}
            },
            "body": {"font_family": "Inter", "font_size": "16px", "font_weight": "400", "line_height": "24px"}
        }))
        .unwrap();
        let typography = summarize(raw);
        assert_eq!(typography.headings.len(), 1);
        assert_eq!(typography.headings["h1"].font_size, "40px");
        assert_eq!(typography.body.unwrap().line_height, "24px");
    }

    #[test]
    fn script_scans_bounded_element_count() {
        assert!(SCRIPT.contains(&format!("slice(0, {SCANNED_ELEMENTS})")));
    }
}

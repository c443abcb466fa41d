//! Color palette sampled from computed styles.

use std::collections::HashSet;

use webclone_browser::PageHandle;

use super::evaluate_as;
use crate::error::ExtractionError;

/// Elements scanned, in document order.
pub const SCANNED_ELEMENTS: usize = 500;

/// Palette size cap.
pub const MAX_COLORS: usize = 20;

const SCRIPT: &str = r#"(() => {
  const values = [];
  const elements = Array.from(document.querySelectorAll('*')).slice(0, 500);
  for (const el of elements) {
    const cs = window.getComputedStyle(el);
    values.push(cs.backgroundColor, cs.color, cs.borderColor);
  }
  return values;
})()"#;

pub async fn extract(page: &dyn PageHandle) -> Result<Vec<String>, ExtractionError> {
    let raw: Vec<Option<String>> = evaluate_as(page, SCRIPT).await?;
    Ok(palette(raw.into_iter().flatten()))
}

/// Unique, non-transparent colors in first-seen order, capped at
/// [`MAX_COLORS`].
pub fn palette<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !is_transparent(v))
        .filter(|v| seen.insert(v.clone()))
        .take(MAX_COLORS)
        .collect()
}

/// `true` for empty values, `transparent` and any `rgba` with zero alpha.
pub fn is_transparent(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    if v.is_empty() || v == "transparent" {
        return true;
    }
    let Some(inner) = v
        .strip_prefix("rgba(")
        .and_then(|rest| rest.strip_suffix(')'))
    else {
        return false;
    };
    inner
        .rsplit(|c: char| c == ',' || c == '/')
        .next()
        .and_then(|alpha| alpha.trim().parse::<f64>().ok())
        .is_some_and(|alpha| alpha == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn transparent_values_are_recognised() {
        assert!(is_transparent("transparent"));
        assert!(is_transparent("rgba(0, 0, 0, 0)"));
        assert!(is_transparent("RGBA(255, 255, 255, 0)"));
        assert!(is_transparent(""));
        assert!(!is_transparent("rgba(0, 0, 0, 0.5)"));
        assert!(!is_transparent("rgb(0, 0, 0)"));
    }

    #[test]
    fn palette_dedupes_in_first_seen_order() {
        let colors = palette(strings(&[
            "rgb(255, 255, 255)",
            "rgba(0, 0, 0, 0)",
            "rgb(0, 0, 0)",
            "rgb(255, 255, 255)",
            "transparent",
            "rgb(10, 20, 30)",
        ]));
        assert_eq!(
            colors,
            strings(&["rgb(255, 255, 255)", "rgb(0, 0, 0)", "rgb(10, 20, 30)"])
        );
    }

    #[test]
    fn palette_is_capped() {
        let values = (0..100).map(|i| format!("rgb({i}, 0, 0)"));
        let colors = palette(values);
        assert_eq!(colors.len(), MAX_COLORS);
        assert_eq!(colors[0], "rgb(0, 0, 0)");
        assert_eq!(colors[19], "rgb(19, 0, 0)");
    }

    #[test]
    fn script_scans_bounded_element_count() {
        assert!(SCRIPT.contains(&format!("slice(0, {SCANNED_ELEMENTS})")));
    }
}

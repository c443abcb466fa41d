//! Asset inventory merged from DOM references and the session network log.

use std::collections::HashSet;

use serde::Deserialize;
use url::Url;
use webclone_browser::{NetworkRequest, PageHandle, ResourceKind};
use webclone_core::snapshot::{AssetCategory, AssetInventory};

use super::evaluate_as;
use crate::error::ExtractionError;

/// URLs kept per category.
pub const MAX_PER_CATEGORY: usize = 20;

const SCRIPT: &str = r#"(() => {
  const attr = (selector, prop) =>
    Array.from(document.querySelectorAll(selector)).map((el) => el[prop]).filter((v) => typeof v === 'string' && v);
  const fontLike = (href) => /\.(woff2?|ttf|otf|eot)(\?|#|$)/i.test(href) || /fonts\.(googleapis|gstatic)\.com/i.test(href);
  return {
    images: attr('img[src]', 'src'),
    stylesheets: attr('link[rel~="stylesheet"][href]', 'href'),
    fonts: Array.from(document.querySelectorAll('link[href]'))
      .filter((el) => el.getAttribute('as') === 'font' || fontLike(el.href))
      .map((el) => el.href),
    icons: attr('link[rel*="icon"][href]', 'href'),
    scripts: attr('script[src]', 'src'),
  };
})()"#;

/// Asset references found in the document.
#[derive(Debug, Default, Deserialize)]
pub struct DomAssets {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stylesheets: Vec<String>,
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(default)]
    pub icons: Vec<String>,
    #[serde(default)]
    pub scripts: Vec<String>,
}

impl DomAssets {
    fn urls(&self, category: AssetCategory) -> &[String] {
        match category {
            AssetCategory::Images => &self.images,
            AssetCategory::Stylesheets => &self.stylesheets,
            AssetCategory::Fonts => &self.fonts,
            AssetCategory::Icons => &self.icons,
            AssetCategory::Scripts => &self.scripts,
        }
    }
}

pub async fn extract(page: &dyn PageHandle) -> Result<AssetInventory, ExtractionError> {
    let dom: DomAssets = evaluate_as(page, SCRIPT).await?;
    Ok(build_inventory(&dom, &page.network_requests()))
}

/// Category for a network request, if it is one the inventory tracks.
fn category_of(kind: ResourceKind) -> Option<AssetCategory> {
    match kind {
        ResourceKind::Image => Some(AssetCategory::Images),
        ResourceKind::Stylesheet => Some(AssetCategory::Stylesheets),
        ResourceKind::Font => Some(AssetCategory::Fonts),
        ResourceKind::Script => Some(AssetCategory::Scripts),
        ResourceKind::Document | ResourceKind::Other => None,
    }
}

/// Merge DOM references with observed requests per category: DOM order
/// first, duplicates and non-http(s) URLs dropped, capped at
/// [`MAX_PER_CATEGORY`].
pub fn build_inventory(dom: &DomAssets, network: &[NetworkRequest]) -> AssetInventory {
    AssetCategory::ALL
        .into_iter()
        .map(|category| {
            let observed = network
                .iter()
                .filter(|req| category_of(req.kind) == Some(category))
                .map(|req| req.url.as_str());
            let candidates = dom.urls(category).iter().map(String::as_str).chain(observed);

            let mut seen = HashSet::new();
            let urls: Vec<String> = candidates
                .filter_map(normalize)
                .filter(|url| seen.insert(url.clone()))
                .take(MAX_PER_CATEGORY)
                .collect();
            (category, urls)
        })
        .collect()
}

/// Absolute http(s) form of `raw` without its fragment. `data:`, `blob:`
/// and unparsable references are dropped.
fn normalize(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.into())
}

//! The extracted-facts bundle produced by one scrape.
//!
//! A [`Snapshot`] is either a success carrying a populated [`Extraction`],
//! or a failure carrying an error message and an all-default extraction.
//! Only the two constructors build one, so a failed scrape can never leak
//! partially extracted data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error text recorded when a failure carries no message of its own.
const UNKNOWN_FAILURE: &str = "Unknown error";

/// Computed CSS property name -> value.
pub type StyleProps = BTreeMap<String, String>;

/// Asset category -> deduplicated, capped list of absolute URLs.
pub type AssetInventory = BTreeMap<AssetCategory, Vec<String>>;

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// Computed styles for `body`, `header` and a fixed list of common selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssFacts {
    #[serde(default)]
    pub body: Option<StyleProps>,
    #[serde(default)]
    pub header: Option<StyleProps>,
    /// Selector -> properties of its first match. Absent selectors are omitted.
    #[serde(default)]
    pub selectors: BTreeMap<String, StyleProps>,
}

/// Font properties of one representative element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontMetrics {
    #[serde(default)]
    pub font_family: String,
    #[serde(default)]
    pub font_size: String,
    #[serde(default)]
    pub font_weight: String,
    #[serde(default)]
    pub line_height: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typography {
    /// Distinct `font-family` values, sorted.
    #[serde(default)]
    pub fonts: Vec<String>,
    /// `h1`..`h6` -> metrics of the first heading at that level.
    #[serde(default)]
    pub headings: BTreeMap<String, FontMetrics>,
    /// Metrics of the first body paragraph.
    #[serde(default)]
    pub body: Option<FontMetrics>,
}

/// Presence summary for one structural tag (`header`, `nav`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralElement {
    pub present: bool,
    pub count: usize,
    /// Class attributes of the first few matches.
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Flow properties of one flex or grid container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowLayout {
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub flex_direction: String,
    #[serde(default)]
    pub justify_content: String,
    #[serde(default)]
    pub align_items: String,
    #[serde(default)]
    pub grid_template_columns: String,
    #[serde(default)]
    pub gap: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Tag name -> presence summary.
    #[serde(default)]
    pub structure: BTreeMap<String, StructuralElement>,
    /// `tag.class` key -> flex/grid properties.
    #[serde(default)]
    pub flow: BTreeMap<String, FlowLayout>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Images,
    Stylesheets,
    Fonts,
    Icons,
    Scripts,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 5] = [
        AssetCategory::Images,
        AssetCategory::Stylesheets,
        AssetCategory::Fonts,
        AssetCategory::Icons,
        AssetCategory::Scripts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetCategory::Images => "images",
            AssetCategory::Stylesheets => "stylesheets",
            AssetCategory::Fonts => "fonts",
            AssetCategory::Icons => "icons",
            AssetCategory::Scripts => "scripts",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub viewport: Option<String>,
    #[serde(default)]
    pub charset: Option<String>,
    /// `og:*` properties keyed by their full property name.
    #[serde(default)]
    pub open_graph: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Every field the extraction pipeline produces. `Default` is the empty
/// value each stage falls back to when it fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Viewport name -> base64-encoded PNG.
    pub screenshots: BTreeMap<String, String>,
    /// Sanitized markup consumed by generation.
    pub dom: String,
    /// Markup exactly as captured.
    pub raw_html: String,
    pub css: CssFacts,
    /// Unique colors in first-seen order.
    pub colors: Vec<String>,
    pub typography: Typography,
    pub layout: Layout,
    pub assets: AssetInventory,
    pub metadata: PageMetadata,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        *self == Extraction::default()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub extraction: Extraction,
}

impl Snapshot {
    pub fn succeeded(url: impl Into<String>, extraction: Extraction) -> Self {
        Self {
            url: url.into(),
            success: true,
            error_message: None,
            extraction,
        }
    }

    /// Build a failed snapshot. A blank message is replaced so the failure
    /// always explains itself.
    pub fn failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            UNKNOWN_FAILURE.to_string()
        } else {
            message
        };
        Self {
            url: url.into(),
            success: false,
            error_message: Some(message),
            extraction: Extraction::default(),
        }
    }
}

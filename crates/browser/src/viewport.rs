//! Named viewport sizes used for context creation and screenshots.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn desktop() -> Self {
        Self::new("desktop", 1920, 1080)
    }

    pub fn tablet() -> Self {
        Self::new("tablet", 768, 1024)
    }

    pub fn mobile() -> Self {
        Self::new("mobile", 375, 667)
    }

    /// The viewports captured for every snapshot, widest first.
    pub fn standard_set() -> Vec<Viewport> {
        vec![Self::desktop(), Self::tablet(), Self::mobile()]
    }
}

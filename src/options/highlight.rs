use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Appearance of the host-driven highlight overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Highlight", inline)]
#[serde(default)]
pub struct HighlightOptions {
    /// Overlay color.
    #[schemars(skip)]
    pub color: Color,
    /// Radius multiplier so the overlay covers the base representation.
    #[schemars(title = "Radius Scale", range(min = 1.0, max = 3.0), extend("step" = 0.1))]
    pub radius_scale: f32,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            color: Color::Rgb([1.0, 1.0, 0.0]),
            radius_scale: 1.5,
        }
    }
}

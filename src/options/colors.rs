use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Residue palette parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Palette", inline)]
#[serde(default)]
pub struct PaletteOptions {
    /// Saturation (percent) shared by every residue color.
    #[schemars(title = "Saturation", range(min = 0.0, max = 100.0), extend("step" = 1.0))]
    pub saturation: f32,
    /// Lightness (percent) shared by every residue color.
    #[schemars(title = "Lightness", range(min = 0.0, max = 100.0), extend("step" = 1.0))]
    pub lightness: f32,
    /// Color of the wildcard `"*"` entry used for unmatched atoms.
    #[schemars(skip)]
    pub wildcard: Color,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            saturation: 70.0,
            lightness: 50.0,
            wildcard: Color::WHITE,
        }
    }
}

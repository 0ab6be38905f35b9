//! Centralized view options with TOML preset support.
//!
//! Palette, highlight, display, and scene settings are consolidated here.
//! Options serialize to/from TOML so a host can ship a preset next to the
//! view, and expose a JSON schema for settings panels.

mod colors;
mod display;
mod highlight;
mod scene;

use std::path::Path;

pub use colors::PaletteOptions;
pub use display::{DisplayOptions, RepresentationKind};
pub use highlight::HighlightOptions;
pub use scene::SceneOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ViewError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[highlight]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Residue palette parameters.
    pub palette: PaletteOptions,
    /// Highlight overlay appearance.
    pub highlight: HighlightOptions,
    /// Representation style and camera behavior.
    pub display: DisplayOptions,
    /// Structure loading parameters.
    pub scene: SceneOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ViewError> {
        toml::from_str(content)
            .map_err(|e| ViewError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ViewError> {
        let content = std::fs::read_to_string(path).map_err(ViewError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), ViewError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ViewError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ViewError::Io)?;
        }
        std::fs::write(path, content).map_err(ViewError::Io)
    }
}

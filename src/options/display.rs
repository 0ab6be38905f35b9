use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Visual style used for residue and highlight representations.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationKind {
    /// Atoms as spheres joined by sticks.
    #[default]
    BallAndStick,
    /// Sticks only.
    Licorice,
    /// Van der Waals spheres.
    Spacefill,
    /// Thin bond lines.
    Line,
}

impl RepresentationKind {
    /// Representation type name understood by the NGL stage.
    #[must_use]
    pub fn ngl_name(self) -> &'static str {
        match self {
            Self::BallAndStick => "ball+stick",
            Self::Licorice => "licorice",
            Self::Spacefill => "spacefill",
            Self::Line => "line",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Representation style and camera behavior after a load.
pub struct DisplayOptions {
    /// Style of the per-residue representations.
    #[schemars(title = "Representation")]
    pub representation: RepresentationKind,
    /// Re-fit the camera to the whole structure after each load.
    #[schemars(title = "Auto View")]
    pub auto_view: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            representation: RepresentationKind::BallAndStick,
            auto_view: true,
        }
    }
}

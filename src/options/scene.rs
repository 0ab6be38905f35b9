use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Scene", inline)]
#[serde(default)]
/// Structure loading parameters.
pub struct SceneOptions {
    /// File extension the renderer uses to pick its structure parser.
    #[schemars(skip)]
    pub file_extension: String,
    /// Seconds an unresolved load may stay pending before a warning is
    /// logged. Loads are never cancelled.
    #[schemars(title = "Stall Warning (s)", range(min = 1.0, max = 120.0), extend("step" = 1.0))]
    pub stall_warning_secs: f32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            file_extension: "pdb".to_owned(),
            stall_warning_secs: 10.0,
        }
    }
}

impl SceneOptions {
    /// Delay for a timer that re-checks a pending load, a little past the
    /// stall threshold so the check cannot run early. Saturates at
    /// `i32::MAX` for browser timer APIs.
    #[must_use]
    pub fn stall_check_millis(&self) -> i32 {
        let millis = (self.stall_warning_secs.max(0.0) * 1000.0).ceil() + 50.0;
        if millis >= i32::MAX as f32 {
            i32::MAX
        } else {
            millis as i32
        }
    }
}

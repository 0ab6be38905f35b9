use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ViewError;
use crate::stage::PickedAtom;

/// Commands the host sends to the view.
///
/// Wire shape: `{"command":"load","text":"..."}` and
/// `{"command":"setHighlight","serials":[1,5,10]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum HostCommand {
    /// Replace the displayed structure.
    #[serde(rename = "load")]
    Load {
        /// Raw PDB text.
        text: String,
    },
    /// Replace the highlight overlay (empty list clears it).
    #[serde(rename = "setHighlight")]
    SetHighlight {
        /// 1-based atom serials.
        serials: Vec<u32>,
    },
}

impl HostCommand {
    /// Decode a command from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode to the JSON wire form.
    pub fn to_json(&self) -> Result<String, ViewError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events the view sends to the host.
///
/// Wire shape: `{"type":"log","message":"...","data":{...}}` and
/// `{"type":"pick","chain":"A","resno":45,"resname":"GLY","atomname":"CA","serial":123}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewEvent {
    /// Diagnostic message with structured payload.
    Log {
        /// Human-readable summary.
        message: String,
        /// Structured details (always an object on the wire).
        #[serde(default = "empty_object")]
        data: Value,
    },
    /// The user clicked an atom.
    Pick(PickedAtom),
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl ViewEvent {
    /// A log event. Non-object `data` is wrapped as `{"value": data}`.
    pub fn log(message: impl Into<String>, data: Value) -> Self {
        let data = match data {
            Value::Object(_) => data,
            Value::Null => empty_object(),
            other => serde_json::json!({ "value": other }),
        };
        Self::Log {
            message: message.into(),
            data,
        }
    }

    /// Decode an event from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode to the JSON wire form.
    pub fn to_json(&self) -> Result<String, ViewError> {
        Ok(serde_json::to_string(self)?)
    }
}

//! Crate-level error types.

use std::fmt;

/// A renderer operation that the stage rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    operation: &'static str,
    message: String,
}

impl StageError {
    /// Create an error for the named stage operation.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// The stage operation that failed (e.g. `"load_structure"`).
    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Renderer-provided failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}

impl std::error::Error for StageError {}

/// Failure to hand an encoded event to the host transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No host channel is reachable.
    Detached,
    /// The channel exists but refused the message.
    Rejected(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "host transport detached"),
            Self::Rejected(msg) => {
                write!(f, "host transport rejected message: {msg}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors produced by the molview crate.
#[derive(Debug)]
pub enum ViewError {
    /// A host command arrived before the bridge connection was established.
    NotConnected,
    /// A bridge message could not be decoded.
    Protocol(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Generic I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => {
                write!(f, "host command received before bridge connected")
            }
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ViewError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(e: serde_json::Error) -> Self {
        Self::Protocol(e.to_string())
    }
}

//! Host bridge: message shapes and fire-and-forget event delivery.
//!
//! The view talks to its host over a transport that only exists once the
//! host environment has finished connecting. Until then, and whenever the
//! transport refuses a message, events go to the local diagnostic stream
//! (the `log` facade under [`DIAGNOSTIC_TARGET`]) instead of being dropped.

mod message;

pub use message::{HostCommand, ViewEvent};
use serde_json::Value;

use crate::error::TransportError;

/// `log` target of the local diagnostic stream.
pub const DIAGNOSTIC_TARGET: &str = "molview::bridge";

/// The host-bound half of a connected bridge.
///
/// Implementations must not block; delivery is fire-and-forget.
pub trait HostTransport {
    /// Hand one encoded event to the host.
    fn post(&self, json: &str) -> Result<(), TransportError>;
}

#[derive(Default)]
enum Connection {
    #[default]
    Pending,
    Connected(Box<dyn HostTransport>),
}

/// View-side endpoint of the bridge.
#[derive(Default)]
pub struct Bridge {
    connection: Connection,
}

impl Bridge {
    /// A bridge whose connection has not been established yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete connection establishment with the host's transport.
    ///
    /// Announces the connection with a `log` event, which the host side
    /// treats as its ready signal. Nothing sent before this point is
    /// replayed.
    pub fn attach(&mut self, transport: Box<dyn HostTransport>) {
        self.connection = Connection::Connected(transport);
        self.log("bridge connected", Value::Null);
    }

    /// Drop the transport; later events fall back to local diagnostics.
    pub fn detach(&mut self) -> Option<Box<dyn HostTransport>> {
        match std::mem::take(&mut self.connection) {
            Connection::Connected(transport) => Some(transport),
            Connection::Pending => None,
        }
    }

    /// Whether host commands may be accepted.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self.connection, Connection::Connected(_))
    }

    /// Deliver an event to the host, or to the local diagnostic stream when
    /// no transport takes it. Never fails and never blocks.
    pub fn emit(&self, event: &ViewEvent) {
        let json = match event.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!(
                    target: DIAGNOSTIC_TARGET,
                    "dropping unencodable event: {e}"
                );
                return;
            }
        };
        match &self.connection {
            Connection::Connected(transport) => {
                if let Err(e) = transport.post(&json) {
                    log::warn!(target: DIAGNOSTIC_TARGET, "{e}");
                    deliver_locally(&json);
                }
            }
            Connection::Pending => deliver_locally(&json),
        }
    }

    /// Emit a `log` event.
    pub fn log(&self, message: &str, data: Value) {
        self.emit(&ViewEvent::log(message, data));
    }
}

fn deliver_locally(json: &str) {
    log::info!(target: DIAGNOSTIC_TARGET, "{json}");
}

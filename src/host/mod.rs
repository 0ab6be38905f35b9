//! Host-side half of the bridge protocol.
//!
//! [`HostSession`] is what an embedding application keeps per view: it
//! decodes incoming events, remembers which atoms the user has picked, and
//! builds the outbound commands. Delivering those commands is up to the
//! embedder; [`script_call`] renders one as a JavaScript call for webview
//! hosts.

mod script;

pub use script::{script_call, DISPATCH_FUNCTION};

use crate::bridge::{HostCommand, ViewEvent};
use crate::stage::PickedAtom;

/// `log` target for events received from the view.
pub const HOST_TARGET: &str = "molview::host";

/// Host-side state for one connected view.
#[derive(Debug, Default)]
pub struct HostSession {
    ready: bool,
    selected: Vec<PickedAtom>,
}

impl HostSession {
    /// A session that has not heard from its view yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the view has announced itself. Commands are refused until
    /// then.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Picked atoms, in pick order, without repeats.
    #[must_use]
    pub fn selected(&self) -> &[PickedAtom] {
        &self.selected
    }

    /// Serials of the picked atoms.
    #[must_use]
    pub fn serials(&self) -> Vec<u32> {
        self.selected.iter().map(|atom| atom.serial).collect()
    }

    /// Forget every picked atom.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Handle one message from the view.
    ///
    /// Malformed messages are logged and ignored. Any well-formed event
    /// marks the session ready.
    pub fn receive(&mut self, json: &str) -> Option<ViewEvent> {
        let event = match ViewEvent::from_json(json) {
            Ok(event) => event,
            Err(e) => {
                log::warn!(target: HOST_TARGET, "invalid message from view: {e}");
                return None;
            }
        };
        if !self.ready {
            log::info!(target: HOST_TARGET, "view ready");
            self.ready = true;
        }
        match &event {
            ViewEvent::Log { message, data } => {
                log::info!(target: HOST_TARGET, "{message} {data}");
            }
            ViewEvent::Pick(atom) => self.record_pick(atom),
        }
        Some(event)
    }

    fn record_pick(&mut self, atom: &PickedAtom) {
        if self.selected.iter().any(|a| a.serial == atom.serial) {
            log::debug!(target: HOST_TARGET, "atom {} already selected", atom.serial);
            return;
        }
        log::info!(
            target: HOST_TARGET,
            "selected {} {} {}{} chain {}",
            atom.serial,
            atom.atomname,
            atom.resname,
            atom.resno,
            atom.chain
        );
        self.selected.push(atom.clone());
    }

    /// Command displaying `text` in the view. Clears the selection, since
    /// serials may refer to different atoms in the new structure.
    pub fn load_command(&mut self, text: impl Into<String>) -> Option<HostCommand> {
        if !self.ensure_ready("load") {
            return None;
        }
        self.clear_selection();
        Some(HostCommand::Load { text: text.into() })
    }

    /// Command highlighting the currently picked atoms.
    #[must_use]
    pub fn highlight_command(&self) -> Option<HostCommand> {
        if !self.ensure_ready("setHighlight") {
            return None;
        }
        Some(HostCommand::SetHighlight {
            serials: self.serials(),
        })
    }

    fn ensure_ready(&self, command: &str) -> bool {
        if !self.ready {
            log::warn!(
                target: HOST_TARGET,
                "not sending {command}: view has not connected"
            );
        }
        self.ready
    }
}

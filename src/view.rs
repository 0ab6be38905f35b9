//! The view: routes host commands, renderer clicks, and load completions to
//! the controllers.
//!
//! ```
//! # use molview::{MolView, options::Options};
//! # use molview::stage::{Stage, LoadRequest, ComponentId, RepresentationId, RepresentationSpec};
//! # use molview::error::StageError;
//! # struct NullStage;
//! # impl Stage for NullStage {
//! #     fn load_structure(&mut self, r: LoadRequest) { r.completer.complete(Ok(ComponentId(1))); }
//! #     fn add_representation(&mut self, _: ComponentId, _: &RepresentationSpec) -> Result<RepresentationId, StageError> { Ok(RepresentationId(1)) }
//! #     fn remove_representation(&mut self, _: ComponentId, _: RepresentationId) -> Result<(), StageError> { Ok(()) }
//! #     fn remove_all_representations(&mut self, _: ComponentId) -> Result<(), StageError> { Ok(()) }
//! #     fn remove_component(&mut self, _: ComponentId) -> Result<(), StageError> { Ok(()) }
//! #     fn auto_view(&mut self, _: ComponentId) {}
//! # }
//! let mut view = MolView::new(NullStage, Options::default());
//! let _ = view.load("ATOM      1  CA  GLY A   1       0.000   0.000   0.000\n".into());
//! assert_eq!(view.scene().residues(), ["GLY"]);
//! ```

use std::sync::mpsc;

use serde_json::json;

use crate::bridge::{Bridge, HostCommand, HostTransport};
use crate::error::ViewError;
use crate::options::Options;
use crate::picking::PickRelay;
use crate::scene::{Completion, SceneController};
use crate::selection::{HighlightOutcome, SelectionController};
use crate::stage::{completion_channel, LoadOutcome, PickTarget, Stage};

/// A rendering view bound to one stage.
pub struct MolView<S: Stage> {
    stage: S,
    options: Options,
    bridge: Bridge,
    scene: SceneController,
    selection: SelectionController,
    relay: PickRelay,
    completions: mpsc::Receiver<LoadOutcome>,
}

impl<S: Stage> MolView<S> {
    /// Create a view over `stage`. The bridge starts unconnected.
    pub fn new(stage: S, options: Options) -> Self {
        let (tx, completions) = completion_channel();
        Self {
            stage,
            options,
            bridge: Bridge::new(),
            scene: SceneController::new(tx),
            selection: SelectionController::new(),
            relay: PickRelay::new(),
            completions,
        }
    }

    // ── Bridge ──────────────────────────────────────────────────────────

    /// Finish connecting to the host.
    pub fn attach(&mut self, transport: Box<dyn HostTransport>) {
        self.bridge.attach(transport);
    }

    /// Disconnect from the host.
    pub fn detach(&mut self) -> Option<Box<dyn HostTransport>> {
        self.bridge.detach()
    }

    /// Whether host commands are accepted.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.bridge.is_connected()
    }

    /// Execute a host command. Refused until the bridge is connected.
    pub fn dispatch(&mut self, command: HostCommand) -> Result<(), ViewError> {
        if !self.bridge.is_connected() {
            log::warn!("refusing host command before the bridge is connected");
            return Err(ViewError::NotConnected);
        }
        match command {
            HostCommand::Load { text } => {
                let _ = self.load(text);
            }
            HostCommand::SetHighlight { serials } => {
                let _ = self.set_highlight(&serials);
            }
        }
        Ok(())
    }

    /// Decode and execute a JSON-encoded host command.
    pub fn dispatch_json(&mut self, json: &str) -> Result<(), ViewError> {
        let command = match HostCommand::from_json(json) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("{e}");
                self.bridge
                    .log("unrecognized command", json!({"error": e.to_string()}));
                return Err(e);
            }
        };
        self.dispatch(command)
    }

    // ── Commands ────────────────────────────────────────────────────────

    /// Replace the displayed structure with `text`.
    ///
    /// Returns the load generation. If the stage resolves synchronously the
    /// structure is already displayed on return; otherwise call
    /// [`pump`](Self::pump) once it settles.
    pub fn load(&mut self, text: String) -> u64 {
        let _ = self.selection.clear(&mut self.stage);
        let generation = self.scene.load(
            text,
            &mut self.stage,
            &self.bridge,
            &self.options,
        );
        let _ = self.pump();
        generation
    }

    /// Replace the highlight overlay.
    pub fn set_highlight(&mut self, serials: &[u32]) -> HighlightOutcome {
        self.selection.set_highlight(
            serials,
            self.scene.component(),
            &mut self.stage,
            &self.bridge,
            &self.options,
        )
    }

    /// Remove the displayed structure, its overlay, and any pending load.
    pub fn unload(&mut self) -> bool {
        let _ = self.selection.clear(&mut self.stage);
        self.scene.unload(&mut self.stage)
    }

    /// Forward a renderer click to the host.
    pub fn on_click(&mut self, target: &PickTarget) -> bool {
        self.relay.on_click(target, &self.bridge)
    }

    /// Apply every queued load completion and check for a stalled load.
    ///
    /// Returns the completions in arrival order.
    pub fn pump(&mut self) -> Vec<Completion> {
        let mut applied = Vec::new();
        while let Ok(outcome) = self.completions.try_recv() {
            applied.push(self.scene.complete(
                outcome,
                &mut self.stage,
                &self.bridge,
                &self.options,
            ));
        }
        let _ = self.scene.check_stall(&self.options);
        applied
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// The scene controller.
    #[must_use]
    pub fn scene(&self) -> &SceneController {
        &self.scene
    }

    /// The selection controller.
    #[must_use]
    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// The pick relay.
    #[must_use]
    pub fn relay(&self) -> &PickRelay {
        &self.relay
    }

    /// The stage.
    #[must_use]
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Mutable access to the stage, for renderer-specific calls.
    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace the options. Takes effect on the next load or highlight.
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }
}

use std::sync::mpsc;

use super::ComponentId;
use crate::error::StageError;

/// A structure load handed to the stage.
pub struct LoadRequest {
    /// Generation of the load attempt that issued this request.
    pub generation: u64,
    /// Raw structure text.
    pub text: String,
    /// Virtual file extension (e.g. `"pdb"`).
    pub extension: String,
    /// Resolves the request; the stage calls it exactly once.
    pub completer: LoadCompleter,
}

/// Result of one load attempt, tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Generation of the load attempt.
    pub generation: u64,
    /// The new component, or why the renderer rejected the text.
    pub result: Result<ComponentId, StageError>,
}

/// Sending half of the completion queue for one load attempt.
#[derive(Debug)]
pub struct LoadCompleter {
    generation: u64,
    tx: mpsc::Sender<LoadOutcome>,
}

impl LoadCompleter {
    /// Bind a completer to a generation and the view's completion queue.
    #[must_use]
    pub fn new(generation: u64, tx: mpsc::Sender<LoadOutcome>) -> Self {
        Self { generation, tx }
    }

    /// Queue the outcome for the view to pick up on its next pump.
    pub fn complete(self, result: Result<ComponentId, StageError>) {
        let outcome = LoadOutcome {
            generation: self.generation,
            result,
        };
        if self.tx.send(outcome).is_err() {
            log::debug!(
                "load {} resolved after the view was dropped",
                self.generation
            );
        }
    }
}

/// Create the completion queue shared by the scene controller and the view.
#[must_use]
pub fn completion_channel() -> (mpsc::Sender<LoadOutcome>, mpsc::Receiver<LoadOutcome>)
{
    mpsc::channel()
}

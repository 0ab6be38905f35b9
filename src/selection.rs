//! Selection controller: the single highlight overlay.
//!
//! At most one overlay representation exists at any time. Every
//! `setHighlight` removes the previous overlay before doing anything else,
//! so repeating a request leaves exactly one overlay behind.

use rustc_hash::FxHashSet;
use serde_json::json;

use crate::bridge::Bridge;
use crate::error::StageError;
use crate::options::Options;
use crate::stage::{
    discard_cleanup, ComponentId, RepresentationId, RepresentationSpec,
    Selection, Stage,
};

/// Why a highlight request left no overlay behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// The host sent an empty serial list (or only serial 0).
    EmptySerials,
    /// No structure is displayed yet.
    NoComponent,
}

/// Result of a highlight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightOutcome {
    /// A new overlay covers this many atoms.
    Shown {
        /// Distinct atoms in the overlay.
        atoms: usize,
    },
    /// The overlay was removed and not replaced.
    Cleared(ClearReason),
    /// The stage refused the overlay; none is shown.
    Failed(StageError),
}

struct Overlay {
    component: ComponentId,
    representation: RepresentationId,
    selection: Selection,
}

/// Owns the highlight overlay.
#[derive(Default)]
pub struct SelectionController {
    overlay: Option<Overlay>,
}

impl SelectionController {
    /// A controller with no overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an overlay is attached.
    #[must_use]
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Renderer indices (0-based) covered by the overlay.
    #[must_use]
    pub fn highlighted_indices(&self) -> &[u32] {
        match self.overlay.as_ref().map(|o| &o.selection) {
            Some(Selection::AtomIndices(indices)) => indices.as_slice(),
            _ => &[],
        }
    }

    /// The overlay's representation handle.
    #[must_use]
    pub fn representation(&self) -> Option<RepresentationId> {
        self.overlay.as_ref().map(|o| o.representation)
    }

    /// Replace the overlay with one covering `serials` (1-based).
    ///
    /// `component` is the displayed structure, if any. Duplicate serials are
    /// collapsed and serial 0 is ignored.
    pub fn set_highlight(
        &mut self,
        serials: &[u32],
        component: Option<ComponentId>,
        stage: &mut dyn Stage,
        bridge: &Bridge,
        options: &Options,
    ) -> HighlightOutcome {
        let _ = self.clear(stage);

        let serials = distinct_serials(serials);
        if serials.is_empty() {
            bridge.log("highlight cleared", json!({"reason": "empty serial list"}));
            return HighlightOutcome::Cleared(ClearReason::EmptySerials);
        }
        let Some(component) = component else {
            bridge.log("highlight skipped", json!({"reason": "no component"}));
            return HighlightOutcome::Cleared(ClearReason::NoComponent);
        };

        let selection = Selection::from_serials(&serials);
        let spec = RepresentationSpec {
            name: "highlight".to_owned(),
            kind: options.display.representation,
            selection: selection.clone(),
            color: options.highlight.color,
            radius_scale: Some(options.highlight.radius_scale),
        };
        match stage.add_representation(component, &spec) {
            Ok(representation) => {
                bridge.log(
                    "highlight applied",
                    json!({
                        "serials": serials,
                        "selection": selection.to_string(),
                    }),
                );
                self.overlay = Some(Overlay {
                    component,
                    representation,
                    selection,
                });
                HighlightOutcome::Shown {
                    atoms: serials.len(),
                }
            }
            Err(e) => {
                log::error!("highlight overlay rejected: {e}");
                bridge.log(
                    "highlight failed",
                    json!({
                        "serials": serials,
                        "operation": e.operation(),
                        "error": e.message(),
                    }),
                );
                HighlightOutcome::Failed(e)
            }
        }
    }

    /// Remove the overlay, ignoring stage errors. Returns `true` if one was
    /// attached.
    pub fn clear(&mut self, stage: &mut dyn Stage) -> bool {
        let Some(overlay) = self.overlay.take() else {
            return false;
        };
        discard_cleanup(
            "highlight removal",
            stage.remove_representation(overlay.component, overlay.representation),
        );
        true
    }
}

/// Distinct non-zero serials in first-seen order.
fn distinct_serials(serials: &[u32]) -> Vec<u32> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::with_capacity(serials.len());
    for &serial in serials {
        if serial == 0 {
            log::warn!("ignoring atom serial 0 in highlight request");
            continue;
        }
        if seen.insert(serial) {
            out.push(serial);
        }
    }
    out
}

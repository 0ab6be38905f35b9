//! The renderer capability the view drives.
//!
//! The 3D engine itself is opaque: it can load structure text into a
//! component, attach and detach labeled representations on that component,
//! re-fit the camera, and report clicks. [`Stage`] captures exactly that
//! surface so the controllers can be exercised without a renderer.

mod load;
mod selection;

pub use load::{completion_channel, LoadCompleter, LoadOutcome, LoadRequest};
use serde::{Deserialize, Serialize};
pub use selection::Selection;

use crate::color::Color;
use crate::error::StageError;
use crate::options::RepresentationKind;

/// Handle to a structure loaded into the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(pub u32);

/// Handle to a representation attached to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepresentationId(pub u32);

/// Everything the stage needs to attach one representation.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentationSpec {
    /// Label shown in the renderer's representation list.
    pub name: String,
    /// Visual style.
    pub kind: RepresentationKind,
    /// Atoms covered by the representation.
    pub selection: Selection,
    /// Uniform color for the covered atoms.
    pub color: Color,
    /// Radius multiplier; `None` keeps the renderer default.
    pub radius_scale: Option<f32>,
}

/// Identity of a clicked atom, as the renderer reports it.
///
/// `serial` is the structure file's 1-based atom serial, untranslated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedAtom {
    /// Chain identifier.
    pub chain: String,
    /// Residue sequence number.
    pub resno: i32,
    /// Residue name.
    pub resname: String,
    /// Atom name.
    pub atomname: String,
    /// 1-based atom serial.
    pub serial: u32,
}

/// What a click on the rendered scene resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PickTarget {
    /// Background click.
    #[default]
    None,
    /// An atom.
    Atom(PickedAtom),
    /// Some other pickable object (bond, surface, label, ...).
    Other(String),
}

impl PickTarget {
    /// The picked atom, if the click landed on one.
    #[must_use]
    pub fn atom(&self) -> Option<&PickedAtom> {
        match self {
            Self::Atom(atom) => Some(atom),
            _ => None,
        }
    }
}

/// Opaque rendering engine.
///
/// All calls happen on the single control thread. Only
/// [`load_structure`](Stage::load_structure) is asynchronous: the stage must
/// eventually resolve the request through its [`LoadCompleter`], and may do
/// so from inside the call.
pub trait Stage {
    /// Start loading structure text as a virtual file with the request's
    /// extension.
    fn load_structure(&mut self, request: LoadRequest);

    /// Attach a representation to a loaded component.
    fn add_representation(
        &mut self,
        component: ComponentId,
        spec: &RepresentationSpec,
    ) -> Result<RepresentationId, StageError>;

    /// Detach one representation.
    fn remove_representation(
        &mut self,
        component: ComponentId,
        representation: RepresentationId,
    ) -> Result<(), StageError>;

    /// Detach every representation of a component.
    fn remove_all_representations(
        &mut self,
        component: ComponentId,
    ) -> Result<(), StageError>;

    /// Release a component and everything attached to it.
    fn remove_component(
        &mut self,
        component: ComponentId,
    ) -> Result<(), StageError>;

    /// Re-fit the camera to frame the component.
    fn auto_view(&mut self, component: ComponentId);
}

/// Log and drop the error of a best-effort cleanup step.
///
/// Teardown of a previous component or overlay must never block the
/// operation that triggered it.
pub fn discard_cleanup(step: &str, result: Result<(), StageError>) {
    if let Err(e) = result {
        log::warn!("ignoring cleanup failure during {step}: {e}");
    }
}

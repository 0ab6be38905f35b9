//! Test doubles shared by the controller and view tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::{Mutex, Once};

use crate::bridge::{HostTransport, ViewEvent};
use crate::error::{StageError, TransportError};
use crate::stage::{
    ComponentId, LoadRequest, PickedAtom, RepresentationId,
    RepresentationSpec, Stage,
};

pub(crate) const ALA_HOH: &str = "\
ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N
ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00  0.00           C
HETATM    3  O   HOH A 101       5.000   5.000   5.000  1.00  0.00           O
";

pub(crate) const GLY_SER_TRP: &str = "\
ATOM      1  N   TRP A   1       0.000   0.000   0.000  1.00  0.00           N
ATOM      2  N   GLY A   2       1.000   0.000   0.000  1.00  0.00           N
ATOM      3  N   SER A   3       2.000   0.000   0.000  1.00  0.00           N
";

/// In-memory stage that records every call.
///
/// In auto mode loads resolve inside `load_structure`; in manual mode they
/// wait until the test resolves them, in any order.
pub(crate) struct RecordingStage {
    auto_resolve: bool,
    pub(crate) reject_loads: bool,
    pub(crate) fail_removals: bool,
    /// `add_representation` fails once a component holds this many.
    pub(crate) fail_add_after: Option<usize>,
    pending: Vec<LoadRequest>,
    components: BTreeMap<u32, Vec<(RepresentationId, RepresentationSpec)>>,
    next_id: u32,
    pub(crate) auto_views: Vec<ComponentId>,
    pub(crate) loaded_texts: Vec<String>,
}

impl RecordingStage {
    pub(crate) fn new() -> Self {
        Self {
            auto_resolve: true,
            reject_loads: false,
            fail_removals: false,
            fail_add_after: None,
            pending: Vec::new(),
            components: BTreeMap::new(),
            next_id: 1,
            auto_views: Vec::new(),
            loaded_texts: Vec::new(),
        }
    }

    pub(crate) fn manual() -> Self {
        Self {
            auto_resolve: false,
            ..Self::new()
        }
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn settle(&mut self, request: LoadRequest) {
        if self.reject_loads {
            request
                .completer
                .complete(Err(StageError::new("load_structure", "bad text")));
            return;
        }
        let id = self.alloc();
        let _ = self.components.insert(id, Vec::new());
        request.completer.complete(Ok(ComponentId(id)));
    }

    fn take_pending(&mut self, generation: u64) -> LoadRequest {
        let index = self
            .pending
            .iter()
            .position(|r| r.generation == generation)
            .unwrap();
        self.pending.remove(index)
    }

    /// Resolve a pending manual load successfully.
    pub(crate) fn resolve(&mut self, generation: u64) {
        let request = self.take_pending(generation);
        let id = self.alloc();
        let _ = self.components.insert(id, Vec::new());
        request.completer.complete(Ok(ComponentId(id)));
    }

    /// Resolve a pending manual load with a renderer error.
    pub(crate) fn reject(&mut self, generation: u64) {
        let request = self.take_pending(generation);
        request
            .completer
            .complete(Err(StageError::new("load_structure", "bad text")));
    }

    pub(crate) fn pending_generations(&self) -> Vec<u64> {
        self.pending.iter().map(|r| r.generation).collect()
    }

    pub(crate) fn live_components(&self) -> Vec<ComponentId> {
        self.components.keys().map(|&id| ComponentId(id)).collect()
    }

    pub(crate) fn specs(&self, component: ComponentId) -> Vec<RepresentationSpec> {
        self.components
            .get(&component.0)
            .map(|reps| reps.iter().map(|(_, spec)| spec.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn representation_count(&self) -> usize {
        self.components.values().map(Vec::len).sum()
    }

    pub(crate) fn overlay_specs(&self) -> Vec<RepresentationSpec> {
        self.components
            .values()
            .flatten()
            .filter(|(_, spec)| spec.radius_scale.is_some())
            .map(|(_, spec)| spec.clone())
            .collect()
    }
}

impl Stage for RecordingStage {
    fn load_structure(&mut self, request: LoadRequest) {
        self.loaded_texts.push(request.text.clone());
        if self.auto_resolve {
            self.settle(request);
        } else {
            self.pending.push(request);
        }
    }

    fn add_representation(
        &mut self,
        component: ComponentId,
        spec: &RepresentationSpec,
    ) -> Result<RepresentationId, StageError> {
        let limit = self.fail_add_after;
        let id = RepresentationId(self.next_id);
        let reps = self.components.get_mut(&component.0).ok_or_else(|| {
            StageError::new("add_representation", "unknown component")
        })?;
        if limit.is_some_and(|limit| reps.len() >= limit) {
            return Err(StageError::new("add_representation", "refused"));
        }
        reps.push((id, spec.clone()));
        self.next_id += 1;
        Ok(id)
    }

    fn remove_representation(
        &mut self,
        component: ComponentId,
        representation: RepresentationId,
    ) -> Result<(), StageError> {
        if self.fail_removals {
            return Err(StageError::new("remove_representation", "refused"));
        }
        let reps = self.components.get_mut(&component.0).ok_or_else(|| {
            StageError::new("remove_representation", "unknown component")
        })?;
        reps.retain(|(id, _)| *id != representation);
        Ok(())
    }

    fn remove_all_representations(
        &mut self,
        component: ComponentId,
    ) -> Result<(), StageError> {
        if self.fail_removals {
            return Err(StageError::new(
                "remove_all_representations",
                "refused",
            ));
        }
        if let Some(reps) = self.components.get_mut(&component.0) {
            reps.clear();
        }
        Ok(())
    }

    fn remove_component(
        &mut self,
        component: ComponentId,
    ) -> Result<(), StageError> {
        if self.fail_removals {
            return Err(StageError::new("remove_component", "refused"));
        }
        self.components
            .remove(&component.0)
            .map(|_| ())
            .ok_or_else(|| {
                StageError::new("remove_component", "unknown component")
            })
    }

    fn auto_view(&mut self, component: ComponentId) {
        self.auto_views.push(component);
    }
}

/// Transport that keeps every posted message.
#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    sent: Rc<RefCell<Vec<String>>>,
    reject: bool,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub(crate) fn clear(&self) {
        self.sent.borrow_mut().clear();
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    pub(crate) fn events(&self) -> Vec<ViewEvent> {
        self.sent
            .borrow()
            .iter()
            .map(|json| ViewEvent::from_json(json).unwrap())
            .collect()
    }

    pub(crate) fn log_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Log { message, .. } => Some(message),
                ViewEvent::Pick(_) => None,
            })
            .collect()
    }

    pub(crate) fn picks(&self) -> Vec<PickedAtom> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Pick(atom) => Some(atom),
                ViewEvent::Log { .. } => None,
            })
            .collect()
    }
}

impl HostTransport for RecordingTransport {
    fn post(&self, json: &str) -> Result<(), TransportError> {
        if self.reject {
            return Err(TransportError::Rejected("test transport".into()));
        }
        self.sent.borrow_mut().push(json.to_owned());
        Ok(())
    }
}

/// `log` records seen by [`CapturingLogger`], as `(target, message)`.
static RECORDS: Mutex<Vec<(String, String)>> = Mutex::new(Vec::new());

/// Process-wide logger that keeps every record for assertions.
struct CapturingLogger;

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        RECORDS
            .lock()
            .unwrap()
            .push((record.target().to_owned(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;
static INSTALL: Once = Once::new();

/// Route `log` output into the capture buffer. Safe to call from every test.
pub(crate) fn capture_logs() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
}

/// Captured messages logged under `target`. Tests run in parallel, so
/// callers should look for a marker unique to their test.
pub(crate) fn logged_under(target: &str) -> Vec<String> {
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(t, _)| t == target)
        .map(|(_, message)| message.clone())
        .collect()
}

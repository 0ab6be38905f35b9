//! Scene controller: lifecycle of the displayed structure.
//!
//! States are **Empty** and **Loaded**. A load tears down the current
//! structure first, so the controller is Empty while the renderer works on
//! the new text; it only becomes Loaded when the completion for the *current*
//! load generation arrives and every residue representation has been
//! attached.
//!
//! Each load bumps a generation counter. Completions carry the generation
//! they belong to; anything older than the pending load is stale and is
//! released without touching the scene.

use serde_json::json;
use web_time::Instant;

use crate::bridge::Bridge;
use crate::color::ColorMap;
use crate::error::StageError;
use crate::options::Options;
use crate::stage::{
    discard_cleanup, ComponentId, LoadCompleter, LoadOutcome, LoadRequest,
    RepresentationId, RepresentationSpec, Selection, Stage,
};
use crate::structure;

/// Observable scene state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    /// No structure displayed.
    Empty,
    /// Exactly one structure with its residue representations.
    Loaded,
}

/// How a load completion was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The structure is displayed.
    Loaded(ComponentId),
    /// The renderer rejected the structure; the scene stays Empty.
    Failed(StageError),
    /// A newer load superseded this one; its result was discarded.
    Stale,
}

/// Residue data computed when a load starts, kept until it resolves.
struct PendingLoad {
    generation: u64,
    residues: Vec<String>,
    colors: ColorMap,
    started: Instant,
    stall_reported: bool,
}

struct LoadedStructure {
    generation: u64,
    component: ComponentId,
    representations: Vec<RepresentationId>,
    residues: Vec<String>,
    colors: ColorMap,
}

/// Owns the single scene component and its per-residue representations.
pub struct SceneController {
    completions: std::sync::mpsc::Sender<LoadOutcome>,
    generation: u64,
    pending: Option<PendingLoad>,
    loaded: Option<LoadedStructure>,
}

impl SceneController {
    /// Create an empty controller reporting load completions to
    /// `completions`.
    #[must_use]
    pub fn new(completions: std::sync::mpsc::Sender<LoadOutcome>) -> Self {
        Self {
            completions,
            generation: 0,
            pending: None,
            loaded: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SceneState {
        if self.loaded.is_some() {
            SceneState::Loaded
        } else {
            SceneState::Empty
        }
    }

    /// Generation of the load still waiting on the renderer, if any.
    #[must_use]
    pub fn pending_generation(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.generation)
    }

    /// Whether the pending load has outlived the stall threshold.
    #[must_use]
    pub fn stall_reported(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| p.stall_reported)
    }

    /// The displayed component.
    #[must_use]
    pub fn component(&self) -> Option<ComponentId> {
        self.loaded.as_ref().map(|l| l.component)
    }

    /// Representations of the displayed structure, one per residue.
    #[must_use]
    pub fn representations(&self) -> &[RepresentationId] {
        self.loaded
            .as_ref()
            .map_or(&[], |l| l.representations.as_slice())
    }

    /// Residue names of the displayed structure.
    #[must_use]
    pub fn residues(&self) -> &[String] {
        self.loaded.as_ref().map_or(&[], |l| l.residues.as_slice())
    }

    /// Color map of the displayed structure.
    #[must_use]
    pub fn color_map(&self) -> Option<&ColorMap> {
        self.loaded.as_ref().map(|l| &l.colors)
    }

    /// Start displaying `text`, replacing whatever is shown.
    ///
    /// Returns the generation of the new load. The scene is Empty until the
    /// matching completion is passed to [`complete`](Self::complete).
    pub fn load(
        &mut self,
        text: String,
        stage: &mut dyn Stage,
        bridge: &Bridge,
        options: &Options,
    ) -> u64 {
        let _ = self.teardown(stage);

        let residues = structure::residue_names(&text);
        let colors = ColorMap::assign(&residues, &options.palette);

        self.generation += 1;
        let generation = self.generation;
        bridge.log(
            "structure parsed",
            json!({
                "generation": generation,
                "residues": residues,
                "colors": colors,
            }),
        );

        let superseded = self.pending.replace(PendingLoad {
            generation,
            residues,
            colors,
            started: Instant::now(),
            stall_reported: false,
        });
        if let Some(old) = superseded {
            log::debug!("load {} superseded by {generation}", old.generation);
        }

        log::info!("loading structure (generation {generation})");
        stage.load_structure(LoadRequest {
            generation,
            text,
            extension: options.scene.file_extension.clone(),
            completer: LoadCompleter::new(generation, self.completions.clone()),
        });
        generation
    }

    /// Remove the displayed structure and abandon any pending load.
    ///
    /// Returns `true` if a structure was displayed.
    pub fn unload(&mut self, stage: &mut dyn Stage) -> bool {
        if let Some(pending) = self.pending.take() {
            log::debug!("abandoning pending load {}", pending.generation);
        }
        self.teardown(stage)
    }

    /// Apply a load completion.
    pub fn complete(
        &mut self,
        outcome: LoadOutcome,
        stage: &mut dyn Stage,
        bridge: &Bridge,
        options: &Options,
    ) -> Completion {
        let pending = match self.pending.take() {
            Some(p) if p.generation == outcome.generation => p,
            other => {
                self.pending = other;
                release_stale(outcome, stage);
                return Completion::Stale;
            }
        };

        let component = match outcome.result {
            Ok(component) => component,
            Err(e) => {
                log::error!("structure load {} failed: {e}", pending.generation);
                bridge.log(
                    "structure load failed",
                    json!({
                        "generation": pending.generation,
                        "operation": e.operation(),
                        "error": e.message(),
                    }),
                );
                return Completion::Failed(e);
            }
        };

        // Never leave a second component behind.
        let _ = self.teardown(stage);

        let representations = match attach_residues(
            component,
            &pending.residues,
            &pending.colors,
            stage,
            options,
        ) {
            Ok(representations) => representations,
            Err(e) => {
                release(component, stage);
                log::error!(
                    "structure load {} abandoned: {e}",
                    pending.generation
                );
                bridge.log(
                    "structure load failed",
                    json!({
                        "generation": pending.generation,
                        "operation": e.operation(),
                        "error": e.message(),
                    }),
                );
                return Completion::Failed(e);
            }
        };

        if options.display.auto_view {
            stage.auto_view(component);
        }

        bridge.log(
            "structure loaded",
            json!({
                "generation": pending.generation,
                "representations": representations.len(),
            }),
        );
        self.loaded = Some(LoadedStructure {
            generation: pending.generation,
            component,
            representations,
            residues: pending.residues,
            colors: pending.colors,
        });
        Completion::Loaded(component)
    }

    /// Warn once if the pending load has been outstanding longer than the
    /// configured threshold. Returns `true` when the warning fires.
    pub fn check_stall(&mut self, options: &Options) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        if pending.stall_reported {
            return false;
        }
        let waited = pending.started.elapsed().as_secs_f32();
        if waited < options.scene.stall_warning_secs {
            return false;
        }
        pending.stall_reported = true;
        log::warn!(
            "structure load {} still pending after {waited:.1}s; nothing is displayed",
            pending.generation
        );
        true
    }

    fn teardown(&mut self, stage: &mut dyn Stage) -> bool {
        let Some(loaded) = self.loaded.take() else {
            return false;
        };
        log::debug!(
            "tearing down structure from load {} ({} representations)",
            loaded.generation,
            loaded.representations.len()
        );
        release(loaded.component, stage);
        true
    }
}

/// One representation per residue, colored from the map.
fn attach_residues(
    component: ComponentId,
    residues: &[String],
    colors: &ColorMap,
    stage: &mut dyn Stage,
    options: &Options,
) -> Result<Vec<RepresentationId>, StageError> {
    residues
        .iter()
        .map(|residue| {
            let spec = RepresentationSpec {
                name: format!("residue {residue}"),
                kind: options.display.representation,
                selection: Selection::ResidueName(residue.clone()),
                color: colors.color_for(residue),
                radius_scale: None,
            };
            stage.add_representation(component, &spec)
        })
        .collect()
}

fn release(component: ComponentId, stage: &mut dyn Stage) {
    discard_cleanup(
        "representation removal",
        stage.remove_all_representations(component),
    );
    discard_cleanup("component release", stage.remove_component(component));
}

fn release_stale(outcome: LoadOutcome, stage: &mut dyn Stage) {
    match outcome.result {
        Ok(component) => {
            log::debug!(
                "discarding superseded load {} ({component:?})",
                outcome.generation
            );
            release(component, stage);
        }
        Err(e) => {
            log::debug!("superseded load {} failed: {e}", outcome.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::completion_channel;
    use crate::testing::{RecordingStage, RecordingTransport, ALA_HOH, GLY_SER_TRP};

    struct Fixture {
        scene: SceneController,
        rx: std::sync::mpsc::Receiver<LoadOutcome>,
        stage: RecordingStage,
        bridge: Bridge,
        transport: RecordingTransport,
        options: Options,
    }

    impl Fixture {
        fn new(stage: RecordingStage) -> Self {
            let (tx, rx) = completion_channel();
            let transport = RecordingTransport::new();
            let mut bridge = Bridge::new();
            bridge.attach(Box::new(transport.clone()));
            transport.clear();
            Self {
                scene: SceneController::new(tx),
                rx,
                stage,
                bridge,
                transport,
                options: Options::default(),
            }
        }

        fn load(&mut self, text: &str) -> u64 {
            self.scene.load(
                text.to_owned(),
                &mut self.stage,
                &self.bridge,
                &self.options,
            )
        }

        fn drain(&mut self) -> Vec<Completion> {
            let mut out = Vec::new();
            while let Ok(outcome) = self.rx.try_recv() {
                out.push(self.scene.complete(
                    outcome,
                    &mut self.stage,
                    &self.bridge,
                    &self.options,
                ));
            }
            out
        }
    }

    fn residue_names_of(stage: &RecordingStage, component: ComponentId) -> Vec<String> {
        stage
            .specs(component)
            .into_iter()
            .map(|spec| match spec.selection {
                Selection::ResidueName(name) => name,
                Selection::AtomIndices(_) => String::new(),
            })
            .collect()
    }

    #[test]
    fn load_creates_one_representation_per_residue() {
        let mut fx = Fixture::new(RecordingStage::new());
        let generation = fx.load(ALA_HOH);
        assert_eq!(fx.scene.state(), SceneState::Empty);
        assert_eq!(fx.scene.pending_generation(), Some(generation));

        let completions = fx.drain();
        let component = fx.scene.component().unwrap();
        assert_eq!(completions, vec![Completion::Loaded(component)]);
        assert_eq!(fx.scene.state(), SceneState::Loaded);
        assert_eq!(fx.scene.pending_generation(), None);
        assert_eq!(residue_names_of(&fx.stage, component), vec!["ALA", "HOH"]);
        assert_eq!(fx.scene.representations().len(), 2);
        assert_eq!(fx.stage.auto_views, vec![component]);
        assert_eq!(fx.stage.loaded_texts, vec![ALA_HOH.to_owned()]);
    }

    #[test]
    fn representations_use_color_map_colors() {
        let mut fx = Fixture::new(RecordingStage::new());
        let _ = fx.load(ALA_HOH);
        let _ = fx.drain();
        let component = fx.scene.component().unwrap();
        let colors = fx.scene.color_map().unwrap();
        for spec in fx.stage.specs(component) {
            let Selection::ResidueName(name) = &spec.selection else {
                panic!("residue representation expected");
            };
            assert_eq!(Some(spec.color), colors.get(name));
            assert_eq!(spec.radius_scale, None);
        }
    }

    #[test]
    fn parse_log_reports_residues_and_colors() {
        let mut fx = Fixture::new(RecordingStage::manual());
        let _ = fx.load(ALA_HOH);
        let events = fx.transport.events();
        assert_eq!(events.len(), 1);
        let crate::bridge::ViewEvent::Log { message, data } = &events[0] else {
            panic!("log event expected");
        };
        assert_eq!(message, "structure parsed");
        assert_eq!(data["residues"], json!(["ALA", "HOH"]));
        assert_eq!(data["colors"]["HOH"], json!("hsl(180, 70%, 50%)"));
        assert_eq!(data["colors"]["*"], json!("#ffffff"));
    }

    #[test]
    fn reload_replaces_previous_representations() {
        let mut fx = Fixture::new(RecordingStage::new());
        let _ = fx.load(ALA_HOH);
        let _ = fx.drain();
        let first = fx.scene.component().unwrap();

        let _ = fx.load(GLY_SER_TRP);
        // Torn down immediately, before the new load resolves.
        assert_eq!(fx.scene.state(), SceneState::Empty);
        assert!(!fx.stage.live_components().contains(&first));

        let _ = fx.drain();
        let second = fx.scene.component().unwrap();
        assert_eq!(fx.stage.live_components(), vec![second]);
        assert_eq!(
            residue_names_of(&fx.stage, second),
            vec!["GLY", "SER", "TRP"]
        );
        assert_eq!(fx.stage.representation_count(), 3);
    }

    #[test]
    fn superseded_load_resolving_last_is_discarded() {
        let mut fx = Fixture::new(RecordingStage::manual());
        let slow = fx.load(ALA_HOH);
        let fast = fx.load(GLY_SER_TRP);
        assert_eq!(fx.stage.pending_generations(), vec![slow, fast]);

        fx.stage.resolve(fast);
        fx.stage.resolve(slow);
        let completions = fx.drain();

        let component = fx.scene.component().unwrap();
        assert_eq!(
            completions,
            vec![Completion::Loaded(component), Completion::Stale]
        );
        assert_eq!(fx.stage.live_components(), vec![component]);
        assert_eq!(
            residue_names_of(&fx.stage, component),
            vec!["GLY", "SER", "TRP"]
        );
    }

    #[test]
    fn superseded_load_resolving_first_is_discarded() {
        let mut fx = Fixture::new(RecordingStage::manual());
        let slow = fx.load(ALA_HOH);
        let fast = fx.load(GLY_SER_TRP);

        fx.stage.resolve(slow);
        assert_eq!(fx.drain(), vec![Completion::Stale]);
        assert_eq!(fx.scene.state(), SceneState::Empty);
        assert!(fx.stage.live_components().is_empty());

        fx.stage.resolve(fast);
        let _ = fx.drain();
        let component = fx.scene.component().unwrap();
        assert_eq!(fx.stage.live_components(), vec![component]);
        assert_eq!(fx.stage.representation_count(), 3);
    }

    #[test]
    fn failed_load_stays_empty_and_reports() {
        let mut stage = RecordingStage::new();
        stage.reject_loads = true;
        let mut fx = Fixture::new(stage);
        let _ = fx.load(ALA_HOH);
        let completions = fx.drain();

        assert!(matches!(completions.as_slice(), [Completion::Failed(_)]));
        assert_eq!(fx.scene.state(), SceneState::Empty);
        assert_eq!(fx.scene.pending_generation(), None);
        assert!(fx.stage.auto_views.is_empty());
        assert_eq!(
            fx.transport.log_messages(),
            vec!["structure parsed", "structure load failed"]
        );
        let events = fx.transport.events();
        let crate::bridge::ViewEvent::Log { data, .. } = &events[1] else {
            panic!("log event expected");
        };
        assert_eq!(data["operation"], json!("load_structure"));
        assert_eq!(data["error"], json!("bad text"));
    }

    #[test]
    fn stale_failure_does_not_disturb_current_load() {
        let mut fx = Fixture::new(RecordingStage::manual());
        let first = fx.load(ALA_HOH);
        let second = fx.load(GLY_SER_TRP);
        fx.stage.reject(first);
        assert_eq!(fx.drain(), vec![Completion::Stale]);
        assert_eq!(fx.scene.pending_generation(), Some(second));
    }

    #[test]
    fn representation_failure_never_leaves_half_loaded_scene() {
        let mut stage = RecordingStage::new();
        stage.fail_add_after = Some(1);
        let mut fx = Fixture::new(stage);
        let _ = fx.load(ALA_HOH);
        let completions = fx.drain();

        assert!(matches!(completions.as_slice(), [Completion::Failed(_)]));
        assert_eq!(fx.scene.state(), SceneState::Empty);
        assert!(fx.stage.live_components().is_empty());
    }

    #[test]
    fn cleanup_failures_do_not_block_a_new_load() {
        let mut fx = Fixture::new(RecordingStage::new());
        let _ = fx.load(ALA_HOH);
        let _ = fx.drain();

        fx.stage.fail_removals = true;
        let _ = fx.load(GLY_SER_TRP);
        let completions = fx.drain();
        let component = fx.scene.component().unwrap();
        assert_eq!(completions, vec![Completion::Loaded(component)]);
        assert_eq!(fx.scene.residues(), ["GLY", "SER", "TRP"]);
    }

    #[test]
    fn unload_abandons_pending_load() {
        let mut fx = Fixture::new(RecordingStage::manual());
        let generation = fx.load(ALA_HOH);
        assert!(!fx.scene.unload(&mut fx.stage));
        fx.stage.resolve(generation);
        assert_eq!(fx.drain(), vec![Completion::Stale]);
        assert!(fx.stage.live_components().is_empty());
    }

    #[test]
    fn unload_releases_loaded_structure() {
        let mut fx = Fixture::new(RecordingStage::new());
        let _ = fx.load(ALA_HOH);
        let _ = fx.drain();
        assert!(fx.scene.unload(&mut fx.stage));
        assert_eq!(fx.scene.state(), SceneState::Empty);
        assert!(fx.scene.representations().is_empty());
        assert!(fx.stage.live_components().is_empty());
    }

    #[test]
    fn text_without_atoms_loads_with_no_representations() {
        let mut fx = Fixture::new(RecordingStage::new());
        let _ = fx.load("HEADER    EMPTY\nEND\n");
        let _ = fx.drain();
        assert_eq!(fx.scene.state(), SceneState::Loaded);
        assert!(fx.scene.representations().is_empty());
        assert_eq!(fx.scene.color_map().unwrap().residue_count(), 0);
    }

    #[test]
    fn auto_view_can_be_disabled() {
        let mut fx = Fixture::new(RecordingStage::new());
        fx.options.display.auto_view = false;
        let _ = fx.load(ALA_HOH);
        let _ = fx.drain();
        assert!(fx.stage.auto_views.is_empty());
    }

    #[test]
    fn stall_warning_fires_once() {
        let mut fx = Fixture::new(RecordingStage::manual());
        fx.options.scene.stall_warning_secs = 0.0;
        assert!(!fx.scene.check_stall(&fx.options));
        let _ = fx.load(ALA_HOH);
        assert!(fx.scene.check_stall(&fx.options));
        assert!(!fx.scene.check_stall(&fx.options));
    }
}

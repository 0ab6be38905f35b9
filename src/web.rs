//! Browser target: drives an NGL `Stage` from Rust and talks to the host
//! through `window.ipc.postMessage`.
//!
//! ```js
//! import init, { WebView } from "./molview.js";
//! await init();
//! const view = new WebView(new NGL.Stage("viewport"));
//! view.connect();
//! window.__molview_dispatch = (json) => view.dispatch(json);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Array, Function, Object, Promise, Reflect};
use rustc_hash::FxHashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::bridge::HostTransport;
use crate::color::Color;
use crate::error::{StageError, TransportError};
use crate::options::Options;
use crate::picking::RawPick;
use crate::stage::{
    ComponentId, LoadRequest, PickTarget, RepresentationId, RepresentationSpec,
    Stage,
};
use crate::view::MolView;

// ── JS helpers ───────────────────────────────────────────────────────────

fn get(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

fn call_method(
    target: &JsValue,
    name: &str,
    args: &Array,
) -> Result<JsValue, JsValue> {
    let method: Function = get(target, name)?.dyn_into()?;
    Reflect::apply(&method, target, args)
}

/// Best-effort message text for a thrown JS value.
fn js_message(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| get(err, "message").ok().and_then(|m| m.as_string()))
        .unwrap_or_else(|| format!("{err:?}"))
}

fn stage_error(operation: &'static str) -> impl Fn(JsValue) -> StageError {
    move |err| StageError::new(operation, js_message(&err))
}

// ── NGL stage ────────────────────────────────────────────────────────────

/// JS objects behind the ids handed to the controllers.
#[derive(Default)]
struct Registry {
    next_id: u32,
    components: FxHashMap<u32, JsValue>,
    /// Representation id -> (owning component id, JS object).
    representations: FxHashMap<u32, (u32, JsValue)>,
}

impl Registry {
    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_component(&mut self, component: JsValue) -> u32 {
        let id = self.alloc();
        let _ = self.components.insert(id, component);
        id
    }

    fn insert_representation(&mut self, owner: u32, repr: JsValue) -> u32 {
        let id = self.alloc();
        let _ = self.representations.insert(id, (owner, repr));
        id
    }

    fn component(
        &self,
        id: ComponentId,
        operation: &'static str,
    ) -> Result<JsValue, StageError> {
        self.components
            .get(&id.0)
            .cloned()
            .ok_or_else(|| StageError::new(operation, "unknown component"))
    }
}

/// [`Stage`] over an NGL `Stage` JavaScript object.
pub struct NglStage {
    stage: JsValue,
    registry: Rc<RefCell<Registry>>,
    on_settled: Option<Rc<dyn Fn()>>,
    stall_check_ms: Option<i32>,
}

impl NglStage {
    /// Wrap an `NGL.Stage` instance.
    #[must_use]
    pub fn new(stage: JsValue) -> Self {
        Self {
            stage,
            registry: Rc::default(),
            on_settled: None,
            stall_check_ms: None,
        }
    }

    /// Callback run after each asynchronous load settles, so the owner can
    /// drain the completion queue.
    pub fn set_on_settled(&mut self, callback: Rc<dyn Fn()>) {
        self.on_settled = Some(callback);
    }

    /// Also run the settle callback this many milliseconds after each
    /// load starts, so a load that never settles is still noticed.
    pub fn set_stall_check(&mut self, millis: i32) {
        self.stall_check_ms = Some(millis);
    }

    fn schedule_stall_check(&self, generation: u64) {
        let (Some(millis), Some(on_settled)) =
            (self.stall_check_ms, self.on_settled.clone())
        else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move || on_settled());
        if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            millis,
        ) {
            log::warn!(
                "no stall check for load {generation}: {}",
                js_message(&e)
            );
        }
    }

    fn load_promise(&self, text: &str, extension: &str) -> Result<Promise, JsValue> {
        let parts = Array::of1(&JsValue::from_str(text));
        let blob = web_sys::Blob::new_with_str_sequence(&parts)?;
        let params = Object::new();
        set(&params, "ext", &JsValue::from_str(extension))?;
        call_method(&self.stage, "loadFile", &Array::of2(&blob, &params))?
            .dyn_into()
    }
}

impl Stage for NglStage {
    fn load_structure(&mut self, request: LoadRequest) {
        let LoadRequest {
            generation,
            text,
            extension,
            completer,
        } = request;
        let promise = self.load_promise(&text, &extension);
        self.schedule_stall_check(generation);
        let registry = Rc::clone(&self.registry);
        let on_settled = self.on_settled.clone();
        spawn_local(async move {
            let loaded = match promise {
                Ok(promise) => JsFuture::from(promise).await,
                Err(e) => Err(e),
            };
            log::debug!("NGL load {generation} settled");
            let result = loaded
                .map(|component| {
                    ComponentId(registry.borrow_mut().insert_component(component))
                })
                .map_err(stage_error("load_structure"));
            completer.complete(result);
            if let Some(on_settled) = on_settled {
                on_settled();
            }
        });
    }

    fn add_representation(
        &mut self,
        component: ComponentId,
        spec: &RepresentationSpec,
    ) -> Result<RepresentationId, StageError> {
        const OP: &str = "add_representation";
        let target = self.registry.borrow().component(component, OP)?;
        let params = Object::new();
        let color = Color::Rgb(spec.color.to_rgb()).to_css();
        set(&params, "name", &JsValue::from_str(&spec.name))
            .and_then(|()| {
                set(&params, "sele", &JsValue::from_str(&spec.selection.to_string()))
            })
            .and_then(|()| set(&params, "color", &JsValue::from_str(&color)))
            .and_then(|()| match spec.radius_scale {
                Some(scale) => {
                    set(&params, "radiusScale", &JsValue::from_f64(f64::from(scale)))
                }
                None => Ok(()),
            })
            .map_err(stage_error(OP))?;
        let repr = call_method(
            &target,
            "addRepresentation",
            &Array::of2(&JsValue::from_str(spec.kind.ngl_name()), &params),
        )
        .map_err(stage_error(OP))?;
        let id = self
            .registry
            .borrow_mut()
            .insert_representation(component.0, repr);
        Ok(RepresentationId(id))
    }

    fn remove_representation(
        &mut self,
        component: ComponentId,
        representation: RepresentationId,
    ) -> Result<(), StageError> {
        const OP: &str = "remove_representation";
        let mut registry = self.registry.borrow_mut();
        let target = registry.component(component, OP)?;
        let (_, repr) = registry
            .representations
            .remove(&representation.0)
            .ok_or_else(|| StageError::new(OP, "unknown representation"))?;
        drop(registry);
        call_method(&target, "removeRepresentation", &Array::of1(&repr))
            .map(|_| ())
            .map_err(stage_error(OP))
    }

    fn remove_all_representations(
        &mut self,
        component: ComponentId,
    ) -> Result<(), StageError> {
        const OP: &str = "remove_all_representations";
        let mut registry = self.registry.borrow_mut();
        let target = registry.component(component, OP)?;
        registry
            .representations
            .retain(|_, (owner, _)| *owner != component.0);
        drop(registry);
        call_method(&target, "removeAllRepresentations", &Array::new())
            .map(|_| ())
            .map_err(stage_error(OP))
    }

    fn remove_component(
        &mut self,
        component: ComponentId,
    ) -> Result<(), StageError> {
        const OP: &str = "remove_component";
        let mut registry = self.registry.borrow_mut();
        let target = registry
            .components
            .remove(&component.0)
            .ok_or_else(|| StageError::new(OP, "unknown component"))?;
        registry
            .representations
            .retain(|_, (owner, _)| *owner != component.0);
        drop(registry);
        call_method(&self.stage, "removeComponent", &Array::of1(&target))
            .map(|_| ())
            .map_err(stage_error(OP))
    }

    fn auto_view(&mut self, component: ComponentId) {
        let result = self
            .registry
            .borrow()
            .component(component, "auto_view")
            .and_then(|target| {
                call_method(&target, "autoView", &Array::new())
                    .map_err(stage_error("auto_view"))
            });
        if let Err(e) = result {
            log::warn!("{e}");
        }
    }
}

/// Translate an NGL picking proxy into a [`PickTarget`].
fn pick_target(proxy: &JsValue) -> PickTarget {
    if proxy.is_undefined() || proxy.is_null() {
        return PickTarget::None;
    }
    let atom = get(proxy, "atom").unwrap_or(JsValue::UNDEFINED);
    if atom.is_undefined() || atom.is_null() {
        let kind = get(proxy, "type")
            .ok()
            .and_then(|t| t.as_string())
            .unwrap_or_else(|| "object".to_owned());
        return PickTarget::Other(kind);
    }
    let text = |key: &str| get(&atom, key).ok().and_then(|v| v.as_string());
    let number = |key: &str| get(&atom, key).ok().and_then(|v| v.as_f64());
    RawPick {
        chain: text("chainname"),
        resno: number("resno"),
        resname: text("resname"),
        atomname: text("atomname"),
        serial: number("serial"),
    }
    .resolve()
}

// ── Host transport ───────────────────────────────────────────────────────

/// Posts events to the embedding webview's `window.ipc` handler.
pub struct IpcTransport {
    ipc: JsValue,
}

impl IpcTransport {
    /// Bind to `window.ipc`; fails with [`TransportError::Detached`] when
    /// the page is not hosted.
    pub fn connect() -> Result<Self, TransportError> {
        let window = web_sys::window().ok_or(TransportError::Detached)?;
        let ipc = get(&window, "ipc").map_err(|_| TransportError::Detached)?;
        if ipc.is_undefined() || ipc.is_null() {
            return Err(TransportError::Detached);
        }
        Ok(Self { ipc })
    }
}

impl HostTransport for IpcTransport {
    fn post(&self, json: &str) -> Result<(), TransportError> {
        call_method(&self.ipc, "postMessage", &Array::of1(&JsValue::from_str(json)))
            .map(|_| ())
            .map_err(|e| TransportError::Rejected(js_message(&e)))
    }
}

// ── Exported view ────────────────────────────────────────────────────────

/// Install the console logger and panic hook.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

fn pump(view: &Weak<RefCell<MolView<NglStage>>>) {
    let Some(view) = view.upgrade() else {
        return;
    };
    match view.try_borrow_mut() {
        Ok(mut view) => {
            let _ = view.pump();
        }
        // Left queued for the next pump.
        Err(_) => log::debug!("view busy; deferring load completion"),
    };
}

/// A molview instance bound to an NGL stage, exported to JavaScript.
#[wasm_bindgen]
pub struct WebView {
    view: Rc<RefCell<MolView<NglStage>>>,
    _on_click: Closure<dyn FnMut(JsValue)>,
}

#[wasm_bindgen]
impl WebView {
    /// Wrap `stage` (an `NGL.Stage`), optionally configured by a TOML
    /// options preset.
    #[wasm_bindgen(constructor)]
    pub fn new(
        stage: JsValue,
        options_toml: Option<String>,
    ) -> Result<Self, JsValue> {
        let options = match options_toml {
            Some(toml) => Options::from_toml_str(&toml)
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Options::default(),
        };
        let view = Rc::new(RefCell::new(MolView::new(
            NglStage::new(stage.clone()),
            options,
        )));

        let weak = Rc::downgrade(&view);
        {
            let mut view = view.borrow_mut();
            let stall_check_ms = view.options().scene.stall_check_millis();
            let stage = view.stage_mut();
            stage.set_on_settled(Rc::new(move || pump(&weak)));
            stage.set_stall_check(stall_check_ms);
        }

        let weak = Rc::downgrade(&view);
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |proxy: JsValue| {
            if let Some(view) = weak.upgrade() {
                let _ = view.borrow_mut().on_click(&pick_target(&proxy));
            }
        });
        let clicked = get(&get(&stage, "signals")?, "clicked")?;
        let _ = call_method(&clicked, "add", &Array::of1(on_click.as_ref()))?;

        Ok(Self {
            view,
            _on_click: on_click,
        })
    }

    /// Connect to the host's IPC channel. Returns `false` when the page has
    /// no host; events then go to the console.
    pub fn connect(&self) -> bool {
        match IpcTransport::connect() {
            Ok(transport) => {
                self.view.borrow_mut().attach(Box::new(transport));
                true
            }
            Err(e) => {
                log::info!("{e}");
                false
            }
        }
    }

    /// Execute a JSON-encoded host command.
    pub fn dispatch(&self, json: &str) -> Result<(), JsValue> {
        self.view
            .borrow_mut()
            .dispatch_json(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Display PDB text.
    pub fn load(&self, text: String) {
        let _ = self.view.borrow_mut().load(text);
    }

    /// Highlight atoms by 1-based serial; an empty list clears.
    #[wasm_bindgen(js_name = setHighlight)]
    pub fn set_highlight(&self, serials: Vec<u32>) {
        let _ = self.view.borrow_mut().set_highlight(&serials);
    }

    /// Remove the displayed structure.
    pub fn unload(&self) {
        let _ = self.view.borrow_mut().unload();
    }
}

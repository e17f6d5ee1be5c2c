// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Host API for embedding the DAE Stage editor in a web page.
//!
//! [`EditorHandle`] wraps a [`dae_scene::Editor`] and exposes the transform API
//! a host page drives: load a COLLADA document, set scale/position/rotation,
//! read the transform back, feed pointer input (handle drags, orbiting, mode
//! cycling), and subscribe to transform changes. In the browser a `StageView`
//! draws the editor's sky, grid and model into a WebGL2 canvas, and
//! [`EditorHandle::overlay`] gives the page the grid labels and handles to
//! paint on top.
//!
//! The host owns the clock. Call [`EditorHandle::tick`] once per animation
//! frame with the page's timestamp; it polls watchers and reports whether a
//! redraw is due. Transform setters schedule their redraw relative to the last
//! tick.
//!
//! Watchers run after the editor is released: `tick` collects the snapshots
//! first and then calls each watcher, so a watcher may call back into the
//! handle (`state`, `unwatch`, `scale`, ...). A watcher removed during a tick
//! receives nothing further from it.
//!
//! Built with `--features wasm` the handle is exported through `wasm-bindgen`
//! with camelCase method names. Without it, the same API (plus JSON helpers)
//! is available natively so it can be tested with `cargo test`.

pub mod overlay;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod view;

use dae_scene::{watch::WatchId, Editor, LoadOptions, ModelError, TransformState};
use glam::Vec2;
use overlay::Overlay;
use serde::Deserialize;
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// Failures surfaced to the host.
#[derive(Debug, Error)]
pub enum HostError {
    /// The options object could not be decoded.
    #[error("invalid load options: {0}")]
    Options(String),
    /// The document could not be turned into a model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Load options as hosts spell them. Every field is optional.
///
/// ```json
/// { "scale": 2, "rotation": [0, 90, 0], "position": [0, 0, 5],
///   "convertUpAxis": true, "recenter": false, "source": "duck.dae" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostLoadOptions {
    /// Uniform scale.
    pub scale: f32,
    /// Rotation in degrees.
    pub rotation: [f32; 3],
    /// World position.
    pub position: [f32; 3],
    /// Rotate Z-up/X-up documents into Y-up.
    pub convert_up_axis: bool,
    /// Centre the mesh on its origin.
    pub recenter: bool,
    /// Label shown for the model (usually the file name).
    pub source: Option<String>,
}

impl Default for HostLoadOptions {
    fn default() -> Self {
        let d = LoadOptions::default();
        Self {
            scale: d.scale,
            rotation: d.rotation,
            position: d.position,
            convert_up_axis: d.convert_up_axis,
            recenter: d.recenter,
            source: None,
        }
    }
}

impl From<&HostLoadOptions> for LoadOptions {
    fn from(o: &HostLoadOptions) -> Self {
        Self {
            scale: o.scale,
            rotation: o.rotation,
            position: o.position,
            convert_up_axis: o.convert_up_axis,
            recenter: o.recenter,
        }
    }
}

/// Host timestamp (milliseconds) to editor time. Negative or non-finite
/// stamps read as zero; stamps past `Duration::MAX` saturate.
fn millis(now_ms: f64) -> Duration {
    if now_ms.is_finite() && now_ms > 0.0 {
        Duration::try_from_secs_f64(now_ms / 1000.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

type HostListener = Rc<RefCell<dyn FnMut(&TransformState)>>;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pointer {
    cursor: Option<Vec2>,
    orbiting: bool,
    viewport: Vec2,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            cursor: None,
            orbiting: false,
            viewport: Vec2::ONE,
        }
    }
}

/// Editor instance owned by a host page.
///
/// Every method takes `&self`, so calls made from inside a watcher are
/// accepted by the bindings instead of being rejected as re-entrant.
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub struct EditorHandle {
    editor: RefCell<Editor>,
    now: Cell<Duration>,
    pointer: Cell<Pointer>,
    listeners: RefCell<BTreeMap<u32, HostListener>>,
    pending: Rc<RefCell<Vec<(WatchId, TransformState)>>>,
}

impl Default for EditorHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(feature = "wasm", wasm_bindgen)]
impl EditorHandle {
    /// Fresh editor: empty scene with grid and sky, no model.
    #[cfg_attr(feature = "wasm", wasm_bindgen(constructor))]
    pub fn new() -> Self {
        Self {
            editor: RefCell::new(Editor::new()),
            now: Cell::new(Duration::ZERO),
            pointer: Cell::new(Pointer::default()),
            listeners: RefCell::new(BTreeMap::new()),
            pending: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Uniform scale. Returns false (and does nothing) without a model.
    pub fn scale(&self, s: f32) -> bool {
        self.editor.borrow_mut().scale(s, self.now.get())
    }

    /// Move the model. Returns false without a model.
    pub fn translate(&self, x: f32, y: f32, z: f32) -> bool {
        self.editor.borrow_mut().translate(x, y, z, self.now.get())
    }

    /// Rotate the model to the given angles in degrees. Returns false without a model.
    pub fn rotate(&self, x: f32, y: f32, z: f32) -> bool {
        self.editor.borrow_mut().rotate(x, y, z, self.now.get())
    }

    /// Resize the ground grid (edge length in world units).
    pub fn grid(&self, size: f32) {
        self.editor.borrow_mut().set_grid(size);
    }

    /// Current handle mode: `"scale"`, `"rotate"` or `"translate"`.
    pub fn mode(&self) -> String {
        self.editor.borrow().mode().label().to_owned()
    }

    /// Feed a released pointer button (DOM numbering). Secondary and extra
    /// buttons advance the mode; returns the new mode name when it changed.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = cycleMode))]
    pub fn cycle_mode(&self, button: u16) -> Option<String> {
        self.editor
            .borrow_mut()
            .cycle_gizmo_mode(button)
            .map(|m| m.label().to_owned())
    }

    /// Size of the drawing area in pixels. Sets the camera aspect and the
    /// viewport used for handle picking; call it whenever the canvas resizes.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = setViewport))]
    pub fn set_viewport(&self, width: f32, height: f32) {
        let usable = width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0;
        if !usable {
            return;
        }
        let mut p = self.pointer.get();
        p.viewport = Vec2::new(width, height);
        self.pointer.set(p);
        let mut ed = self.editor.borrow_mut();
        ed.camera_mut().set_aspect(width, height);
        ed.request_redraw();
    }

    /// Pointer pressed at pixel (`x`, `y`). A primary press on a handle starts
    /// a drag and returns true; elsewhere it starts orbiting the camera.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = pointerDown))]
    pub fn pointer_down(&self, x: f32, y: f32, button: u16) -> bool {
        let mut p = self.pointer.get();
        let cursor = Vec2::new(x, y);
        p.cursor = Some(cursor);
        let mut grabbed = false;
        if button == 0 {
            let mut ed = self.editor.borrow_mut();
            grabbed = ed.begin_gizmo_drag(cursor, p.viewport);
            if grabbed {
                tracing::debug!(mode = %ed.mode(), "handle grabbed");
            } else {
                p.orbiting = ed.camera().enabled;
            }
        }
        self.pointer.set(p);
        grabbed
    }

    /// Pointer moved to pixel (`x`, `y`): follows a drag or orbits.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = pointerMove))]
    pub fn pointer_move(&self, x: f32, y: f32) {
        let mut p = self.pointer.get();
        let pos = Vec2::new(x, y);
        let prev = p.cursor.replace(pos);
        self.pointer.set(p);
        let mut ed = self.editor.borrow_mut();
        if ed.is_dragging() {
            ed.update_gizmo_drag(pos);
        } else if p.orbiting {
            if let Some(prev) = prev {
                ed.camera_mut().rotate(pos - prev);
                ed.request_redraw();
            }
        }
    }

    /// Pointer released. Primary releases end drags and orbiting; secondary
    /// and extra buttons cycle the mode, returning the new mode name.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = pointerUp))]
    pub fn pointer_up(&self, button: u16) -> Option<String> {
        if button == 0 {
            let mut p = self.pointer.get();
            p.orbiting = false;
            self.pointer.set(p);
            let mut ed = self.editor.borrow_mut();
            if ed.is_dragging() {
                ed.end_gizmo_drag();
            }
        }
        self.cycle_mode(button)
    }

    /// Dolly the camera; positive `steps` move closer.
    pub fn zoom(&self, steps: f32) {
        let mut ed = self.editor.borrow_mut();
        ed.camera_mut().zoom(steps);
        ed.request_redraw();
    }

    /// Whether a model is loaded.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = hasModel))]
    pub fn has_model(&self) -> bool {
        self.editor.borrow().model().is_some()
    }

    /// Drop the current model.
    pub fn unload(&self) {
        self.editor.borrow_mut().unload();
    }

    /// Remove a watcher registered with `watch`. Returns false for unknown ids.
    pub fn unwatch(&self, id: u32) -> bool {
        self.listeners.borrow_mut().remove(&id);
        self.editor.borrow_mut().unwatch(WatchId(id))
    }

    /// Advance the host clock to `now_ms`, notify watchers of transform
    /// changes, and report whether the scene should be redrawn.
    pub fn tick(&self, now_ms: f64) -> bool {
        let now = self.now.get().max(millis(now_ms));
        self.now.set(now);
        let frame = self.editor.borrow_mut().tick(now);
        self.deliver();
        frame.redraw
    }

    /// Transform as a JSON string (rotations in radians); `None` without a model.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = stateJson))]
    pub fn state_json(&self) -> Option<String> {
        let state = self.state()?;
        match serde_json::to_string(&state) {
            Ok(s) => Some(s),
            Err(err) => {
                tracing::warn!(%err, "state serialisation failed");
                None
            }
        }
    }

    /// [`overlay`](Self::overlay) as a JSON string.
    #[cfg_attr(feature = "wasm", wasm_bindgen(js_name = overlayJson))]
    pub fn overlay_json(&self) -> String {
        serde_json::to_string(&self.overlay()).unwrap_or_else(|err| {
            tracing::warn!(%err, "overlay serialisation failed");
            String::from("{}")
        })
    }
}

impl EditorHandle {
    /// Load a COLLADA document with options given as JSON (`""` for defaults).
    /// The current model is dropped first, so on failure none is loaded.
    pub fn load_json(&self, bytes: &[u8], options_json: &str) -> Result<(), HostError> {
        let opts = if options_json.trim().is_empty() {
            HostLoadOptions::default()
        } else {
            serde_json::from_str(options_json).map_err(|e| HostError::Options(e.to_string()))?
        };
        self.load_with(bytes, &opts)
    }

    /// Load a COLLADA document with decoded options.
    pub fn load_with(&self, bytes: &[u8], opts: &HostLoadOptions) -> Result<(), HostError> {
        self.editor
            .borrow_mut()
            .load_collada(bytes, opts.source.clone(), &opts.into(), self.now.get())?;
        tracing::info!(
            source = opts.source.as_deref().unwrap_or("<bytes>"),
            "model loaded"
        );
        Ok(())
    }

    /// Transform with rotations in radians, or `None` without a model.
    pub fn state(&self) -> Option<TransformState> {
        self.editor.borrow().state()
    }

    /// Register a watcher. It receives display snapshots (degrees in `[0, 360)`)
    /// from `tick` whenever the transform changes, starting with the current one.
    pub fn watch(&self, listener: impl FnMut(&TransformState) + 'static) -> u32 {
        let tag = Rc::new(Cell::new(WatchId(0)));
        let (pending, sink_tag) = (Rc::clone(&self.pending), Rc::clone(&tag));
        let id = self
            .editor
            .borrow_mut()
            .watch(move |s| pending.borrow_mut().push((sink_tag.get(), *s)));
        tag.set(id);
        let listener: HostListener = Rc::new(RefCell::new(listener));
        self.listeners.borrow_mut().insert(id.0, listener);
        id.0
    }

    /// Like [`watch`](Self::watch), but hands the listener JSON.
    pub fn watch_json(&self, mut listener: impl FnMut(String) + 'static) -> u32 {
        self.watch(move |s| match serde_json::to_string(s) {
            Ok(json) => listener(json),
            Err(err) => tracing::warn!(%err, "state serialisation failed"),
        })
    }

    /// Grid labels and handles projected into the viewport set by
    /// [`set_viewport`](Self::set_viewport).
    pub fn overlay(&self) -> Overlay {
        Overlay::build(&self.editor.borrow(), self.pointer.get().viewport)
    }

    /// The wrapped editor, for renderers. Release the guard before calling
    /// any other method.
    pub fn editor(&self) -> Ref<'_, Editor> {
        self.editor.borrow()
    }

    /// Hand queued snapshots to their watchers with no borrow held.
    fn deliver(&self) {
        let batch = std::mem::take(&mut *self.pending.borrow_mut());
        for (id, snapshot) in batch {
            let listener = self.listeners.borrow().get(&id.0).cloned();
            let Some(listener) = listener else {
                continue;
            };
            let Ok(mut call) = listener.try_borrow_mut() else {
                tracing::warn!(id = id.0, "watcher re-entered from its own callback; snapshot skipped");
                continue;
            };
            (*call)(&snapshot);
        }
    }
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl EditorHandle {
    /// Load a COLLADA document. `options` is an object shaped like
    /// [`HostLoadOptions`]; `undefined`/`null` means defaults.
    #[wasm_bindgen(js_name = load)]
    pub fn load_js(&self, bytes: &[u8], options: JsValue) -> Result<(), JsError> {
        let opts = if options.is_undefined() || options.is_null() {
            HostLoadOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)
                .map_err(|e| JsError::from(HostError::Options(e.to_string())))?
        };
        self.load_with(bytes, &opts).map_err(JsError::from)
    }

    /// Transform as `{ scale, position: {x,y,z}, rotation: {x,y,z} }` with
    /// rotations in radians, or `undefined` without a model.
    #[wasm_bindgen(js_name = state)]
    pub fn state_js(&self) -> JsValue {
        self.state()
            .and_then(|s| serde_wasm_bindgen::to_value(&s).ok())
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// `{ mode, labels: [{x, y, text}], handles: [{axis, color, start, end}] }`
    /// in canvas pixels.
    #[wasm_bindgen(js_name = overlay)]
    pub fn overlay_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.overlay()).unwrap_or(JsValue::UNDEFINED)
    }

    /// Register `callback(state)`; rotations arrive in degrees. Returns an id
    /// for `unwatch`. The callback runs after `tick` has released the editor
    /// and may call any method of this handle.
    #[wasm_bindgen(js_name = watch)]
    pub fn watch_js(&self, callback: js_sys::Function) -> u32 {
        self.watch(move |s| {
            let Ok(value) = serde_wasm_bindgen::to_value(s) else {
                return;
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                tracing::warn!(?err, "state watcher threw");
            }
        })
    }
}

/// Install the console panic hook for readable panics in the browser.
#[cfg(feature = "console-panic")]
#[wasm_bindgen(start)]
pub fn init_console_panic_hook() {
    console_error_panic_hook::set_once();
    web_sys::console::debug_1(&JsValue::from_str("dae-wasm ready"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_options_fill_missing_fields_with_defaults() {
        let o: HostLoadOptions = serde_json::from_str(r#"{"scale": 2, "convertUpAxis": false}"#)
            .unwrap();
        assert_eq!(o.scale, 2.0);
        assert!(!o.convert_up_axis);
        assert_eq!(o.rotation, [0.0; 3]);
        assert!(o.source.is_none());
    }

    #[test]
    fn clock_never_runs_backwards() {
        let h = EditorHandle::new();
        h.tick(500.0);
        h.tick(100.0);
        assert_eq!(h.now.get(), Duration::from_millis(500));
        h.tick(f64::NAN);
        assert_eq!(h.now.get(), Duration::from_millis(500));
    }

    #[test]
    fn huge_timestamps_saturate_instead_of_panicking() {
        assert_eq!(millis(1e300), Duration::MAX);
        assert_eq!(millis(f64::INFINITY), Duration::ZERO);
        assert_eq!(millis(-5.0), Duration::ZERO);
        assert_eq!(millis(1_500.0), Duration::from_millis(1_500));

        let h = EditorHandle::new();
        h.tick(1e300);
        assert_eq!(h.now.get(), Duration::MAX);
    }

    #[test]
    fn bad_options_are_reported_not_ignored() {
        let h = EditorHandle::new();
        let err = h.load_json(b"", "{ nope").unwrap_err();
        assert!(matches!(err, HostError::Options(_)));
    }
}

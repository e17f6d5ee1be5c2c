// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Editor session: the loaded model plus everything hosts drive it through.
//!
//! Hosts call the transform API (`scale`, `translate`, `rotate`, `state`),
//! forward pointer input (mode cycling, handle drags) and call [`Editor::tick`]
//! once per frame. The tick runs state polling and reports whether a redraw
//! is due; rendering itself belongs to the host.
//!
//! Time is always passed in as a `Duration` since host start.

use crate::{
    camera::OrbitCamera,
    gizmo::{cycles_mode, DragSession, Gizmo, GizmoHandles, GizmoMode},
    grid::Grid,
    model::{LoadOptions, ModelError, ModelMesh},
    redraw::{RedrawSchedule, TRANSFORM_REDRAW_DELAY},
    sky::SkyParams,
    state::TransformState,
    transform::ModelTransform,
    watch::{StateWatcher, WatchId},
};
use glam::{Vec2, Vec3};
use std::time::Duration;

/// The model currently attached to the scene.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// Geometry.
    pub mesh: ModelMesh,
    /// Placement.
    pub transform: ModelTransform,
    /// Where the model came from (path or host-supplied name).
    pub source: Option<String>,
}

/// Outcome of one [`Editor::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTick {
    /// A redraw is due.
    pub redraw: bool,
    /// State listeners were notified.
    pub notified: bool,
}

/// Editor session state.
pub struct Editor {
    model: Option<LoadedModel>,
    generation: u64,
    grid: Grid,
    sky: SkyParams,
    camera: OrbitCamera,
    gizmo: Gizmo,
    mode: GizmoMode,
    drag: Option<DragSession>,
    watcher: StateWatcher,
    redraw: RedrawSchedule,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Empty scene: default camera, 100-unit grid, default sky.
    pub fn new() -> Self {
        let mut redraw = RedrawSchedule::default();
        redraw.request_now();
        Self {
            model: None,
            generation: 0,
            grid: Grid::default(),
            sky: SkyParams::default(),
            camera: OrbitCamera::default(),
            gizmo: Gizmo::default(),
            mode: GizmoMode::default(),
            drag: None,
            watcher: StateWatcher::default(),
            redraw,
        }
    }

    // --- model -----------------------------------------------------------

    /// Attach `mesh`, replacing any loaded model, and place it per `options`.
    pub fn load(
        &mut self,
        mut mesh: ModelMesh,
        source: Option<String>,
        options: &LoadOptions,
        now: Duration,
    ) {
        if options.recenter {
            mesh.recenter();
        }
        let mut transform = ModelTransform::IDENTITY;
        transform.set_uniform_scale(options.scale);
        let [rx, ry, rz] = options.rotation;
        transform.set_rotation_degrees(rx, ry, rz);
        let [px, py, pz] = options.position;
        transform.set_position(px, py, pz);

        tracing::info!(
            source = source.as_deref().unwrap_or("<memory>"),
            triangles = mesh.triangle_count(),
            "model attached"
        );
        self.cancel_drag();
        self.model = Some(LoadedModel {
            mesh,
            transform,
            source,
        });
        self.generation += 1;
        self.redraw.request_at(now.saturating_add(TRANSFORM_REDRAW_DELAY));
    }

    /// Parse a COLLADA document and attach it.
    ///
    /// The current model is detached before parsing starts, so a document
    /// that fails to parse leaves the scene empty.
    pub fn load_collada(
        &mut self,
        bytes: &[u8],
        source: Option<String>,
        options: &LoadOptions,
        now: Duration,
    ) -> Result<(), ModelError> {
        self.unload();
        let mesh = ModelMesh::from_collada_bytes(bytes, options.convert_up_axis)?;
        self.load(mesh, source, options, now);
        Ok(())
    }

    /// Detach the model.
    pub fn unload(&mut self) {
        if self.model.take().is_some() {
            self.cancel_drag();
            self.generation += 1;
            self.redraw.request_now();
        }
    }

    /// Loaded model, if any.
    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    /// Bumped whenever the attached geometry changes; renderers re-upload on change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // --- transform API ---------------------------------------------------

    /// Uniform scale. Returns false when no model is loaded.
    pub fn scale(&mut self, s: f32, now: Duration) -> bool {
        self.edit(now, |t| t.set_uniform_scale(s))
    }

    /// Move the model. Returns false when no model is loaded.
    pub fn translate(&mut self, x: f32, y: f32, z: f32, now: Duration) -> bool {
        self.edit(now, |t| t.set_position(x, y, z))
    }

    /// Rotate the model to the given angles in degrees. Returns false when no model is loaded.
    pub fn rotate(&mut self, x: f32, y: f32, z: f32, now: Duration) -> bool {
        self.edit(now, |t| t.set_rotation_degrees(x, y, z))
    }

    /// Current transform with rotations in radians, or `None` without a model.
    pub fn state(&self) -> Option<TransformState> {
        self.model.as_ref().map(|m| TransformState::raw(&m.transform))
    }

    fn edit(&mut self, now: Duration, f: impl FnOnce(&mut ModelTransform)) -> bool {
        let Some(model) = self.model.as_mut() else {
            return false;
        };
        f(&mut model.transform);
        tracing::debug!(transform = ?model.transform, "transform set");
        self.redraw.request_at(now.saturating_add(TRANSFORM_REDRAW_DELAY));
        true
    }

    // --- scene -----------------------------------------------------------

    /// Replace the ground grid with one of edge length `size`.
    pub fn set_grid(&mut self, size: f32) {
        self.grid = Grid::new(size);
        self.redraw.request_now();
    }

    /// Ground grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Sky and sun parameters.
    pub fn sky(&self) -> &SkyParams {
        &self.sky
    }

    /// Camera.
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Mutable camera; any change should be followed by [`request_redraw`](Self::request_redraw).
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// Redraw on the next frame.
    pub fn request_redraw(&mut self) {
        self.redraw.request_now();
    }

    /// Deadline of the pending redraw, so hosts can sleep until it.
    pub fn next_redraw(&self) -> Option<Duration> {
        self.redraw.pending()
    }

    // --- gizmo -----------------------------------------------------------

    /// Current handle mode.
    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Set the handle mode directly.
    pub fn set_mode(&mut self, mode: GizmoMode) {
        if self.mode != mode {
            self.mode = mode;
            self.redraw.request_now();
        }
    }

    /// Advance the mode if `button` (DOM numbering) is a cycling button.
    pub fn cycle_gizmo_mode(&mut self, button: u16) -> Option<GizmoMode> {
        if !cycles_mode(button) {
            return None;
        }
        self.mode = self.mode.next();
        tracing::debug!(mode = %self.mode, "gizmo mode cycled");
        self.redraw.request_now();
        Some(self.mode)
    }

    /// Projected handles for the loaded model.
    pub fn gizmo_handles(&self, viewport: Vec2) -> Option<GizmoHandles> {
        let model = self.model.as_ref()?;
        self.gizmo
            .handles(model.transform.position, &self.camera, viewport)
    }

    /// Start dragging the handle under `cursor`. Disables orbit controls on success.
    pub fn begin_gizmo_drag(&mut self, cursor: Vec2, viewport: Vec2) -> bool {
        let Some(handles) = self.gizmo_handles(viewport) else {
            return false;
        };
        let Some(axis) = self.gizmo.pick(cursor, &handles) else {
            return false;
        };
        let Some(model) = self.model.as_ref() else {
            return false;
        };
        self.drag = Some(DragSession {
            mode: self.mode,
            axis,
            anchor: cursor,
            origin: model.transform,
            handles,
        });
        self.camera.enabled = false;
        true
    }

    /// Follow the cursor during a drag.
    pub fn update_gizmo_drag(&mut self, cursor: Vec2) {
        let (Some(drag), Some(model)) = (self.drag.as_ref(), self.model.as_mut()) else {
            return;
        };
        model.transform = drag.apply(cursor);
        self.redraw.request_now();
    }

    /// Finish a drag and re-enable orbit controls.
    pub fn end_gizmo_drag(&mut self) {
        self.cancel_drag();
    }

    /// True while a handle is being dragged.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn cancel_drag(&mut self) {
        self.drag = None;
        self.camera.enabled = true;
    }

    // --- polling ---------------------------------------------------------

    /// Register a state listener; it receives display snapshots (degrees).
    pub fn watch(&mut self, listener: impl FnMut(&TransformState) + 'static) -> WatchId {
        self.watcher.watch(listener)
    }

    /// Remove a state listener.
    pub fn unwatch(&mut self, id: WatchId) -> bool {
        self.watcher.unwatch(id)
    }

    /// Per-frame step: poll state listeners and report whether a redraw is due.
    pub fn tick(&mut self, now: Duration) -> FrameTick {
        let notified = self
            .watcher
            .poll(self.model.as_ref().map(|m| &m.transform));
        FrameTick {
            redraw: self.redraw.due(now),
            notified,
        }
    }

    /// World-space centre of the loaded model's bounds after its transform.
    pub fn model_center(&self) -> Option<Vec3> {
        let model = self.model.as_ref()?;
        Some(
            model
                .transform
                .to_mat4()
                .transform_point3(model.mesh.bounds().center()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MeshPart, UpAxis};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn cube_mesh() -> ModelMesh {
        let part = MeshPart {
            positions: vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]],
            normals: Vec::new(),
            faces: vec![[0, 1, 2]],
        };
        ModelMesh::from_parts([part], UpAxis::Y).unwrap()
    }

    fn loaded() -> Editor {
        let mut ed = Editor::new();
        ed.load(cube_mesh(), Some("tri.dae".into()), &LoadOptions::default(), ms(0));
        ed.tick(ms(1000));
        ed
    }

    #[test]
    fn setters_are_noops_without_a_model() {
        let mut ed = Editor::new();
        assert!(ed.tick(ms(0)).redraw);
        assert!(!ed.scale(2.0, ms(0)));
        assert!(!ed.translate(1.0, 2.0, 3.0, ms(0)));
        assert!(!ed.rotate(90.0, 0.0, 0.0, ms(0)));
        assert!(ed.state().is_none());
        assert_eq!(ed.next_redraw(), None);
    }

    #[test]
    fn setters_schedule_a_deferred_redraw() {
        let mut ed = loaded();
        assert!(ed.translate(1.0, 2.0, 3.0, ms(2000)));
        assert!(!ed.tick(ms(2050)).redraw);
        assert!(ed.tick(ms(2100)).redraw);
        assert!(!ed.tick(ms(2200)).redraw);
    }

    #[test]
    fn state_reports_radians() {
        let mut ed = loaded();
        ed.scale(2.5, ms(0));
        ed.rotate(180.0, 0.0, 0.0, ms(0));
        let s = ed.state().unwrap();
        assert_eq!(s.scale, 2.5);
        assert_relative_eq!(s.rotation.x, std::f32::consts::PI, epsilon = 1e-5);
    }

    #[test]
    fn load_applies_options_and_bumps_generation() {
        let mut ed = Editor::new();
        let opts = LoadOptions {
            scale: 3.0,
            position: [1.0, 0.0, -1.0],
            recenter: true,
            ..LoadOptions::default()
        };
        ed.load(cube_mesh(), None, &opts, ms(0));
        assert_eq!(ed.generation(), 1);
        let s = ed.state().unwrap();
        assert_eq!(s.scale, 3.0);
        assert_eq!(s.position.z, -1.0);
        let c = ed.model().unwrap().mesh.bounds().center();
        assert_relative_eq!(c.x, 0.0);
        ed.unload();
        assert_eq!(ed.generation(), 2);
        assert!(ed.model().is_none());
    }

    #[test]
    fn failed_parse_leaves_the_scene_empty() {
        let mut ed = loaded();
        let before = ed.generation();
        let err = ed.load_collada(b"not xml", None, &LoadOptions::default(), ms(0));
        assert!(err.is_err());
        assert!(ed.model().is_none());
        assert!(ed.generation() > before);
        assert!(!ed.scale(2.0, ms(0)));
        assert!(ed.state().is_none());
    }

    #[test]
    fn edits_at_the_end_of_time_still_schedule_a_redraw() {
        let mut ed = loaded();
        assert!(ed.scale(2.0, Duration::MAX));
        assert_eq!(ed.next_redraw(), Some(Duration::MAX));
        assert!(ed.tick(Duration::MAX).redraw);
        ed.load(cube_mesh(), None, &LoadOptions::default(), Duration::MAX);
        assert!(ed.tick(Duration::MAX).redraw);
    }

    #[test]
    fn listener_registered_before_any_model_waits_for_one() {
        let mut ed = Editor::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ed.watch(move |s| sink.borrow_mut().push(*s));

        for t in 0..5 {
            assert!(!ed.tick(ms(t * 16)).notified);
        }
        assert!(seen.borrow().is_empty());

        ed.load(cube_mesh(), None, &LoadOptions::default(), ms(100));
        assert!(ed.tick(ms(116)).notified);
        assert!(!ed.tick(ms(132)).notified);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].scale, 1.0);
    }

    #[test]
    fn secondary_button_cycles_mode() {
        let mut ed = Editor::new();
        assert_eq!(ed.cycle_gizmo_mode(0), None);
        assert_eq!(ed.cycle_gizmo_mode(1), None);
        assert_eq!(ed.mode(), GizmoMode::Translate);
        assert_eq!(ed.cycle_gizmo_mode(2), Some(GizmoMode::Scale));
        assert_eq!(ed.cycle_gizmo_mode(3), Some(GizmoMode::Rotate));
        assert_eq!(ed.cycle_gizmo_mode(2), Some(GizmoMode::Translate));
    }

    #[test]
    fn dragging_a_handle_locks_the_camera() {
        let mut ed = loaded();
        let viewport = Vec2::new(800.0, 800.0);
        let handles = ed.gizmo_handles(viewport).unwrap();
        let x = *handles.get(crate::gizmo::GizmoAxis::X).unwrap();
        let grab = x.start.lerp(x.end, 0.5);

        assert!(ed.begin_gizmo_drag(grab, viewport));
        assert!(ed.is_dragging());
        assert!(!ed.camera().enabled);

        ed.update_gizmo_drag(grab + (x.end - x.start) * 0.5);
        let moved = ed.state().unwrap().position.x;
        assert_relative_eq!(moved, handles.world_length * 0.5, epsilon = 1e-2);

        ed.end_gizmo_drag();
        assert!(!ed.is_dragging());
        assert!(ed.camera().enabled);
    }

    #[test]
    fn missing_the_handles_does_not_start_a_drag() {
        let mut ed = loaded();
        assert!(!ed.begin_gizmo_drag(Vec2::new(5.0, 5.0), Vec2::new(800.0, 800.0)));
        assert!(ed.camera().enabled);
    }

    #[test]
    fn tick_notifies_watchers_with_degrees() {
        let mut ed = loaded();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = ed.watch(move |s| sink.borrow_mut().push(*s));

        assert!(ed.tick(ms(0)).notified);
        assert!(!ed.tick(ms(0)).notified);
        ed.rotate(-90.0, 0.0, 0.0, ms(0));
        assert!(ed.tick(ms(0)).notified);
        assert_relative_eq!(seen.borrow()[1].rotation.x, 270.0, epsilon = 1e-3);

        assert!(ed.unwatch(id));
        ed.translate(4.0, 0.0, 0.0, ms(0));
        assert!(!ed.tick(ms(0)).notified);
    }

    #[test]
    fn grid_resize_redraws_immediately() {
        let mut ed = loaded();
        ed.set_grid(250.0);
        assert_eq!(ed.grid().size, 250.0);
        assert!(ed.tick(ms(0)).redraw);
    }
}

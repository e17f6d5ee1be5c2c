// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Viewer runtime state (HUD flags, pointer, watch log) and prefs mapping.

use crate::perf::PerfStats;
use dae_app_core::prefs::{EditorPrefs, HudPrefs, OrbitPrefs, ScenePrefs};
use dae_scene::{camera::MAX_PITCH, Editor, LoadOptions, TransformState};
use glam::{Vec2, Vec3};
use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Instant};

/// Lines kept in the watch log panel.
const WATCH_LOG_LEN: usize = 8;

/// Shared sink the state listener writes into.
pub type WatchLog = Rc<RefCell<VecDeque<String>>>;

pub struct ViewerState {
    pub perf: PerfStats,
    pub started: Instant,
    pub last_frame: Instant,
    pub wireframe: bool,
    pub vsync: bool,
    pub show_inspector: bool,
    pub show_grid_labels: bool,
    pub convert_up_axis: bool,
    /// Options for the next load; reset to defaults after the first one.
    pub load_options: LoadOptions,
    pub last_model: Option<String>,
    pub watch_log: WatchLog,
    /// Cursor in physical pixels.
    pub cursor: Option<Vec2>,
    pub orbiting: bool,
}

impl Default for ViewerState {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            perf: PerfStats::default(),
            started: now,
            last_frame: now,
            wireframe: false,
            vsync: true,
            show_inspector: true,
            show_grid_labels: true,
            convert_up_axis: true,
            load_options: LoadOptions::default(),
            last_model: None,
            watch_log: Rc::default(),
            cursor: None,
            orbiting: false,
        }
    }
}

impl ViewerState {
    /// Time since start, the clock the editor runs on.
    pub fn now(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    /// Listener that appends each state change to the watch log.
    pub fn watch_listener(&self) -> impl FnMut(&TransformState) + 'static {
        let log = Rc::clone(&self.watch_log);
        move |s| {
            let mut log = log.borrow_mut();
            if log.len() == WATCH_LOG_LEN {
                log.pop_front();
            }
            log.push_back(format_state(s));
        }
    }

    pub fn apply_prefs(&mut self, cfg: &EditorPrefs, editor: &mut Editor) {
        let cam = &cfg.camera;
        let c = editor.camera_mut();
        if cam.target.iter().all(|v| v.is_finite()) {
            c.target = Vec3::from_array(cam.target);
        }
        if cam.distance.is_finite() && cam.distance > 0.0 {
            c.distance = cam.distance;
        }
        if cam.yaw.is_finite() {
            c.yaw = cam.yaw;
        }
        if cam.pitch.is_finite() {
            c.pitch = cam.pitch.clamp(-MAX_PITCH, MAX_PITCH);
        }
        if cam.fov_y.is_finite() {
            c.fov_y = cam.fov_y.clamp(15f32.to_radians(), 120f32.to_radians());
        }

        editor.set_grid(cfg.scene.grid_size);
        self.convert_up_axis = cfg.scene.convert_up_axis;
        self.load_options.convert_up_axis = cfg.scene.convert_up_axis;
        self.last_model.clone_from(&cfg.scene.last_model);

        let hud = &cfg.hud;
        self.show_inspector = hud.show_inspector;
        self.show_grid_labels = hud.show_grid_labels;
        self.wireframe = hud.wireframe;
        self.vsync = hud.vsync;
    }

    pub fn export_prefs(&self, editor: &Editor) -> EditorPrefs {
        let c = editor.camera();
        EditorPrefs {
            camera: OrbitPrefs {
                target: c.target.to_array(),
                distance: c.distance,
                yaw: c.yaw,
                pitch: c.pitch,
                fov_y: c.fov_y,
            },
            scene: ScenePrefs {
                grid_size: editor.grid().size,
                last_model: editor
                    .model()
                    .and_then(|m| m.source.clone())
                    .or_else(|| self.last_model.clone()),
                convert_up_axis: self.convert_up_axis,
            },
            hud: HudPrefs {
                show_inspector: self.show_inspector,
                show_grid_labels: self.show_grid_labels,
                wireframe: self.wireframe,
                vsync: self.vsync,
            },
        }
    }
}

/// One-line summary of a display snapshot (rotations in degrees).
pub fn format_state(s: &TransformState) -> String {
    format!(
        "scale {:.3} | pos ({:.2}, {:.2}, {:.2}) | rot ({:.1}\u{b0}, {:.1}\u{b0}, {:.1}\u{b0})",
        s.scale, s.position.x, s.position.y, s.position.z, s.rotation.x, s.rotation.y, s.rotation.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn prefs_round_trip_through_editor() {
        let mut prefs = EditorPrefs::default();
        prefs.camera.distance = 42.0;
        prefs.camera.yaw = 1.0;
        prefs.scene.grid_size = 30.0;
        prefs.scene.last_model = Some("/tmp/a.dae".into());
        prefs.hud.wireframe = true;

        let mut editor = Editor::new();
        let mut viewer = ViewerState::default();
        viewer.apply_prefs(&prefs, &mut editor);
        assert_eq!(editor.grid().size, 30.0);
        assert_eq!(editor.camera().distance, 42.0);

        let out = viewer.export_prefs(&editor);
        assert_eq!(out, prefs);
    }

    #[test]
    fn non_finite_camera_values_are_ignored() {
        let mut prefs = EditorPrefs::default();
        prefs.camera.distance = f32::NAN;
        prefs.camera.pitch = 10.0;
        let mut editor = Editor::new();
        let before = editor.camera().distance;
        ViewerState::default().apply_prefs(&prefs, &mut editor);
        assert_relative_eq!(editor.camera().distance, before);
        assert!(editor.camera().pitch <= MAX_PITCH);
    }

    #[test]
    fn watch_log_keeps_latest_lines() {
        let viewer = ViewerState::default();
        let mut listener = viewer.watch_listener();
        let mut t = dae_scene::ModelTransform::IDENTITY;
        for i in 0..12 {
            t.set_position(i as f32, 0.0, 0.0);
            listener(&TransformState::display(&t));
        }
        let log = viewer.watch_log.borrow();
        assert_eq!(log.len(), WATCH_LOG_LEN);
        assert!(log.back().is_some_and(|l| l.contains("pos (11.00")));
    }
}

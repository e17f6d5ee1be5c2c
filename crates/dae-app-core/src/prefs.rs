// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved editor preferences (orbit camera, scene defaults, HUD flags).

use serde::{Deserialize, Serialize};

/// Saved preferences for the editor surface.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EditorPrefs {
    /// Orbit camera pose and projection.
    pub camera: OrbitPrefs,
    /// Scene defaults (grid, last model, loader flags).
    pub scene: ScenePrefs,
    /// HUD toggles.
    pub hud: HudPrefs,
}

/// Orbit camera parameters; angles in radians.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrbitPrefs {
    /// Focal point the camera orbits around.
    pub target: [f32; 3],
    /// Distance from the focal point.
    pub distance: f32,
    /// Rotation about the world Y axis.
    pub yaw: f32,
    /// Elevation above the XZ plane.
    pub pitch: f32,
    /// Vertical field of view.
    pub fov_y: f32,
}

impl Default for OrbitPrefs {
    fn default() -> Self {
        // Eye at (100, 100, 100) looking at the origin.
        let distance = 100.0 * 3f32.sqrt();
        Self {
            target: [0.0; 3],
            distance,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: (100.0 / distance).asin(),
            fov_y: 60f32.to_radians(),
        }
    }
}

/// Scene defaults restored on start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenePrefs {
    /// Ground grid edge length.
    pub grid_size: f32,
    /// Path of the most recently loaded model.
    pub last_model: Option<String>,
    /// Rotate Z-up/X-up assets to Y-up on load.
    pub convert_up_axis: bool,
}

impl Default for ScenePrefs {
    fn default() -> Self {
        Self {
            grid_size: 100.0,
            last_model: None,
            convert_up_axis: true,
        }
    }
}

/// HUD and overlay toggles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HudPrefs {
    /// Show the transform inspector panel.
    pub show_inspector: bool,
    /// Draw corner labels on the grid.
    pub show_grid_labels: bool,
    /// Render the model as wireframe.
    pub wireframe: bool,
    /// Present in vsync mode.
    pub vsync: bool,
}

impl Default for HudPrefs {
    fn default() -> Self {
        Self {
            show_inspector: true,
            show_grid_labels: true,
            wireframe: false,
            vsync: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_orbit_places_eye_on_the_diagonal() {
        let cam = OrbitPrefs::default();
        let eye = [
            cam.distance * cam.pitch.cos() * cam.yaw.sin(),
            cam.distance * cam.pitch.sin(),
            cam.distance * cam.pitch.cos() * cam.yaw.cos(),
        ];
        for c in eye {
            assert_relative_eq!(c, 100.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn partial_json_fills_defaults() {
        let prefs: EditorPrefs = serde_json::from_str(r#"{"scene":{"grid_size":40.0}}"#).unwrap();
        assert_eq!(prefs.scene.grid_size, 40.0);
        assert!(prefs.scene.convert_up_axis);
        assert_eq!(prefs.hud, HudPrefs::default());
        assert_eq!(prefs.camera, OrbitPrefs::default());
    }
}

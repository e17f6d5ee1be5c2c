// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Perspective camera with orbit controls (rotate, zoom, optional pan).

use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::PI;

/// Pitch limit keeping the camera off the poles.
pub const MAX_PITCH: f32 = PI * 0.5 - 0.01;
const MIN_DISTANCE: f32 = 1e-3;
const ROTATE_SPEED: f32 = 0.005;
const ZOOM_STEP: f32 = 0.1;

/// Camera orbiting a focal point. Angles in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Focal point.
    pub target: Vec3,
    /// Distance from eye to target.
    pub distance: f32,
    /// Heading about world Y; 0 looks down -Z.
    pub yaw: f32,
    /// Elevation; positive looks down onto the XZ plane.
    pub pitch: f32,
    /// Vertical field of view.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Pan sensitivity; 0 disables panning.
    pub pan_speed: f32,
    /// Whether pointer input moves the camera.
    pub enabled: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::splat(100.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Camera at `eye` looking at `target`, 60 degree fov, aspect 1.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(MIN_DISTANCE);
        Self {
            target,
            distance,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            fov_y: 60f32.to_radians(),
            aspect: 1.0,
            near: 1.0,
            far: 1e10,
            pan_speed: 0.0,
            enabled: true,
        }
    }

    /// Eye position.
    pub fn eye(&self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    /// Update the aspect ratio from a viewport size; degenerate sizes are ignored.
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// Orbit by a pointer delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        if !self.enabled {
            return;
        }
        self.yaw -= delta.x * ROTATE_SPEED;
        self.pitch = (self.pitch + delta.y * ROTATE_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Dolly towards (positive steps) or away from the target.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled || !steps.is_finite() {
            return;
        }
        let factor = (1.0 - ZOOM_STEP).powf(steps);
        self.distance = (self.distance * factor).max(MIN_DISTANCE);
    }

    /// Slide the target in the view plane by a pointer delta in pixels.
    pub fn pan(&mut self, delta: Vec2) {
        if !self.enabled || self.pan_speed == 0.0 {
            return;
        }
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let scale = self.pan_speed * self.distance * 0.001;
        self.target += (-right * delta.x + up * delta.y) * scale;
    }

    /// View matrix.
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Projection matrix.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-3), self.near, self.far)
    }

    /// Combined view-projection matrix.
    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// Project a world point to viewport pixels (origin top-left).
    /// Returns `None` for points behind the camera.
    pub fn project(&self, world: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_proj() * world.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.x,
            (-ndc.y * 0.5 + 0.5) * viewport.y,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_eye_is_on_the_diagonal() {
        let cam = OrbitCamera::default();
        let eye = cam.eye();
        assert_relative_eq!(eye.x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(eye.y, 100.0, epsilon = 1e-3);
        assert_relative_eq!(eye.z, 100.0, epsilon = 1e-3);
        assert_eq!(cam.near, 1.0);
        assert_eq!(cam.aspect, 1.0);
    }

    #[test]
    fn target_projects_to_viewport_centre() {
        let mut cam = OrbitCamera::default();
        cam.set_aspect(800.0, 600.0);
        let p = cam.project(Vec3::ZERO, Vec2::new(800.0, 600.0)).unwrap();
        assert_relative_eq!(p.x, 400.0, epsilon = 1e-2);
        assert_relative_eq!(p.y, 300.0, epsilon = 1e-2);
    }

    #[test]
    fn points_behind_the_eye_do_not_project() {
        let cam = OrbitCamera::default();
        assert!(cam.project(Vec3::splat(300.0), Vec2::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn pan_is_disabled_by_default() {
        let mut cam = OrbitCamera::default();
        cam.pan(Vec2::new(50.0, 50.0));
        assert_eq!(cam.target, Vec3::ZERO);
        cam.pan_speed = 1.0;
        cam.pan(Vec2::new(50.0, 0.0));
        assert_ne!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn zoom_and_rotate_respect_enabled_flag() {
        let mut cam = OrbitCamera::default();
        let d = cam.distance;
        cam.zoom(1.0);
        assert!(cam.distance < d);
        cam.enabled = false;
        let snapshot = cam;
        cam.zoom(3.0);
        cam.rotate(Vec2::new(10.0, 10.0));
        assert_eq!(cam, snapshot);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(Vec2::new(0.0, 1e6));
        assert!(cam.pitch <= MAX_PITCH);
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Placement of the loaded model in the world.
///
/// Conventions:
/// - `rotation` holds Euler angles in radians applied in intrinsic X, Y, Z order.
/// - `scale` is per-axis; the host-facing API sets it uniformly.
/// - `to_mat4` builds `M = T * R * S`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ModelTransform {
    /// World-space translation.
    pub position: Vec3,
    /// Euler angles (radians, XYZ order).
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ModelTransform {
    /// No translation, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Set the same scale factor on all three axes.
    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }

    /// Move the model to `(x, y, z)`.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    /// Set the rotation from degrees.
    pub fn set_rotation_degrees(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vec3::new(deg_to_rad(x), deg_to_rad(y), deg_to_rad(z));
    }

    /// Rotation as a quaternion.
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Replace the rotation with the Euler decomposition of `q`.
    pub fn set_quat(&mut self, q: Quat) {
        let (x, y, z) = q.normalize().to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }

    /// Column-major model matrix.
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }
}

/// `deg / 180 * PI`, matching how host pages pass rotations.
#[must_use]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg / 180.0 * std::f32::consts::PI
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transform snapshot handed to hosts.
//!
//! Two flavours exist: [`TransformState::raw`] answers direct `state()` queries
//! with rotations in radians, while [`TransformState::display`] is what state
//! watchers receive: rotations in degrees wrapped into `[0, 360)`.

use crate::transform::ModelTransform;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Three named components, serialized as `{ "x", "y", "z" }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Axes {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl From<Vec3> for Axes {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl Axes {
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            x: f(self.x),
            y: f(self.y),
            z: f(self.z),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        approx_eq(self.x, other.x, epsilon)
            && approx_eq(self.y, other.y, epsilon)
            && approx_eq(self.z, other.z, epsilon)
    }
}

/// Snapshot of the model transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Uniform scale (the X component of the model scale).
    pub scale: f32,
    /// World position.
    pub position: Axes,
    /// Euler rotation; radians for [`raw`](Self::raw), degrees for [`display`](Self::display).
    pub rotation: Axes,
}

impl TransformState {
    /// Snapshot with rotations in radians.
    pub fn raw(t: &ModelTransform) -> Self {
        Self {
            scale: t.scale.x,
            position: t.position.into(),
            rotation: t.rotation.into(),
        }
    }

    /// Snapshot with rotations in degrees, each wrapped into `[0, 360)`.
    pub fn display(t: &ModelTransform) -> Self {
        Self {
            rotation: Axes::from(t.rotation).map(wrap_degrees),
            ..Self::raw(t)
        }
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        approx_eq(self.scale, other.scale, epsilon)
            && self.position.approx_eq(&other.position, epsilon)
            && self.rotation.approx_eq(&other.rotation, epsilon)
    }
}

/// Radians to degrees in `[0, 360)`.
pub fn wrap_degrees(rad: f32) -> f32 {
    let deg = rad.to_degrees().rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

/// `|a - b| <= epsilon`, treating two NaNs as equal so a NaN state does not
/// re-notify every frame.
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() <= epsilon
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Transform handles: interaction modes, screen-space picking, and drag math.
//!
//! Handles are three axis arrows anchored at the model origin. Their world
//! length follows the eye distance so they keep a steady on-screen size. A drag
//! is resolved against the handles and transform captured when it started,
//! which keeps the result independent of frame rate and of the model moving
//! under the cursor.

use crate::{camera::OrbitCamera, transform::ModelTransform};
use glam::{Quat, Vec2, Vec3};
use std::f32::consts::PI;

/// Smallest factor a single scale drag may apply.
const MIN_SCALE_FACTOR: f32 = 0.01;

/// What dragging a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    /// Scale along the handle's axis.
    Scale,
    /// Rotate about the handle's axis.
    Rotate,
    /// Move along the handle's axis.
    #[default]
    Translate,
}

impl GizmoMode {
    /// All modes in cycling order.
    pub const ALL: [GizmoMode; 3] = [GizmoMode::Scale, GizmoMode::Rotate, GizmoMode::Translate];

    /// Scale -> Rotate -> Translate -> Scale.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            GizmoMode::Scale => GizmoMode::Rotate,
            GizmoMode::Rotate => GizmoMode::Translate,
            GizmoMode::Translate => GizmoMode::Scale,
        }
    }

    /// Lower-case name, as hosts spell it.
    pub fn label(self) -> &'static str {
        match self {
            GizmoMode::Scale => "scale",
            GizmoMode::Rotate => "rotate",
            GizmoMode::Translate => "translate",
        }
    }
}

impl std::fmt::Display for GizmoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a released pointer button cycles the mode. Buttons use DOM numbering
/// (0 primary, 1 middle, 2 secondary, 3+ extra); primary and middle are ignored.
pub fn cycles_mode(button: u16) -> bool {
    button >= 2
}

/// World axis a handle controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoAxis {
    /// World X.
    X,
    /// World Y.
    Y,
    /// World Z.
    Z,
}

impl GizmoAxis {
    /// All axes.
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    /// Component index (0 for X).
    pub fn index(self) -> usize {
        match self {
            GizmoAxis::X => 0,
            GizmoAxis::Y => 1,
            GizmoAxis::Z => 2,
        }
    }

    /// Unit direction.
    pub fn dir(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }

    /// Display colour (linear RGB).
    pub fn color(self) -> [f32; 3] {
        match self {
            GizmoAxis::X => [0.9, 0.2, 0.2],
            GizmoAxis::Y => [0.2, 0.85, 0.2],
            GizmoAxis::Z => [0.25, 0.4, 1.0],
        }
    }
}

/// One projected handle, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Axis the handle controls.
    pub axis: GizmoAxis,
    /// Screen position of the model origin.
    pub start: Vec2,
    /// Screen position of the handle tip.
    pub end: Vec2,
}

/// Handles projected for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoHandles {
    /// World length of every handle.
    pub world_length: f32,
    /// Visible handles (axes pointing straight at the camera are dropped).
    pub handles: Vec<Handle>,
}

impl GizmoHandles {
    /// Handle for `axis`, if visible.
    pub fn get(&self, axis: GizmoAxis) -> Option<&Handle> {
        self.handles.iter().find(|h| h.axis == axis)
    }
}

/// Sizing and picking tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gizmo {
    /// Handle length as a fraction of the eye distance.
    pub size: f32,
    /// Maximum cursor distance (pixels) for a pick.
    pub pick_tolerance: f32,
}

impl Default for Gizmo {
    fn default() -> Self {
        Self {
            size: 0.2,
            pick_tolerance: 10.0,
        }
    }
}

impl Gizmo {
    /// Project handles for a model at `origin`. `None` when the origin is off-camera.
    pub fn handles(&self, origin: Vec3, camera: &OrbitCamera, viewport: Vec2) -> Option<GizmoHandles> {
        let world_length = (camera.eye() - origin).length() * self.size;
        let start = camera.project(origin, viewport)?;
        let handles = GizmoAxis::ALL
            .into_iter()
            .filter_map(|axis| {
                let end = camera.project(origin + axis.dir() * world_length, viewport)?;
                (end.distance_squared(start) >= 1.0).then_some(Handle { axis, start, end })
            })
            .collect();
        Some(GizmoHandles {
            world_length,
            handles,
        })
    }

    /// Axis whose handle is closest to `cursor`, within the pick tolerance.
    pub fn pick(&self, cursor: Vec2, handles: &GizmoHandles) -> Option<GizmoAxis> {
        handles
            .handles
            .iter()
            .map(|h| (h.axis, distance_to_segment(cursor, h.start, h.end)))
            .filter(|(_, d)| *d <= self.pick_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(axis, _)| axis)
    }
}

/// An in-progress handle drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Mode at drag start.
    pub mode: GizmoMode,
    /// Dragged axis.
    pub axis: GizmoAxis,
    /// Cursor at drag start.
    pub anchor: Vec2,
    /// Transform at drag start.
    pub origin: ModelTransform,
    /// Handles at drag start.
    pub handles: GizmoHandles,
}

impl DragSession {
    /// Transform resulting from moving the cursor to `cursor`.
    pub fn apply(&self, cursor: Vec2) -> ModelTransform {
        let mut out = self.origin;
        let Some(h) = self.handles.get(self.axis) else {
            return out;
        };
        let seg = h.end - h.start;
        let len2 = seg.length_squared();
        if len2 < 1.0 {
            return out;
        }
        // Cursor travel along the handle, in handle lengths.
        let t = (cursor - self.anchor).dot(seg) / len2;
        match self.mode {
            GizmoMode::Translate => {
                out.position += self.axis.dir() * t * self.handles.world_length;
            }
            GizmoMode::Scale => {
                let i = self.axis.index();
                out.scale[i] = self.origin.scale[i] * (1.0 + t).max(MIN_SCALE_FACTOR);
            }
            GizmoMode::Rotate => {
                let q = Quat::from_axis_angle(self.axis.dir(), t * PI) * self.origin.quat();
                out.set_quat(q);
            }
        }
        out
    }
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn session(mode: GizmoMode, axis: GizmoAxis) -> DragSession {
        DragSession {
            mode,
            axis,
            anchor: Vec2::new(100.0, 100.0),
            origin: ModelTransform::IDENTITY,
            handles: GizmoHandles {
                world_length: 20.0,
                handles: vec![Handle {
                    axis,
                    start: Vec2::new(100.0, 100.0),
                    end: Vec2::new(200.0, 100.0),
                }],
            },
        }
    }

    #[test]
    fn modes_cycle_scale_rotate_translate() {
        assert_eq!(GizmoMode::Scale.next(), GizmoMode::Rotate);
        assert_eq!(GizmoMode::Rotate.next(), GizmoMode::Translate);
        assert_eq!(GizmoMode::Translate.next(), GizmoMode::Scale);
        assert_eq!(GizmoMode::default(), GizmoMode::Translate);
    }

    #[test]
    fn only_secondary_and_extra_buttons_cycle() {
        assert!(!cycles_mode(0));
        assert!(!cycles_mode(1));
        assert!(cycles_mode(2));
        assert!(cycles_mode(4));
    }

    #[test]
    fn translate_moves_along_axis_by_handle_fraction() {
        let t = session(GizmoMode::Translate, GizmoAxis::X).apply(Vec2::new(150.0, 140.0));
        assert_relative_eq!(t.position.x, 10.0, epsilon = 1e-5);
        assert_eq!(t.position.y, 0.0);
    }

    #[test]
    fn scale_stretches_only_the_dragged_axis_and_is_clamped() {
        let grown = session(GizmoMode::Scale, GizmoAxis::Y).apply(Vec2::new(200.0, 100.0));
        assert_eq!(grown.scale, Vec3::new(1.0, 2.0, 1.0));
        let crushed = session(GizmoMode::Scale, GizmoAxis::Y).apply(Vec2::new(-500.0, 100.0));
        assert_eq!(crushed.scale, Vec3::new(1.0, MIN_SCALE_FACTOR, 1.0));
    }

    #[test]
    fn scale_drag_keeps_earlier_per_axis_scale() {
        let mut s = session(GizmoMode::Scale, GizmoAxis::X);
        s.origin.scale = Vec3::new(2.0, 3.0, 4.0);
        let t = s.apply(Vec2::new(150.0, 100.0));
        assert_eq!(t.scale, Vec3::new(3.0, 3.0, 4.0));
    }

    #[test]
    fn rotate_half_handle_is_quarter_turn() {
        let t = session(GizmoMode::Rotate, GizmoAxis::Z).apply(Vec2::new(150.0, 100.0));
        assert_relative_eq!(t.rotation.z, std::f32::consts::FRAC_PI_2, epsilon = 1e-4);
    }

    #[test]
    fn pick_prefers_nearest_handle_within_tolerance() {
        let gizmo = Gizmo::default();
        let handles = GizmoHandles {
            world_length: 1.0,
            handles: vec![
                Handle {
                    axis: GizmoAxis::X,
                    start: Vec2::ZERO,
                    end: Vec2::new(100.0, 0.0),
                },
                Handle {
                    axis: GizmoAxis::Y,
                    start: Vec2::ZERO,
                    end: Vec2::new(0.0, -100.0),
                },
            ],
        };
        assert_eq!(gizmo.pick(Vec2::new(50.0, 3.0), &handles), Some(GizmoAxis::X));
        assert_eq!(gizmo.pick(Vec2::new(4.0, -60.0), &handles), Some(GizmoAxis::Y));
        assert_eq!(gizmo.pick(Vec2::new(60.0, -60.0), &handles), None);
    }

    #[test]
    fn handles_follow_the_camera() {
        let cam = OrbitCamera::default();
        let viewport = Vec2::new(800.0, 800.0);
        let hs = Gizmo::default().handles(Vec3::ZERO, &cam, viewport).unwrap();
        assert_eq!(hs.handles.len(), 3);
        assert_relative_eq!(hs.world_length, cam.distance * 0.2, epsilon = 1e-3);
        let x = hs.get(GizmoAxis::X).unwrap();
        assert_relative_eq!(x.start.x, 400.0, epsilon = 0.1);
    }
}

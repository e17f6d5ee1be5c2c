// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Screen-space decorations a page paints over the WebGL canvas: grid corner
//! labels and the handles of the current mode.

use dae_scene::{gizmo::GizmoAxis, Editor};
use glam::Vec2;
use serde::Serialize;

/// Grid label at a projected corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLabel {
    /// Pixel x.
    pub x: f32,
    /// Pixel y.
    pub y: f32,
    /// Text to draw.
    pub text: String,
}

/// One projected handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayHandle {
    /// `"x"`, `"y"` or `"z"`.
    pub axis: &'static str,
    /// CSS colour.
    pub color: String,
    /// Pixel position of the model origin.
    pub start: [f32; 2],
    /// Pixel position of the handle tip.
    pub end: [f32; 2],
}

/// Everything drawn on top of the scene for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    /// Handle mode label (`"scale"`, `"rotate"`, `"translate"`).
    pub mode: &'static str,
    /// Grid corner labels that are in front of the camera.
    pub labels: Vec<OverlayLabel>,
    /// Handles; empty without a model.
    pub handles: Vec<OverlayHandle>,
}

impl Overlay {
    /// Project the editor's decorations into a `viewport` sized in pixels.
    pub fn build(editor: &Editor, viewport: Vec2) -> Self {
        let camera = editor.camera();
        let labels = editor
            .grid()
            .labels()
            .into_iter()
            .filter_map(|label| {
                let p = camera.project(label.position, viewport)?;
                Some(OverlayLabel {
                    x: p.x,
                    y: p.y,
                    text: label.text,
                })
            })
            .collect();
        let handles = editor
            .gizmo_handles(viewport)
            .map(|h| {
                h.handles
                    .iter()
                    .map(|h| OverlayHandle {
                        axis: axis_name(h.axis),
                        color: css_color(h.axis.color()),
                        start: h.start.to_array(),
                        end: h.end.to_array(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            mode: editor.mode().label(),
            labels,
            handles,
        }
    }
}

fn axis_name(axis: GizmoAxis) -> &'static str {
    match axis {
        GizmoAxis::X => "x",
        GizmoAxis::Y => "y",
        GizmoAxis::Z => "z",
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn css_color([r, g, b]: [f32; 3]) -> String {
    // Clamped to [0, 255.5) before the cast.
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dae_scene::{
        model::{MeshPart, UpAxis},
        LoadOptions, ModelMesh,
    };
    use std::time::Duration;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn empty_scene_has_labels_but_no_handles() {
        let ed = Editor::new();
        let o = Overlay::build(&ed, VIEWPORT);
        assert_eq!(o.mode, "translate");
        assert!(!o.labels.is_empty());
        assert!(o.handles.is_empty());
    }

    #[test]
    fn loaded_model_gets_three_coloured_handles() {
        let mesh = ModelMesh::from_parts(
            [MeshPart {
                positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                normals: Vec::new(),
                faces: vec![[0, 1, 2]],
            }],
            UpAxis::Y,
        )
        .unwrap();
        let mut ed = Editor::new();
        ed.load(mesh, None, &LoadOptions::default(), Duration::ZERO);
        let o = Overlay::build(&ed, VIEWPORT);
        let axes: Vec<_> = o.handles.iter().map(|h| h.axis).collect();
        assert_eq!(axes, ["x", "y", "z"]);
        assert_eq!(o.handles[0].color, "#e63333");
        assert_eq!(o.handles[0].start, o.handles[1].start);
    }
}

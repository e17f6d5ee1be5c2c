// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Input handling: map winit events into editor/viewer state and UI events.

use crate::{ui_state::UiEvent, viewer_state::ViewerState};
use dae_scene::{gizmo::GizmoMode, Editor};
use egui_winit::winit::{
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};
use glam::Vec2;

#[derive(Default)]
pub struct InputOutcome {
    pub ui_event: Option<UiEvent>,
    pub mode_changed: Option<GizmoMode>,
}

/// DOM numbering for pointer buttons (0 primary, 1 middle, 2 secondary, 3 back, 4 forward).
pub fn dom_button(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
        MouseButton::Back => 3,
        MouseButton::Forward => 4,
        MouseButton::Other(n) => n,
    }
}

/// `pointer_free` is false while egui owns the pointer (hovering a panel).
pub fn handle_window_event(
    event: &WindowEvent,
    editor: &mut Editor,
    viewer: &mut ViewerState,
    viewport_px: Vec2,
    pointer_free: bool,
) -> InputOutcome {
    let mut out = InputOutcome::default();
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            if event.state == ElementState::Pressed {
                if let PhysicalKey::Code(code) = event.physical_key {
                    out.ui_event = match code {
                        KeyCode::Escape => Some(UiEvent::OpenMenu),
                        KeyCode::KeyO => Some(UiEvent::OpenFileOverlay),
                        _ => None,
                    };
                }
            }
        }
        WindowEvent::MouseWheel { delta, .. } if pointer_free => {
            let steps: f32 = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
            };
            editor.camera_mut().zoom(steps);
            editor.request_redraw();
        }
        WindowEvent::CursorMoved { position, .. } => {
            pointer_moved(editor, viewer, Vec2::new(position.x as f32, position.y as f32));
        }
        WindowEvent::CursorLeft { .. } => {
            viewer.cursor = None;
        }
        WindowEvent::MouseInput { state, button, .. } => match state {
            ElementState::Pressed if pointer_free => {
                pointer_pressed(editor, viewer, dom_button(*button), viewport_px);
            }
            ElementState::Released => {
                out.mode_changed = pointer_released(editor, viewer, dom_button(*button));
            }
            ElementState::Pressed => {}
        },
        WindowEvent::DroppedFile(path) => {
            out.ui_event = Some(UiEvent::FileDropped(path.clone()));
        }
        _ => {}
    }
    out
}

/// Primary press grabs a handle under the cursor, otherwise starts orbiting.
pub fn pointer_pressed(editor: &mut Editor, viewer: &mut ViewerState, button: u16, viewport_px: Vec2) {
    if button != 0 {
        return;
    }
    let Some(cursor) = viewer.cursor else {
        return;
    };
    if editor.begin_gizmo_drag(cursor, viewport_px) {
        tracing::debug!(mode = %editor.mode(), "handle grabbed");
        return;
    }
    viewer.orbiting = editor.camera().enabled;
}

pub fn pointer_moved(editor: &mut Editor, viewer: &mut ViewerState, pos: Vec2) {
    let prev = viewer.cursor.replace(pos);
    if editor.is_dragging() {
        editor.update_gizmo_drag(pos);
    } else if viewer.orbiting {
        if let Some(prev) = prev {
            editor.camera_mut().rotate(pos - prev);
            editor.request_redraw();
        }
    }
}

/// Releases end drags; secondary and extra buttons cycle the handle mode.
pub fn pointer_released(editor: &mut Editor, viewer: &mut ViewerState, button: u16) -> Option<GizmoMode> {
    if button == 0 {
        if editor.is_dragging() {
            editor.end_gizmo_drag();
        }
        viewer.orbiting = false;
    }
    editor.cycle_gizmo_mode(button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dae_scene::{
        model::{MeshPart, UpAxis},
        LoadOptions, ModelMesh,
    };
    use std::time::Duration;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 800.0);

    fn editor_with_model() -> Editor {
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
        ed
    }

    #[test]
    fn buttons_use_dom_numbering() {
        assert_eq!(dom_button(MouseButton::Left), 0);
        assert_eq!(dom_button(MouseButton::Middle), 1);
        assert_eq!(dom_button(MouseButton::Right), 2);
        assert_eq!(dom_button(MouseButton::Other(7)), 7);
    }

    #[test]
    fn right_release_cycles_left_release_does_not() {
        let mut ed = Editor::new();
        let mut viewer = ViewerState::default();
        assert_eq!(pointer_released(&mut ed, &mut viewer, 0), None);
        assert_eq!(pointer_released(&mut ed, &mut viewer, 1), None);
        assert_eq!(
            pointer_released(&mut ed, &mut viewer, 2),
            Some(GizmoMode::Scale)
        );
    }

    #[test]
    fn empty_space_drag_orbits_the_camera() {
        let mut ed = Editor::new();
        let mut viewer = ViewerState::default();
        pointer_moved(&mut ed, &mut viewer, Vec2::new(10.0, 10.0));
        pointer_pressed(&mut ed, &mut viewer, 0, VIEWPORT);
        assert!(viewer.orbiting);
        let yaw = ed.camera().yaw;
        pointer_moved(&mut ed, &mut viewer, Vec2::new(60.0, 10.0));
        assert!(ed.camera().yaw < yaw);
        pointer_released(&mut ed, &mut viewer, 0);
        assert!(!viewer.orbiting);
    }

    #[test]
    fn grabbing_a_handle_moves_the_model_not_the_camera() {
        let mut ed = editor_with_model();
        let mut viewer = ViewerState::default();
        let handles = ed.gizmo_handles(VIEWPORT).unwrap();
        let x = *handles.get(dae_scene::gizmo::GizmoAxis::X).unwrap();
        let grab = x.start.lerp(x.end, 0.5);

        pointer_moved(&mut ed, &mut viewer, grab);
        pointer_pressed(&mut ed, &mut viewer, 0, VIEWPORT);
        assert!(ed.is_dragging());
        assert!(!viewer.orbiting);

        let cam = *ed.camera();
        pointer_moved(&mut ed, &mut viewer, x.end);
        assert_eq!(*ed.camera(), cam);
        assert!(ed.state().unwrap().position.x > 0.0);

        pointer_released(&mut ed, &mut viewer, 0);
        assert!(!ed.is_dragging());
        assert!(ed.camera().enabled);
    }
}

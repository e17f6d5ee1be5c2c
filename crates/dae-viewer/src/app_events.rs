// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Window-event handling for the App.

use crate::{app::App, input};
use egui_winit::winit::event::WindowEvent;

impl App {
    pub fn handle_window_event(
        &mut self,
        window_id: egui_winit::winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(idx) = self
            .viewports
            .iter()
            .position(|v| v.window.id() == window_id)
        else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                self.apply_ui_event(crate::ui_state::UiEvent::ShutdownRequested);
                return;
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                return;
            }
            WindowEvent::Resized(size) => {
                self.viewports[idx].gpu.resize(*size);
                self.editor
                    .camera_mut()
                    .set_aspect(size.width as f32, size.height as f32);
                self.editor.request_redraw();
            }
            _ => {}
        }

        let vp = &mut self.viewports[idx];
        let response = vp.egui_state.on_window_event(vp.window, &event);
        if response.repaint {
            self.editor.request_redraw();
        }
        let keyboard = matches!(event, WindowEvent::KeyboardInput { .. });
        if keyboard && self.egui_ctx.wants_keyboard_input() {
            return;
        }
        let pointer_free =
            !self.egui_ctx.wants_pointer_input() && !self.egui_ctx.is_pointer_over_area();

        let viewport_px = self.viewports[idx].size_px();
        let outcome = input::handle_window_event(
            &event,
            &mut self.editor,
            &mut self.viewer,
            viewport_px,
            pointer_free,
        );
        if let Some(mode) = outcome.mode_changed {
            tracing::info!(%mode, "gizmo mode");
            self.editor.request_redraw();
        }
        if let Some(ev) = outcome.ui_event {
            self.apply_ui_event(ev);
        }
    }
}

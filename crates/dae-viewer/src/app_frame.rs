// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-frame tick: egui pass, scene render, perf bookkeeping.

use crate::{app::App, render, ui};
use std::time::Instant;

impl App {
    pub fn frame(&mut self) {
        let Some(vp) = self.viewports.first_mut() else {
            return;
        };
        let win = vp.window;
        let raw_input = vp.egui_state.take_egui_input(win);
        let viewport_px = vp.size_px();
        let pixels_per_point = win.scale_factor() as f32;

        self.viewer.last_frame = Instant::now();
        let now = self.viewer.now();
        self.notices.prune(now);

        let prev_vsync = self.viewer.vsync;
        let egui_ctx = self.egui_ctx.clone();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            ui::draw_view_hud(ctx, self, viewport_px, pixels_per_point);
        });
        let wants_repaint = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());

        let Some(vp) = self.viewports.first_mut() else {
            return;
        };
        vp.egui_state
            .handle_platform_output(win, full_output.platform_output);
        if self.viewer.vsync != prev_vsync {
            vp.gpu.set_vsync(self.viewer.vsync);
        }

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_desc = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [vp.gpu.config.width, vp.gpu.config.height],
            pixels_per_point,
        };

        let out = render::render_frame(
            vp,
            &self.editor,
            &self.viewer,
            paint_jobs,
            full_output.textures_delta,
            screen_desc,
        );
        self.viewer.perf.push(out.frame_ms);

        self.sync_caption();
        if wants_repaint || self.editor.is_dragging() {
            self.editor.request_redraw();
        }
    }
}

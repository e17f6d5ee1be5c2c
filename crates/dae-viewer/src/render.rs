// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Render helper: draws the scene through `dae-render`, then egui on top.

use crate::{viewer_state::ViewerState, viewport::Viewport};
use dae_scene::Editor;
use egui_wgpu::wgpu;

pub struct RenderOutputs {
    pub frame_ms: f32,
}

/// Render the scene and UI. Returns frame timing.
pub fn render_frame(
    vp: &mut Viewport,
    editor: &Editor,
    viewer: &ViewerState,
    paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen_desc: egui_wgpu::ScreenDescriptor,
) -> RenderOutputs {
    let gpu = &mut vp.gpu;
    gpu.scene.prepare(&gpu.device, &gpu.queue, editor);

    let frame = match gpu.surface.get_current_texture() {
        Ok(f) => f,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            gpu.resize(egui_winit::winit::dpi::PhysicalSize::new(
                gpu.config.width,
                gpu.config.height,
            ));
            match gpu.surface.get_current_texture() {
                Ok(f) => f,
                Err(err) => {
                    tracing::warn!(%err, "surface unavailable after reconfigure");
                    return RenderOutputs { frame_ms: 0.0 };
                }
            }
        }
        Err(err) => {
            tracing::error!(%err, "failed to acquire surface texture");
            return RenderOutputs { frame_ms: 0.0 };
        }
    };
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("main-encoder"),
        });
    gpu.scene
        .encode(&mut encoder, &view, &gpu.targets, viewer.wireframe);

    let cmd_main = encoder.finish();

    let egui_renderer = &mut vp.egui_renderer;
    let cmd_ui = {
        let mut egui_encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui-encoder"),
            });

        for (id, delta) in textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }
        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut egui_encoder,
            &paint_jobs,
            &screen_desc,
        );
        {
            let rpass = egui_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            let mut rpass = rpass.forget_lifetime();
            egui_renderer.render(&mut rpass, &paint_jobs, &screen_desc);
        }
        for id in textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        egui_encoder.finish()
    };

    gpu.queue.submit([cmd_main, cmd_ui]);
    frame.present();

    let frame_ms = viewer.last_frame.elapsed().as_secs_f32() * 1000.0;
    RenderOutputs { frame_ms }
}

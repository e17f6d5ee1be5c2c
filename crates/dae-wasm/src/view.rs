// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! WebGL2 canvas renderer for the browser build.
//!
//! A page creates one view per canvas with `createView(canvas)` and, whenever
//! `editor.tick(now)` reports a due redraw, calls `view.render(editor)`.

use crate::EditorHandle;
use dae_render::{supported_sample_count, RenderTargets, SceneRenderer};
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

const SAMPLE_COUNT: u32 = 4;

/// Scene renderer bound to one canvas.
#[wasm_bindgen]
pub struct StageView {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    max_tex: u32,
    targets: RenderTargets,
    scene: SceneRenderer,
    wireframe: bool,
}

/// Attach a renderer to `canvas`. The drawing buffer keeps the canvas's
/// current `width`/`height`; call `resize` when the page changes them.
#[wasm_bindgen(js_name = createView)]
pub async fn create_view(canvas: HtmlCanvasElement) -> Result<StageView, JsError> {
    let (width, height) = (canvas.width().max(1), canvas.height().max(1));
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(JsError::from)?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(JsError::from)?;
    let limits = adapter.limits();
    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("dae-wasm-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                .using_resolution(limits.clone()),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
            experimental_features: wgpu::ExperimentalFeatures::disabled(),
        })
        .await
        .map_err(JsError::from)?;

    let caps = surface.get_capabilities(&adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| JsError::new("canvas reports no surface formats"))?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
    let max_tex = limits.max_texture_dimension_2d;
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.min(max_tex),
        height: height.min(max_tex),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &config);

    let sample_count = supported_sample_count(&adapter, format, SAMPLE_COUNT);
    let targets = RenderTargets::new(&device, format, config.width, config.height, sample_count);
    let scene = SceneRenderer::new(&device, format, sample_count);
    tracing::info!(
        ?format,
        sample_count,
        width = config.width,
        height = config.height,
        "canvas view ready"
    );

    Ok(StageView {
        surface,
        device,
        queue,
        config,
        max_tex,
        targets,
        scene,
        wireframe: false,
    })
}

#[wasm_bindgen]
impl StageView {
    /// Match the drawing buffer to `width` x `height` pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width.min(self.max_tex);
        self.config.height = height.min(self.max_tex);
        self.surface.configure(&self.device, &self.config);
        self.targets
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Draw the model as lines where the device allows it. Returns whether
    /// wireframe is now in effect.
    #[wasm_bindgen(js_name = setWireframe)]
    pub fn set_wireframe(&mut self, on: bool) -> bool {
        self.wireframe = on && self.scene.supports_wireframe();
        self.wireframe
    }

    /// Draw the editor's sky, grid and model.
    pub fn render(&mut self, editor: &EditorHandle) -> Result<(), JsError> {
        {
            let ed = editor.editor();
            self.scene.prepare(&self.device, &self.queue, &ed);
        }
        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture().map_err(JsError::from)?
            }
            Err(err) => return Err(JsError::from(err)),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas-encoder"),
            });
        self.scene
            .encode(&mut encoder, &view, &self.targets, self.wireframe);
        self.queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-level application wiring and event loop handler.

use crate::{
    cli::Args,
    core::UiState,
    render_port::WinitRenderPort,
    ui_effects::{self, EffectCtx, UiEffectsRunner},
    ui_state,
    viewer_state::ViewerState,
    viewport::Viewport,
};
use dae_app_core::{
    config::ConfigService,
    config_port::ConfigPort,
    notice::{NoticeBoard, NoticeKind},
    render_port::{caption_for, RenderPort},
};
use dae_config_fs::FsConfigStore;
use dae_scene::Editor;
use egui_winit::winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    window::{Window, WindowAttributes},
};
use egui_winit::State as EguiWinitState;
use std::path::Path;
use std::time::Duration;

pub const APP_NAME: &str = "DAE Stage";

pub struct App {
    pub viewports: Vec<Viewport>,
    pub egui_ctx: egui::Context,
    pub config: Option<Box<dyn ConfigPort>>,
    pub ui_runner: ui_effects::RealEffectsRunner,
    pub notices: NoticeBoard,
    pub ui: UiState,
    pub viewer: ViewerState,
    pub editor: Editor,
    caption: Option<String>,
    shutdown_requested: bool,
}

impl App {
    pub fn new(args: Args) -> Self {
        let egui_ctx = egui::Context::default();
        let config = FsConfigStore::new()
            .map(ConfigService::new)
            .map(|svc| Box::new(svc) as Box<dyn ConfigPort>)
            .ok();
        let prefs = config
            .as_ref()
            .and_then(|c| c.load_prefs())
            .unwrap_or_default();
        let mut notices = NoticeBoard::new(16);
        let mut viewer = ViewerState::default();
        if config.is_none() {
            notices.raise(
                NoticeKind::Warn,
                "Config store unavailable",
                Some(String::from(
                    "FsConfigStore init failed; prefs won't persist this session",
                )),
                Duration::from_secs(6),
                viewer.now(),
            );
        }

        let mut editor = Editor::new();
        viewer.apply_prefs(&prefs, &mut editor);
        viewer.load_options = args.load_options(viewer.convert_up_axis);
        if let Some(size) = args.grid {
            editor.set_grid(size);
        }
        editor.watch(viewer.watch_listener());

        let mut app = Self {
            viewports: Vec::new(),
            egui_ctx,
            config,
            ui_runner: ui_effects::RealEffectsRunner,
            notices,
            ui: UiState::new(),
            viewer,
            editor,
            caption: None,
            shutdown_requested: false,
        };

        let startup = args
            .model
            .map(|p| p.display().to_string())
            .or_else(|| app.viewer.last_model.clone().filter(|p| Path::new(p).is_file()));
        if let Some(path) = startup {
            app.apply_ui_event(ui_state::UiEvent::OpenPathChanged(path));
            app.apply_ui_event(ui_state::UiEvent::OpenSubmit);
        }
        app
    }

    pub fn apply_ui_event(&mut self, ev: ui_state::UiEvent) {
        if matches!(ev, ui_state::UiEvent::ShutdownRequested) {
            self.shutdown_requested = true;
        }
        let (next, effects) = ui_state::reduce(&self.ui, ev);
        self.ui = next;
        let now = self.viewer.now();
        let followups = self.ui_runner.run(
            effects,
            EffectCtx {
                editor: &mut self.editor,
                viewer: &mut self.viewer,
                config: self.config.as_deref(),
                notices: &mut self.notices,
                now,
            },
        );
        for ev in followups {
            self.apply_ui_event(ev);
        }
    }

    /// Keep the window title in sync with the loaded model.
    pub fn sync_caption(&mut self) {
        let Some(vp) = self.viewports.first() else {
            return;
        };
        let caption = caption_for(APP_NAME, self.ui.model_source.as_deref());
        if self.caption.as_deref() != Some(caption.as_str()) {
            vp.render_port.set_caption(&caption);
            self.caption = Some(caption);
        }
    }

    fn create_viewport(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop.create_window(
            WindowAttributes::default()
                .with_title(APP_NAME)
                .with_visible(true),
        )?;
        let window: &'static Window = Box::leak(Box::new(window));
        let gpu = pollster::block_on(crate::gpu::Gpu::new(window, self.viewer.vsync))?;
        let egui_state = EguiWinitState::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            event_loop,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.config.format,
            egui_wgpu::RendererOptions::default(),
        );
        self.editor
            .camera_mut()
            .set_aspect(gpu.config.width as f32, gpu.config.height as f32);
        self.editor.request_redraw();
        let render_port = WinitRenderPort::new(window);
        self.viewports.push(Viewport {
            window,
            gpu,
            egui_state,
            egui_renderer,
            render_port,
        });
        self.sync_caption();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.viewports.is_empty() {
            return;
        }
        if let Err(err) = self.create_viewport(event_loop) {
            tracing::error!("viewer init failed: {err:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: egui_winit::winit::window::WindowId,
        event: WindowEvent,
    ) {
        self.handle_window_event(window_id, event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewports.is_empty() {
            return;
        }
        if self.shutdown_requested {
            if let Some(cfg) = &self.config {
                cfg.save_prefs(&self.viewer.export_prefs(&self.editor));
            }
            event_loop.exit();
            return;
        }
        let now = self.viewer.now();
        let tick = self.editor.tick(now);
        if tick.redraw {
            if let Some(vp) = self.viewports.first() {
                vp.render_port.request_redraw();
            }
        }
        let flow = match self.editor.next_redraw() {
            Some(deadline) => ControlFlow::WaitUntil(self.viewer.started + deadline),
            None if !self.notices.is_empty() => {
                ControlFlow::WaitUntil(self.viewer.started + now + Duration::from_millis(250))
            }
            None => ControlFlow::Wait,
        };
        event_loop.set_control_flow(flow);
    }
}

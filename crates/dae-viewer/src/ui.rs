// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stateless egui render helpers for the viewer HUD, inspector and overlays.

use crate::{app::App, core::ViewerOverlay, ui_state::UiEvent};
use dae_app_core::notice::NoticeKind;
use dae_scene::gizmo::{GizmoAxis, GizmoMode};
use egui::{self, Align2, Color32, Context, FontId, Stroke};
use glam::Vec2;

fn axis_color(axis: GizmoAxis) -> Color32 {
    let [r, g, b] = axis.color();
    Color32::from(egui::Rgba::from_rgb(r, g, b))
}

pub fn draw_view_hud(ctx: &Context, app: &mut App, viewport_px: Vec2, pixels_per_point: f32) {
    paint_scene_overlay(ctx, app, viewport_px, pixels_per_point);

    egui::Area::new("menu_button".into())
        .anchor(Align2::LEFT_TOP, egui::vec2(12.0, 12.0))
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Menu").clicked() {
                    app.apply_ui_event(UiEvent::OpenMenu);
                }
                if ui.button("Open...").clicked() {
                    app.apply_ui_event(UiEvent::OpenFileOverlay);
                }
                if app.ui.loading {
                    ui.spinner();
                }
            });
        });

    let now = app.viewer.now();
    egui::Area::new("notices".into())
        .anchor(Align2::CENTER_TOP, egui::vec2(0.0, 12.0))
        .show(ctx, |ui| {
            for n in app.notices.visible(now) {
                let color = match n.kind {
                    NoticeKind::Info => Color32::LIGHT_BLUE,
                    NoticeKind::Warn => Color32::YELLOW,
                    NoticeKind::Error => Color32::LIGHT_RED,
                };
                let alpha = n.remaining(now).max(0.25);
                let title = if n.repeats > 1 {
                    format!("{} (x{})", n.title, n.repeats)
                } else {
                    n.title.clone()
                };
                ui.colored_label(color.gamma_multiply(alpha), title);
                if let Some(detail) = &n.detail {
                    ui.label(detail);
                }
            }
        });

    if app.viewer.show_inspector {
        egui::SidePanel::right("inspector")
            .default_width(260.0)
            .show(ctx, |ui| draw_inspector(ui, app));
    }

    egui::Area::new("perf".into())
        .anchor(Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            let avg = app.viewer.perf.avg_ms();
            let fps = if avg > 0.0 { 1000.0 / avg } else { 0.0 };
            ui.label(format!(
                "{avg:.2} ms ({fps:.0} fps) | {} frames",
                app.viewer.perf.frames_drawn()
            ));
        });

    egui::Area::new("controls".into())
        .anchor(Align2::LEFT_BOTTOM, egui::vec2(12.0, -36.0))
        .show(ctx, |ui| {
            ui.label(format!(
                "L-drag handle: {} | L-drag space: orbit | Wheel zoom | R-click cycle mode | O open",
                app.editor.mode()
            ));
        });

    draw_overlay(ctx, app);
}

fn draw_inspector(ui: &mut egui::Ui, app: &mut App) {
    let now = app.viewer.now();
    ui.heading("Model");
    match app.editor.model() {
        Some(m) => {
            ui.label(m.source.as_deref().unwrap_or("(unnamed)"));
            ui.label(format!("{} triangles", m.mesh.triangle_count()));
        }
        None => {
            ui.label("No model loaded. Press O or drop a .dae file.");
        }
    }

    if let Some(state) = app.editor.state() {
        ui.separator();
        let mut scale = state.scale;
        if ui
            .add(
                egui::DragValue::new(&mut scale)
                    .speed(0.01)
                    .range(0.001..=1000.0)
                    .prefix("scale "),
            )
            .changed()
        {
            app.editor.scale(scale, now);
        }

        let mut pos = [state.position.x, state.position.y, state.position.z];
        if axis_row(ui, "position", &mut pos, 0.1, "") {
            app.editor.translate(pos[0], pos[1], pos[2], now);
        }

        let mut rot = [
            state.rotation.x.to_degrees(),
            state.rotation.y.to_degrees(),
            state.rotation.z.to_degrees(),
        ];
        if axis_row(ui, "rotation", &mut rot, 1.0, "\u{b0}") {
            app.editor.rotate(rot[0], rot[1], rot[2], now);
        }

        if let Some(center) = app.editor.model_center() {
            if ui.button("Focus model").clicked() {
                app.editor.camera_mut().target = center;
                app.editor.request_redraw();
            }
        }
    }

    ui.separator();
    ui.label("Handles");
    let mut mode = app.editor.mode();
    ui.horizontal(|ui| {
        for m in GizmoMode::ALL {
            ui.selectable_value(&mut mode, m, m.label());
        }
    });
    if mode != app.editor.mode() {
        app.editor.set_mode(mode);
    }

    ui.separator();
    let mut grid = app.editor.grid().size;
    if ui
        .add(
            egui::DragValue::new(&mut grid)
                .speed(1.0)
                .range(1.0..=10_000.0)
                .prefix("grid "),
        )
        .changed()
    {
        app.editor.set_grid(grid);
    }
    let mut redraw = ui.checkbox(&mut app.viewer.show_grid_labels, "Grid labels").changed();
    redraw |= ui.checkbox(&mut app.viewer.wireframe, "Wireframe").changed();
    if redraw {
        app.editor.request_redraw();
    }

    ui.separator();
    egui::CollapsingHeader::new("State changes")
        .default_open(true)
        .show(ui, |ui| {
            let log = app.viewer.watch_log.borrow();
            if log.is_empty() {
                ui.weak("none yet");
            }
            for line in log.iter().rev() {
                ui.monospace(line);
            }
        });
}

fn axis_row(ui: &mut egui::Ui, label: &str, v: &mut [f32; 3], speed: f64, suffix: &str) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        for (c, name) in v.iter_mut().zip(["x ", "y ", "z "]) {
            changed |= ui
                .add(
                    egui::DragValue::new(c)
                        .speed(speed)
                        .prefix(name)
                        .suffix(suffix),
                )
                .changed();
        }
    });
    changed
}

/// Grid labels and gizmo handles, painted behind the egui windows.
fn paint_scene_overlay(ctx: &Context, app: &App, viewport_px: Vec2, pixels_per_point: f32) {
    let painter = ctx.layer_painter(egui::LayerId::background());
    let to_pos = |p: Vec2| egui::pos2(p.x / pixels_per_point, p.y / pixels_per_point);
    let camera = app.editor.camera();

    if app.viewer.show_grid_labels {
        for label in app.editor.grid().labels() {
            if let Some(p) = camera.project(label.position, viewport_px) {
                painter.text(
                    to_pos(p),
                    Align2::CENTER_BOTTOM,
                    &label.text,
                    FontId::monospace(12.0),
                    Color32::from_gray(230),
                );
            }
        }
    }

    let Some(handles) = app.editor.gizmo_handles(viewport_px) else {
        return;
    };
    let mode = app.editor.mode();
    for h in &handles.handles {
        let color = axis_color(h.axis);
        let stroke = Stroke::new(3.0, color);
        let (a, b) = (to_pos(h.start), to_pos(h.end));
        match mode {
            GizmoMode::Translate => painter.arrow(a, b - a, stroke),
            GizmoMode::Scale => {
                painter.line_segment([a, b], stroke);
                painter.rect_filled(
                    egui::Rect::from_center_size(b, egui::vec2(10.0, 10.0)),
                    egui::CornerRadius::ZERO,
                    color,
                );
            }
            GizmoMode::Rotate => {
                painter.line_segment([a, b], stroke);
                painter.circle_stroke(b, 7.0, stroke);
            }
        }
    }
}

fn draw_overlay(ctx: &Context, app: &mut App) {
    match app.ui.overlay {
        ViewerOverlay::None => {}
        ViewerOverlay::Menu => {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.heading(crate::app::APP_NAME);
                    ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(20.0);
                    if ui.button("Open model").clicked() {
                        app.apply_ui_event(UiEvent::OpenFileOverlay);
                    }
                    if ui.button("Settings").clicked() {
                        app.apply_ui_event(UiEvent::OpenSettingsOverlay);
                    }
                    if ui.button("Exit").clicked() {
                        app.apply_ui_event(UiEvent::ExitClicked);
                    }
                    if ui.button("Back").clicked() {
                        app.apply_ui_event(UiEvent::CloseOverlay);
                    }
                });
            });
        }
        ViewerOverlay::Settings => {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Viewer Settings");
                ui.separator();
                ui.checkbox(&mut app.viewer.vsync, "Enable VSync");
                ui.checkbox(&mut app.viewer.wireframe, "Wireframe mode");
                ui.checkbox(&mut app.viewer.show_inspector, "Show inspector");
                ui.checkbox(&mut app.viewer.show_grid_labels, "Show grid labels");
                if ui
                    .checkbox(&mut app.viewer.convert_up_axis, "Convert Z-up models to Y-up")
                    .changed()
                {
                    app.viewer.load_options.convert_up_axis = app.viewer.convert_up_axis;
                }
                ui.add_space(12.0);
                if ui.button("Save").clicked() {
                    app.apply_ui_event(UiEvent::SavePrefs);
                }
                if ui.button("Close").clicked() {
                    app.apply_ui_event(UiEvent::CloseOverlay);
                }
            });
        }
        ViewerOverlay::Open => {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Open COLLADA model");
                ui.label("Path to a .dae file (or drop one onto the window):");
                let mut path = app.ui.open_path.clone();
                let edit = ui.text_edit_singleline(&mut path);
                if edit.changed() {
                    app.apply_ui_event(UiEvent::OpenPathChanged(path));
                }
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.add_space(12.0);
                if ui.button("Load").clicked() || submitted {
                    app.apply_ui_event(UiEvent::OpenSubmit);
                }
                if ui.button("Cancel").clicked() {
                    app.apply_ui_event(UiEvent::CloseOverlay);
                }
            });
        }
    }
}

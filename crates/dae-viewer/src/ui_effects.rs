// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Effect runner for UiEffect -> concrete ports; includes a simple fake for tests.

use crate::ui_state::{UiEffect, UiEvent};
use crate::viewer_state::ViewerState;
use dae_app_core::{
    config_port::ConfigPort,
    notice::{NoticeBoard, NoticeKind},
};
use dae_scene::{Editor, LoadOptions, ModelMesh};
use std::path::Path;
use std::time::Duration;

const NOTICE_TTL: Duration = Duration::from_secs(6);

/// Everything an effect may touch.
pub struct EffectCtx<'a> {
    pub editor: &'a mut Editor,
    pub viewer: &'a mut ViewerState,
    pub config: Option<&'a dyn ConfigPort>,
    pub notices: &'a mut NoticeBoard,
    pub now: Duration,
}

pub trait UiEffectsRunner {
    /// Run effects, possibly emitting follow-up events (e.g., failures).
    fn run(&mut self, effects: Vec<UiEffect>, ctx: EffectCtx<'_>) -> Vec<UiEvent>;
}

pub struct RealEffectsRunner;

impl UiEffectsRunner for RealEffectsRunner {
    fn run(&mut self, effects: Vec<UiEffect>, ctx: EffectCtx<'_>) -> Vec<UiEvent> {
        let mut followups = Vec::new();
        for eff in effects {
            match eff {
                UiEffect::LoadModel(path) => {
                    followups.push(load_model(&path, ctx.editor, ctx.viewer, ctx.notices, ctx.now));
                }
                UiEffect::SavePrefs => match ctx.config {
                    Some(cfg) => {
                        cfg.save_prefs(&ctx.viewer.export_prefs(ctx.editor));
                        ctx.notices.raise(
                            NoticeKind::Info,
                            "Preferences saved",
                            None,
                            Duration::from_secs(3),
                            ctx.now,
                        );
                    }
                    None => ctx.notices.raise(
                        NoticeKind::Warn,
                        "Preferences not saved",
                        Some("No config store is available this session".into()),
                        NOTICE_TTL,
                        ctx.now,
                    ),
                },
                UiEffect::QuitApp => {
                    followups.push(UiEvent::ShutdownRequested);
                }
            }
        }
        followups
    }
}

/// Load `path` into the editor with the pending load options.
///
/// The pending options (CLI placement) apply to the first load only; later
/// loads start from defaults with the current up-axis setting. The current
/// model is detached before the file is read, so a failed load leaves the
/// scene empty.
pub fn load_model(
    path: &Path,
    editor: &mut Editor,
    viewer: &mut ViewerState,
    notices: &mut NoticeBoard,
    now: Duration,
) -> UiEvent {
    let opts = viewer.load_options;
    editor.unload();
    match ModelMesh::from_collada_file(path, opts.convert_up_axis) {
        Ok(mesh) => {
            let source = path.display().to_string();
            editor.load(mesh, Some(source.clone()), &opts, now);
            viewer.load_options = LoadOptions {
                convert_up_axis: viewer.convert_up_axis,
                ..LoadOptions::default()
            };
            viewer.last_model = Some(source.clone());
            UiEvent::ModelLoaded(source)
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "model load failed");
            let msg = err.to_string();
            notices.raise(
                NoticeKind::Error,
                "Could not load model",
                Some(msg.clone()),
                NOTICE_TTL,
                now,
            );
            UiEvent::LoadFailed(msg)
        }
    }
}

/// Test fake: records effects and lets tests inject load failures.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeEffectsRunner {
    pub calls: Vec<UiEffect>,
    pub fail_load: bool,
}

impl UiEffectsRunner for FakeEffectsRunner {
    fn run(&mut self, effects: Vec<UiEffect>, _ctx: EffectCtx<'_>) -> Vec<UiEvent> {
        let mut followups = Vec::new();
        for eff in effects {
            match &eff {
                UiEffect::LoadModel(path) if self.fail_load => {
                    followups.push(UiEvent::LoadFailed(format!("cannot read {}", path.display())));
                }
                UiEffect::LoadModel(path) => {
                    followups.push(UiEvent::ModelLoaded(path.display().to_string()));
                }
                UiEffect::QuitApp => followups.push(UiEvent::ShutdownRequested),
                UiEffect::SavePrefs => {}
            }
            self.calls.push(eff);
        }
        followups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dae_app_core::prefs::EditorPrefs;
    use std::cell::RefCell;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingPort {
        saved: RefCell<Vec<EditorPrefs>>,
    }

    impl ConfigPort for RecordingPort {
        fn load_prefs(&self) -> Option<EditorPrefs> {
            None
        }
        fn save_prefs(&self, prefs: &EditorPrefs) {
            self.saved.borrow_mut().push(prefs.clone());
        }
    }

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../dae-scene/tests/fixtures/triangle.dae")
    }

    fn run(
        runner: &mut impl UiEffectsRunner,
        effects: Vec<UiEffect>,
        editor: &mut Editor,
        viewer: &mut ViewerState,
        config: Option<&dyn ConfigPort>,
        notices: &mut NoticeBoard,
    ) -> Vec<UiEvent> {
        runner.run(
            effects,
            EffectCtx {
                editor,
                viewer,
                config,
                notices,
                now: Duration::ZERO,
            },
        )
    }

    #[test]
    fn missing_file_raises_error_notice_and_keeps_scene_empty() {
        let mut editor = Editor::new();
        let mut viewer = ViewerState::default();
        let mut notices = NoticeBoard::new(4);
        let out = run(
            &mut RealEffectsRunner,
            vec![UiEffect::LoadModel("/definitely/not/here.dae".into())],
            &mut editor,
            &mut viewer,
            None,
            &mut notices,
        );
        assert!(matches!(out.as_slice(), [UiEvent::LoadFailed(_)]));
        assert!(editor.model().is_none());
        let n = notices.visible(Duration::ZERO).next().unwrap();
        assert_eq!(n.kind, NoticeKind::Error);
    }

    #[test]
    fn failed_reload_drops_the_previous_model() {
        let mut editor = Editor::new();
        let mut viewer = ViewerState::default();
        let mut notices = NoticeBoard::new(4);
        let out = run(
            &mut RealEffectsRunner,
            vec![
                UiEffect::LoadModel(fixture()),
                UiEffect::LoadModel("/definitely/not/here.dae".into()),
            ],
            &mut editor,
            &mut viewer,
            None,
            &mut notices,
        );
        assert!(matches!(
            out.as_slice(),
            [UiEvent::ModelLoaded(_), UiEvent::LoadFailed(_)]
        ));
        assert!(editor.model().is_none());
        assert!(!editor.scale(2.0, Duration::ZERO));
    }

    #[test]
    fn first_load_uses_cli_placement_then_resets() {
        let mut editor = Editor::new();
        let mut viewer = ViewerState::default();
        viewer.load_options.scale = 4.0;
        let mut notices = NoticeBoard::new(4);
        let out = run(
            &mut RealEffectsRunner,
            vec![UiEffect::LoadModel(fixture())],
            &mut editor,
            &mut viewer,
            None,
            &mut notices,
        );
        assert!(matches!(out.as_slice(), [UiEvent::ModelLoaded(_)]));
        assert_eq!(editor.state().unwrap().scale, 4.0);
        assert_eq!(viewer.load_options.scale, 1.0);
        assert!(viewer.last_model.is_some());
    }

    #[test]
    fn save_prefs_goes_through_the_port() {
        let mut editor = Editor::new();
        editor.set_grid(64.0);
        let mut viewer = ViewerState::default();
        let mut notices = NoticeBoard::new(4);
        let port = RecordingPort::default();
        run(
            &mut RealEffectsRunner,
            vec![UiEffect::SavePrefs],
            &mut editor,
            &mut viewer,
            Some(&port),
            &mut notices,
        );
        let saved = port.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].scene.grid_size, 64.0);
    }

    #[test]
    fn save_without_store_warns() {
        let mut editor = Editor::new();
        let mut viewer = ViewerState::default();
        let mut notices = NoticeBoard::new(4);
        run(
            &mut RealEffectsRunner,
            vec![UiEffect::SavePrefs],
            &mut editor,
            &mut viewer,
            None,
            &mut notices,
        );
        assert_eq!(
            notices.visible(Duration::ZERO).next().map(|n| n.kind),
            Some(NoticeKind::Warn)
        );
    }

    #[test]
    fn fake_runner_records_and_fails_on_demand() {
        let mut fake = FakeEffectsRunner {
            fail_load: true,
            ..Default::default()
        };
        let mut editor = Editor::new();
        let mut viewer = ViewerState::default();
        let mut notices = NoticeBoard::new(4);
        let out = run(
            &mut fake,
            vec![UiEffect::LoadModel("x.dae".into()), UiEffect::QuitApp],
            &mut editor,
            &mut viewer,
            None,
            &mut notices,
        );
        assert_eq!(fake.calls.len(), 2);
        assert!(matches!(out[0], UiEvent::LoadFailed(_)));
        assert!(matches!(out[1], UiEvent::ShutdownRequested));
    }
}

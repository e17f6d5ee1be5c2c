// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pure state transitions for the viewer UI (overlays, open dialog, menu actions).

use crate::core::{UiState, ViewerOverlay};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum UiEvent {
    OpenMenu,
    CloseOverlay,
    OpenSettingsOverlay,
    OpenFileOverlay,
    OpenPathChanged(String),
    OpenSubmit,
    FileDropped(PathBuf),
    ModelLoaded(String),
    LoadFailed(String),
    SavePrefs,
    ExitClicked,
    ShutdownRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    LoadModel(PathBuf),
    SavePrefs,
    QuitApp,
}

pub fn reduce(ui: &UiState, ev: UiEvent) -> (UiState, Vec<UiEffect>) {
    let mut next = ui.clone();
    let mut fx = Vec::new();
    match ev {
        UiEvent::OpenMenu => next.overlay = ViewerOverlay::Menu,
        UiEvent::CloseOverlay => next.overlay = ViewerOverlay::None,
        UiEvent::OpenSettingsOverlay => next.overlay = ViewerOverlay::Settings,
        UiEvent::OpenFileOverlay => {
            if next.open_path.is_empty() {
                if let Some(src) = &next.model_source {
                    next.open_path = src.clone();
                }
            }
            next.overlay = ViewerOverlay::Open;
        }
        UiEvent::OpenPathChanged(p) => next.open_path = p,
        UiEvent::OpenSubmit => {
            let path = next.open_path.trim();
            if !path.is_empty() {
                fx.push(UiEffect::LoadModel(PathBuf::from(path)));
                next.loading = true;
                next.overlay = ViewerOverlay::None;
            }
        }
        UiEvent::FileDropped(path) => {
            if is_collada(&path) {
                next.open_path = path.display().to_string();
                next.loading = true;
                fx.push(UiEffect::LoadModel(path));
            }
        }
        UiEvent::ModelLoaded(source) => {
            next.model_source = Some(source);
            next.loading = false;
        }
        UiEvent::LoadFailed(_) => next.loading = false,
        UiEvent::SavePrefs => {
            fx.push(UiEffect::SavePrefs);
            next.overlay = ViewerOverlay::None;
        }
        UiEvent::ExitClicked => fx.push(UiEffect::QuitApp),
        UiEvent::ShutdownRequested => {
            // handled by App
        }
    }
    (next, fx)
}

/// `.dae` extension, any case.
pub fn is_collada(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("dae"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlays_open_and_close() {
        let ui = UiState::new();
        let (ui2, _) = reduce(&ui, UiEvent::OpenMenu);
        assert_eq!(ui2.overlay, ViewerOverlay::Menu);
        let (ui3, _) = reduce(&ui2, UiEvent::CloseOverlay);
        assert_eq!(ui3.overlay, ViewerOverlay::None);
    }

    #[test]
    fn open_submit_requests_load_and_closes_dialog() {
        let ui = UiState::new();
        let (ui, _) = reduce(&ui, UiEvent::OpenFileOverlay);
        let (ui, _) = reduce(&ui, UiEvent::OpenPathChanged("  models/duck.dae ".into()));
        let (ui, fx) = reduce(&ui, UiEvent::OpenSubmit);
        assert_eq!(fx, vec![UiEffect::LoadModel(PathBuf::from("models/duck.dae"))]);
        assert!(ui.loading);
        assert_eq!(ui.overlay, ViewerOverlay::None);
    }

    #[test]
    fn blank_path_does_nothing() {
        let ui = UiState::new();
        let (ui2, fx) = reduce(&ui, UiEvent::OpenSubmit);
        assert!(fx.is_empty());
        assert!(!ui2.loading);
    }

    #[test]
    fn only_dae_drops_load() {
        let ui = UiState::new();
        let (_, fx) = reduce(&ui, UiEvent::FileDropped("notes.txt".into()));
        assert!(fx.is_empty());
        let (ui2, fx) = reduce(&ui, UiEvent::FileDropped("ship.DAE".into()));
        assert_eq!(fx.len(), 1);
        assert_eq!(ui2.open_path, "ship.DAE");
    }

    #[test]
    fn load_outcome_clears_busy_flag() {
        let mut ui = UiState::new();
        ui.loading = true;
        let (ok, _) = reduce(&ui, UiEvent::ModelLoaded("a.dae".into()));
        assert!(!ok.loading);
        assert_eq!(ok.model_source.as_deref(), Some("a.dae"));
        let (failed, _) = reduce(&ui, UiEvent::LoadFailed("boom".into()));
        assert!(!failed.loading);
        assert!(failed.model_source.is_none());
    }

    #[test]
    fn open_dialog_prefills_current_model() {
        let mut ui = UiState::new();
        ui.model_source = Some("/m/duck.dae".into());
        let (ui2, _) = reduce(&ui, UiEvent::OpenFileOverlay);
        assert_eq!(ui2.open_path, "/m/duck.dae");
    }

    #[test]
    fn save_and_exit_emit_effects() {
        let ui = UiState::new();
        let (_, fx) = reduce(&ui, UiEvent::SavePrefs);
        assert_eq!(fx, vec![UiEffect::SavePrefs]);
        let (_, fx) = reduce(&ui, UiEvent::ExitClicked);
        assert_eq!(fx, vec![UiEffect::QuitApp]);
    }
}

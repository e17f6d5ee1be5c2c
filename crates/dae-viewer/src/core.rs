// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Domain-level UI state for the viewer (overlays, panel inputs, load status).

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerOverlay {
    None,
    Menu,
    Settings,
    Open,
}

#[derive(Clone, Debug)]
pub struct UiState {
    pub overlay: ViewerOverlay,
    /// Path typed into the open dialog.
    pub open_path: String,
    /// Source of the model currently shown.
    pub model_source: Option<String>,
    /// A load is queued or running.
    pub loading: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            overlay: ViewerOverlay::None,
            open_path: String::new(),
            model_source: None,
            loading: false,
        }
    }
}

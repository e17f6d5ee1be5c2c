// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config port shared by the viewer and other hosts.

use crate::prefs::EditorPrefs;

/// Config-facing port for loading/saving editor preferences.
pub trait ConfigPort {
    /// Load editor preferences (returns None if missing or unreadable).
    fn load_prefs(&self) -> Option<EditorPrefs>;
    /// Persist editor preferences (best-effort; failures are logged).
    fn save_prefs(&self, prefs: &EditorPrefs);
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-frame transform polling with change listeners.
//!
//! The watcher keeps the last snapshot it saw. Each [`StateWatcher::poll`]
//! compares the current display snapshot against it and, on a change, calls
//! every listener in registration order.
//!
//! Invariants:
//! - A listener never receives two equal (within epsilon) snapshots in a row.
//! - Losing the model clears the cache silently; the next model notifies.
//! - A freshly registered listener receives the current snapshot on the next
//!   poll even if nothing changed, so hosts can render initial state.

use crate::{state::TransformState, transform::ModelTransform};

/// Default tolerance when comparing snapshots.
pub const DEFAULT_EPSILON: f32 = 1e-4;

/// Handle returned by [`StateWatcher::watch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u32);

/// Callback invoked with the new display snapshot.
pub type Listener = Box<dyn FnMut(&TransformState)>;

struct Entry {
    id: WatchId,
    primed: bool,
    listener: Listener,
}

/// Polls a transform and notifies listeners on change.
pub struct StateWatcher {
    entries: Vec<Entry>,
    cache: Option<TransformState>,
    epsilon: f32,
    next_id: u32,
}

impl Default for StateWatcher {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl StateWatcher {
    /// Create a watcher comparing snapshots within `epsilon`.
    pub fn new(epsilon: f32) -> Self {
        Self {
            entries: Vec::new(),
            cache: None,
            epsilon: epsilon.abs(),
            next_id: 1,
        }
    }

    /// Register a listener. Ids are never zero and never shared by two live
    /// listeners, even after the counter wraps.
    pub fn watch(&mut self, listener: impl FnMut(&TransformState) + 'static) -> WatchId {
        let id = self.allocate_id();
        self.entries.push(Entry {
            id,
            primed: true,
            listener: Box::new(listener),
        });
        id
    }

    fn allocate_id(&mut self) -> WatchId {
        loop {
            let id = WatchId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1).max(1);
            if !self.entries.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    /// Remove a listener. Returns false when `id` was unknown.
    pub fn unwatch(&mut self, id: WatchId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last snapshot seen by [`poll`](Self::poll).
    pub fn last(&self) -> Option<&TransformState> {
        self.cache.as_ref()
    }

    /// Compare `current` against the cached snapshot and notify on change.
    /// Returns true when at least one listener ran.
    pub fn poll(&mut self, current: Option<&ModelTransform>) -> bool {
        let Some(t) = current else {
            self.cache = None;
            return false;
        };
        let snap = TransformState::display(t);
        let changed = self
            .cache
            .map_or(true, |prev| !prev.approx_eq(&snap, self.epsilon));
        if changed {
            self.cache = Some(snap);
        }

        let mut notified = false;
        for entry in &mut self.entries {
            if changed || entry.primed {
                (entry.listener)(&snap);
                notified = true;
            }
            entry.primed = false;
        }
        if notified {
            tracing::trace!(listeners = self.entries.len(), "transform state changed");
        }
        notified
    }
}

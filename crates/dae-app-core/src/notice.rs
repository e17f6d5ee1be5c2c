// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! User-facing notices (load failures, saved prefs) with TTL and dedupe.
//!
//! Time is passed in explicitly as a `Duration` since host start so the
//! queue behaves identically on native and WASM hosts.

use std::collections::VecDeque;
use std::time::Duration;

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational note.
    Info,
    /// Something went wrong but the editor kept its previous state.
    Warn,
    /// An operation failed.
    Error,
}

/// A queued notice.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Short title line.
    pub title: String,
    /// Optional detail text.
    pub detail: Option<String>,
    /// When the notice was (last) raised.
    pub raised_at: Duration,
    /// How long the notice stays visible.
    pub ttl: Duration,
    /// How many times an identical notice was raised inside the dedupe window.
    pub repeats: u32,
}

impl Notice {
    /// Remaining visibility in `[0, 1]` at `now`; 1.0 means just raised.
    pub fn remaining(&self, now: Duration) -> f32 {
        if self.ttl.is_zero() {
            return 0.0;
        }
        let age = now.saturating_sub(self.raised_at);
        (1.0 - age.as_secs_f32() / self.ttl.as_secs_f32()).clamp(0.0, 1.0)
    }

    fn expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.raised_at) >= self.ttl
    }
}

/// Bounded notice queue.
pub struct NoticeBoard {
    queue: VecDeque<Notice>,
    capacity: usize,
    dedupe_window: Duration,
}

impl NoticeBoard {
    /// Create a board holding at most `capacity` notices (oldest evicted first).
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            dedupe_window: Duration::from_millis(500),
        }
    }

    /// Raise a notice. An identical notice raised within the dedupe window is
    /// refreshed instead of duplicated.
    pub fn raise(
        &mut self,
        kind: NoticeKind,
        title: impl Into<String>,
        detail: Option<String>,
        ttl: Duration,
        now: Duration,
    ) {
        let title = title.into();
        if let Some(existing) = self.queue.iter_mut().find(|n| {
            n.kind == kind
                && n.title == title
                && n.detail == detail
                && now.saturating_sub(n.raised_at) <= self.dedupe_window
        }) {
            existing.raised_at = now;
            existing.ttl = ttl;
            existing.repeats += 1;
            return;
        }
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice {
            kind,
            title,
            detail,
            raised_at: now,
            ttl,
            repeats: 1,
        });
    }

    /// Drop expired notices; call once per frame.
    pub fn prune(&mut self, now: Duration) {
        self.queue.retain(|n| !n.expired(now));
    }

    /// Notices still visible at `now`, oldest first.
    pub fn visible(&self, now: Duration) -> impl Iterator<Item = &Notice> {
        self.queue.iter().filter(move |n| !n.expired(now))
    }

    /// Number of queued notices (including ones not yet pruned).
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TTL: Duration = Duration::from_secs(4);

    #[test]
    fn identical_notices_within_window_are_merged() {
        let mut board = NoticeBoard::new(8);
        board.raise(NoticeKind::Error, "Load failed", None, TTL, Duration::ZERO);
        board.raise(
            NoticeKind::Error,
            "Load failed",
            None,
            TTL,
            Duration::from_millis(200),
        );
        assert_eq!(board.len(), 1);
        let n = board.visible(Duration::from_millis(200)).next().unwrap();
        assert_eq!(n.repeats, 2);
        assert_eq!(n.raised_at, Duration::from_millis(200));
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut board = NoticeBoard::new(2);
        for (i, title) in ["a", "b", "c"].into_iter().enumerate() {
            board.raise(NoticeKind::Info, title, None, TTL, Duration::from_secs(i as u64));
        }
        let titles: Vec<_> = board
            .visible(Duration::from_secs(2))
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(titles, ["b", "c"]);
    }

    #[test]
    fn prune_drops_expired_and_remaining_decays() {
        let mut board = NoticeBoard::new(4);
        board.raise(NoticeKind::Warn, "slow", None, TTL, Duration::ZERO);
        let half = board.visible(Duration::from_secs(2)).next().unwrap().remaining(Duration::from_secs(2));
        assert_relative_eq!(half, 0.5, epsilon = 1e-6);
        board.prune(Duration::from_secs(4));
        assert!(board.is_empty());
    }
}

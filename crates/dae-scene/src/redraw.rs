// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deferred redraw requests.
//!
//! Transform setters ask for a redraw a short while later rather than
//! immediately, so a burst of host calls collapses into one frame.

use std::time::Duration;

/// Delay applied to redraws requested by transform setters.
pub const TRANSFORM_REDRAW_DELAY: Duration = Duration::from_millis(100);

/// Earliest pending redraw deadline, in time since host start.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RedrawSchedule {
    deadline: Option<Duration>,
}

impl RedrawSchedule {
    /// Request a redraw no later than `deadline`. Earlier deadlines win.
    pub fn request_at(&mut self, deadline: Duration) {
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
    }

    /// Request a redraw on the next frame.
    pub fn request_now(&mut self) {
        self.deadline = Some(Duration::ZERO);
    }

    /// Pending deadline, if any.
    pub fn pending(&self) -> Option<Duration> {
        self.deadline
    }

    /// True (and clears the request) when a redraw is due at `now`.
    pub fn due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(d) if d <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_request_fires_once_after_deadline() {
        let mut s = RedrawSchedule::default();
        s.request_at(Duration::from_millis(100));
        assert!(!s.due(Duration::from_millis(99)));
        assert!(s.due(Duration::from_millis(100)));
        assert!(!s.due(Duration::from_millis(200)));
    }

    #[test]
    fn earliest_deadline_wins() {
        let mut s = RedrawSchedule::default();
        s.request_at(Duration::from_millis(300));
        s.request_at(Duration::from_millis(150));
        s.request_at(Duration::from_millis(400));
        assert_eq!(s.pending(), Some(Duration::from_millis(150)));
        s.request_now();
        assert!(s.due(Duration::ZERO));
    }
}

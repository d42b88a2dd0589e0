//! Periodic auto-save.
//!
//! The timer only decides *when* a sweep is due; the sweep itself
//! ([`crate::Editor::auto_save_tick`]) runs synchronously to completion, so
//! two sweeps can never overlap.

use std::time::{Duration, Instant};

use crate::CoreError;
use crate::document::SessionId;

/// Fires at most once per interval.
#[derive(Debug, Clone)]
pub struct AutoSaveTimer {
    interval: Duration,
    /// Last time the timer fired (or was started)
    last_fired: Instant,
}

impl AutoSaveTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_fired: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes the interval and restarts the countdown from `now`.
    pub fn restart(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.last_fired = now;
    }

    /// When the next sweep becomes due.
    pub fn next_due(&self) -> Instant {
        self.last_fired + self.interval
    }

    /// Returns true if a sweep is due at `now`, and starts the next
    /// countdown.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due() {
            return false;
        }
        self.last_fired = now;
        true
    }
}

/// Outcome of one auto-save sweep.
#[derive(Debug, Default)]
pub struct AutoSaveReport {
    /// Sessions written to their files
    pub saved: Vec<SessionId>,
    /// Sessions without a path, left alone
    pub skipped: Vec<SessionId>,
    /// Sessions whose write failed
    pub failed: Vec<(SessionId, CoreError)>,
}

impl AutoSaveReport {
    /// Returns true if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

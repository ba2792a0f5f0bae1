//! Brute-force detection engine
//!
//! Owns the per-address attempt windows and the process-wide cooldown
//! state. Constructed once and driven by the tail loop; nothing else
//! mutates detection state.

pub mod cooldown;
pub mod tracker;

pub use cooldown::CooldownGate;
pub use tracker::AttemptTracker;

use crate::models::FailedLoginEvent;
use chrono::{DateTime, Duration, Utc};

/// Stateful detector for brute-force login attempts
///
/// Records every failed login, compares the in-window count for the source
/// address against the threshold, and consults the cooldown gate before
/// committing to an alert.
pub struct DetectionEngine {
    tracker: AttemptTracker,
    gate: CooldownGate,
    threshold: usize,
}

impl DetectionEngine {
    /// Create an engine with the given threshold, window and cooldown
    pub fn new(threshold: usize, window: Duration, cooldown: Duration) -> Self {
        DetectionEngine {
            tracker: AttemptTracker::new(window),
            gate: CooldownGate::new(cooldown),
            threshold,
        }
    }

    /// Feed one failed-login event through detection
    ///
    /// Returns true exactly when an alert must be raised: the source's
    /// in-window count reached the threshold and the cooldown gate opened.
    pub fn observe(&mut self, event: &FailedLoginEvent, now: DateTime<Utc>) -> bool {
        let count = self.tracker.record(event.source_addr, now);

        if count < self.threshold {
            return false;
        }

        let opened = self.gate.try_open(now);
        if opened {
            log::warn!(
                "Brute force detected from {}: {} failed attempts in window",
                event.source_addr,
                count
            );
        } else {
            log::debug!(
                "Threshold crossed by {} ({} attempts) but alert cooldown is active",
                event.source_addr,
                count
            );
        }
        opened
    }

    /// Drop per-address state that has gone idle beyond the window
    pub fn evict_idle(&mut self, now: DateTime<Utc>) {
        self.tracker.evict_idle(now);
    }

    /// Number of source addresses currently tracked
    pub fn tracked_sources(&self) -> usize {
        self.tracker.tracked_sources()
    }
}

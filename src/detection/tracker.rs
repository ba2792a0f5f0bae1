//! Sliding-window failed-attempt tracking per source address
//!
//! Counts failed logins per address within a bounded time window. The
//! tracker has no notion of alerting; threshold comparison belongs to
//! the caller.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;

/// Per-address sliding windows of failed-attempt timestamps
pub struct AttemptTracker {
    window: Duration,
    attempts: HashMap<IpAddr, Vec<DateTime<Utc>>>,
}

impl AttemptTracker {
    /// Create a tracker with the given window duration
    pub fn new(window: Duration) -> Self {
        AttemptTracker {
            window,
            attempts: HashMap::new(),
        }
    }

    /// Record a failed attempt and return the in-window count for the address
    ///
    /// Prunes expired timestamps for the address before appending, so the
    /// returned count only reflects attempts within the window of `now`.
    pub fn record(&mut self, addr: IpAddr, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.window;

        let stamps = self.attempts.entry(addr).or_default();
        stamps.retain(|&t| t > cutoff);
        stamps.push(now);
        stamps.len()
    }

    /// Current in-window count for an address, without recording
    pub fn count(&self, addr: &IpAddr) -> usize {
        self.attempts.get(addr).map(|s| s.len()).unwrap_or(0)
    }

    /// Drop addresses whose windows are empty as of `now`
    ///
    /// Sources that stop scanning would otherwise pin a map entry forever;
    /// calling this after each processing pass bounds the map to addresses
    /// seen within the window.
    pub fn evict_idle(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.window;

        self.attempts.retain(|_, stamps| {
            stamps.retain(|&t| t > cutoff);
            !stamps.is_empty()
        });
    }

    /// Number of addresses currently tracked
    pub fn tracked_sources(&self) -> usize {
        self.attempts.len()
    }
}

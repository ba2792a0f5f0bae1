//! Process-wide alert cooldown
//!
//! One gate for the whole process: a threshold crossing from any source
//! address closes the gate for every address until the cooldown elapses.
//! Suppressing globally rather than per-address trades missed alerts for a
//! second attacker during the window against alert-storm noise; tests pin
//! this semantic so it is not "fixed" by accident.

use chrono::{DateTime, Duration, Utc};

/// Gates alert dispatch to at most one per cooldown period
pub struct CooldownGate {
    cooldown: Duration,
    last_alert_at: Option<DateTime<Utc>>,
}

impl CooldownGate {
    /// Create a gate with the given cooldown duration
    pub fn new(cooldown: Duration) -> Self {
        CooldownGate {
            cooldown,
            last_alert_at: None,
        }
    }

    /// Try to open the gate at `now`
    ///
    /// Returns true and records the alert time iff no alert has been
    /// dispatched yet, or more than the cooldown has elapsed since the last
    /// one.
    pub fn try_open(&mut self, now: DateTime<Utc>) -> bool {
        match self.last_alert_at {
            Some(last) if now.signed_duration_since(last) <= self.cooldown => false,
            _ => {
                self.last_alert_at = Some(now);
                true
            }
        }
    }

    /// Time of the most recently dispatched alert
    pub fn last_alert_at(&self) -> Option<DateTime<Utc>> {
        self.last_alert_at
    }
}

//! ---
//! fw_section: "05-live-sync"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Stale-data tracking for the cached-data indicator."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use std::fmt;

/// Health levels a view exposes to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthLevel {
    /// Snapshots are arriving normally.
    Live,
    /// Consecutive failures crossed the threshold; the view is rendering the
    /// last-known-good snapshot.
    Stale,
}

impl HealthLevel {
    /// Static label for metrics and status payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthLevel::Live => "live",
            HealthLevel::Stale => "stale",
        }
    }
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published indicator state for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewHealth {
    pub level: HealthLevel,
    pub consecutive_errors: u32,
}

impl ViewHealth {
    pub fn is_stale(&self) -> bool {
        self.level == HealthLevel::Stale
    }
}

impl Default for ViewHealth {
    fn default() -> Self {
        Self {
            level: HealthLevel::Live,
            consecutive_errors: 0,
        }
    }
}

/// Tracks consecutive poll failures and derives the indicator level.
///
/// Purely advisory: crossing the threshold never pauses polling or
/// reconciliation, which continue against cached data.
#[derive(Debug)]
pub struct StaleTracker {
    threshold: u32,
    consecutive_errors: u32,
}

impl StaleTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_errors: 0,
        }
    }

    /// Record one poll outcome and return the resulting health.
    pub fn observe(&mut self, failed: bool) -> ViewHealth {
        if failed {
            self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        } else {
            self.consecutive_errors = 0;
        }
        let level = if self.consecutive_errors >= self.threshold {
            HealthLevel::Stale
        } else {
            HealthLevel::Live
        };
        ViewHealth {
            level,
            consecutive_errors: self.consecutive_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalates_at_threshold_and_recovers() {
        let mut tracker = StaleTracker::new(3);
        assert_eq!(tracker.observe(true).level, HealthLevel::Live);
        assert_eq!(tracker.observe(true).level, HealthLevel::Live);
        let third = tracker.observe(true);
        assert_eq!(third.level, HealthLevel::Stale);
        assert_eq!(third.consecutive_errors, 3);

        let recovered = tracker.observe(false);
        assert_eq!(recovered.level, HealthLevel::Live);
        assert_eq!(recovered.consecutive_errors, 0);
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let mut tracker = StaleTracker::new(0);
        assert_eq!(tracker.observe(true).level, HealthLevel::Stale);
    }
}

//! ChangeWindow - WindowPlanner output, RateScheduler input
//!
//! A planned emission-rate change inside one fixed-size window.

use serde::{Deserialize, Serialize};

/// Direction of a planned rate change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Shorter delay between emissions (toward `min_rate_ms`)
    Accelerate,
    /// Longer delay between emissions (toward `max_rate_ms`)
    Decelerate,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerate => "accelerate",
            Self::Decelerate => "decelerate",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled change window
///
/// Immutable once planned. Offsets are relative to the window's own start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeWindow {
    /// 1-based window index (window 1 starts right after the initial stable period)
    pub window_index: u32,

    /// Accelerate or decelerate
    pub kind: ChangeKind,

    /// Seconds from window start to transition start
    pub start_offset_sec: u32,

    /// Transition length in seconds, never past the window end
    pub duration_sec: u32,
}

impl ChangeWindow {
    /// Absolute run time (seconds) at which this window begins
    pub fn window_start_sec(&self, initial_stable_period_sec: u32, window_size_sec: u32) -> f64 {
        f64::from(initial_stable_period_sec)
            + f64::from(self.window_index.saturating_sub(1)) * f64::from(window_size_sec)
    }

    /// Absolute `[start, end]` of the active transition sub-interval (inclusive)
    pub fn active_interval_sec(
        &self,
        initial_stable_period_sec: u32,
        window_size_sec: u32,
    ) -> (f64, f64) {
        let start = self.window_start_sec(initial_stable_period_sec, window_size_sec)
            + f64::from(self.start_offset_sec);
        (start, start + f64::from(self.duration_sec))
    }
}

//! Emission-rate state machine.
//!
//! Warming: decay from `initial_rate_ms` to `stable_rate_ms` over the transition duration,
//! then hold until the initial stable period ends.
//! Steady: hold the last rate, except inside a planned window's active sub-interval where the
//! rate decays toward a kind-specific target. Steady rates are clamped to `[min, max]`.

use contracts::{ChangeKind, ChangeWindow, RateConfig};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::decay_rate;

/// Macro state of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePhase {
    Warming,
    Steady,
}

impl RatePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warming => "warming",
            Self::Steady => "steady",
        }
    }
}

impl std::fmt::Display for RatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition captured when a tick first lands inside a window's sub-interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveTransition {
    pub window_index: u32,
    pub kind: ChangeKind,
    pub start_rate_ms: f64,
    pub target_rate_ms: f64,
    /// Absolute run time the sub-interval opens
    pub start_sec: f64,
    pub duration_sec: f64,
}

/// Rate state, advanced by every `tick`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateState {
    /// Delay before the next emission
    pub current_rate_ms: f64,
    pub phase: RatePhase,
    /// Window the last tick fell in (0 while warming)
    pub current_window_index: u32,
    /// Run time of the last tick
    pub elapsed_sec: f64,
    /// Most recent transition, kept after it completes
    pub transition: Option<ActiveTransition>,
}

/// Exponential-decay rate controller over a fixed change schedule
#[derive(Debug, Clone)]
pub struct RateScheduler {
    config: RateConfig,
    schedule: Vec<ChangeWindow>,
    state: RateState,
}

impl RateScheduler {
    pub fn new(config: RateConfig, mut schedule: Vec<ChangeWindow>) -> Self {
        schedule.sort_by_key(|w| w.window_index);
        let state = RateState {
            current_rate_ms: config.initial_rate_ms,
            phase: RatePhase::Warming,
            current_window_index: 0,
            elapsed_sec: 0.0,
            transition: None,
        };
        Self {
            config,
            schedule,
            state,
        }
    }

    pub fn state(&self) -> &RateState {
        &self.state
    }

    pub fn schedule(&self) -> &[ChangeWindow] {
        &self.schedule
    }

    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    pub fn current_rate_ms(&self) -> f64 {
        self.state.current_rate_ms
    }

    pub fn phase(&self) -> RatePhase {
        self.state.phase
    }

    /// Advance to run time `now_sec` and return the current rate in milliseconds.
    ///
    /// A `now_sec` earlier than the previous tick leaves the state untouched.
    #[instrument(level = "trace", name = "rate_tick", skip(self))]
    pub fn tick(&mut self, now_sec: f64) -> f64 {
        if !now_sec.is_finite() || now_sec < self.state.elapsed_sec {
            debug!(
                now_sec,
                last_sec = self.state.elapsed_sec,
                "rate tick out of order, holding"
            );
            return self.state.current_rate_ms;
        }
        self.state.elapsed_sec = now_sec;

        let initial_period = f64::from(self.config.initial_stable_period_sec);
        if self.state.phase == RatePhase::Warming {
            self.state.current_rate_ms = self.warming_rate(now_sec);
            if now_sec < initial_period {
                return self.state.current_rate_ms;
            }
            self.state.phase = RatePhase::Steady;
            debug!(now_sec, rate_ms = self.state.current_rate_ms, "warming complete");
        }

        self.steady_tick(now_sec, initial_period);
        self.state.current_rate_ms = self
            .state
            .current_rate_ms
            .max(self.config.min_rate_ms)
            .min(self.config.max_rate_ms);
        self.state.current_rate_ms
    }

    fn warming_rate(&self, now_sec: f64) -> f64 {
        let initial = self.config.initial_rate_ms;
        let stable = self.config.stable_rate_ms;
        let transition = f64::from(self.config.transition_duration_sec);

        let rate = if now_sec <= transition {
            decay_rate(initial, stable, transition, now_sec)
        } else {
            stable
        };
        rate.max(initial.min(stable)).min(initial.max(stable))
    }

    fn steady_tick(&mut self, now_sec: f64, initial_period: f64) {
        let window_size = f64::from(self.config.window_size_sec.max(1));
        let index = ((now_sec - initial_period) / window_size).floor() as u32 + 1;
        self.state.current_window_index = index;

        let Some(window) = self
            .schedule
            .iter()
            .find(|w| w.window_index == index)
            .copied()
        else {
            return;
        };

        let (start, end) = window.active_interval_sec(
            self.config.initial_stable_period_sec,
            self.config.window_size_sec,
        );
        if now_sec < start || now_sec > end {
            return;
        }

        let transition = match self.state.transition {
            Some(active) if active.window_index == index => active,
            _ => self.begin_transition(window, start),
        };

        self.state.current_rate_ms = decay_rate(
            transition.start_rate_ms,
            transition.target_rate_ms,
            transition.duration_sec,
            now_sec - transition.start_sec,
        );
    }

    fn begin_transition(&mut self, window: ChangeWindow, start_sec: f64) -> ActiveTransition {
        let current = self.state.current_rate_ms;
        let stable = self.config.stable_rate_ms;
        let target_rate_ms = match window.kind {
            ChangeKind::Accelerate if current <= stable => self.config.min_rate_ms,
            ChangeKind::Decelerate if current >= stable => self.config.max_rate_ms,
            _ => stable,
        };

        let transition = ActiveTransition {
            window_index: window.window_index,
            kind: window.kind,
            start_rate_ms: current,
            target_rate_ms,
            start_sec,
            duration_sec: f64::from(window.duration_sec),
        };
        debug!(
            window = window.window_index,
            kind = %window.kind,
            start_rate_ms = current,
            target_rate_ms,
            duration_sec = window.duration_sec,
            "rate transition started"
        );
        self.state.transition = Some(transition);
        transition
    }
}

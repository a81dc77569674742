//! Simulation clocks
//!
//! A clock owns "now" for a run and performs the one suspension per tick.

use std::time::{Duration, Instant};

use contracts::{ClockConfig, ClockMode};

use crate::error::SimulationError;

/// How simulated time advances between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clock {
    /// Wall time; sleeps for the current rate
    RealTime,
    /// Advances by a constant step without sleeping
    FixedStep { step_sec: f64 },
    /// Advances by the current rate without sleeping
    Virtual,
}

impl Clock {
    pub fn from_config(config: &ClockConfig) -> Self {
        match config.mode {
            ClockMode::RealTime => Clock::RealTime,
            ClockMode::FixedStep => Clock::FixedStep {
                step_sec: config.fixed_step_sec,
            },
            ClockMode::Virtual => Clock::Virtual,
        }
    }

    /// Check that the clock can advance simulated time
    ///
    /// # Errors
    /// `InvalidClock` when a fixed step is not finite and > 0.
    pub fn check(&self) -> Result<(), SimulationError> {
        match *self {
            Clock::FixedStep { step_sec } if !(step_sec.is_finite() && step_sec > 0.0) => {
                Err(SimulationError::InvalidClock { step_sec })
            }
            _ => Ok(()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Clock::RealTime => "real_time",
            Clock::FixedStep { .. } => "fixed_step",
            Clock::Virtual => "virtual",
        }
    }
}

/// Running clock for one simulation
#[derive(Debug)]
pub struct SimulationClock {
    clock: Clock,
    started: Instant,
    simulated_sec: f64,
}

impl SimulationClock {
    pub fn start(clock: Clock) -> Self {
        Self {
            clock,
            started: Instant::now(),
            simulated_sec: 0.0,
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Seconds since the run started, in simulation time
    pub fn now_sec(&self) -> f64 {
        match self.clock {
            Clock::RealTime => self.started.elapsed().as_secs_f64(),
            Clock::FixedStep { .. } | Clock::Virtual => self.simulated_sec,
        }
    }

    /// Wall time since the run started
    pub fn wall_elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Wait out one tick at `rate_ms`
    ///
    /// Simulated clocks still yield once so sink workers keep draining their queues.
    pub async fn suspend(&mut self, rate_ms: f64) {
        match self.clock {
            Clock::RealTime => tokio::time::sleep(rate_to_duration(rate_ms)).await,
            Clock::FixedStep { step_sec } => {
                self.simulated_sec += step_sec;
                tokio::task::yield_now().await;
            }
            Clock::Virtual => {
                self.simulated_sec += rate_to_duration(rate_ms).as_secs_f64();
                tokio::task::yield_now().await;
            }
        }
    }
}

fn rate_to_duration(rate_ms: f64) -> Duration {
    if rate_ms.is_finite() && rate_ms > 0.0 {
        Duration::from_secs_f64(rate_ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

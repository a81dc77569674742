//! MovementModel - per-tick position integration toward a destination.

use contracts::{Coordinate, MovementConfig, MovementMode};
use tracing::trace;

use crate::{MotionError, SpeedProfile, bearing, distance_km, project};

/// How the model chooses its speed on each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedMode {
    /// Recompute `remaining distance / remaining time` every tick so drift self-corrects
    RequiredSpeed { trip_time_sec: f64 },
    /// Follow a precomputed accelerate / cruise / decelerate curve
    Profiled(SpeedProfile),
}

/// Moves one vehicle toward its destination
#[derive(Debug, Clone)]
pub struct MovementModel {
    position: Coordinate,
    destination: Coordinate,
    mode: SpeedMode,
    elapsed_sec: f64,
    speed_kmh: f64,
}

impl MovementModel {
    /// Create a model with an explicit speed mode
    ///
    /// # Errors
    /// `InvalidCoordinate` when either endpoint is out of range or non-finite.
    pub fn new(
        start: Coordinate,
        destination: Coordinate,
        mode: SpeedMode,
    ) -> Result<Self, MotionError> {
        check_coordinate("start", start)?;
        check_coordinate("destination", destination)?;
        if let SpeedMode::RequiredSpeed { trip_time_sec } = mode {
            if !(trip_time_sec.is_finite() && trip_time_sec > 0.0) {
                return Err(MotionError::InvalidProfile(format!(
                    "trip time must be finite and > 0, got {trip_time_sec}"
                )));
            }
        }

        Ok(Self {
            position: start,
            destination,
            mode,
            elapsed_sec: 0.0,
            speed_kmh: 0.0,
        })
    }

    /// Create a model from the `[movement]` configuration section
    pub fn from_config(
        start: Coordinate,
        destination: Coordinate,
        config: &MovementConfig,
    ) -> Result<Self, MotionError> {
        check_coordinate("start", start)?;
        check_coordinate("destination", destination)?;

        let mode = match config.mode {
            MovementMode::RequiredSpeed => SpeedMode::RequiredSpeed {
                trip_time_sec: config.trip_time_budget_sec,
            },
            MovementMode::Profiled => SpeedMode::Profiled(SpeedProfile::new(
                distance_km(start, destination),
                config.trip_time_budget_sec,
                config.accel_phase_fraction,
                config.decel_phase_fraction,
                config.max_speed_kmh,
            )?),
        };
        Self::new(start, destination, mode)
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub fn destination(&self) -> Coordinate {
        self.destination
    }

    pub fn mode(&self) -> &SpeedMode {
        &self.mode
    }

    /// Simulated seconds consumed by ticks so far
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    /// Speed used on the last tick (km/h)
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn remaining_km(&self) -> f64 {
        distance_km(self.position, self.destination)
    }

    /// Current bearing toward the destination
    pub fn bearing_deg(&self) -> f64 {
        bearing(self.position, self.destination)
    }

    /// Advance the vehicle by `dt_sec` seconds and return the new position.
    ///
    /// The step never overshoots: a step at least as long as the remaining distance
    /// lands exactly on the destination.
    ///
    /// # Errors
    /// - `InvalidStep` when `dt_sec` is not finite and > 0
    /// - `NonFinite` when speed, distance or position stop being finite numbers
    pub fn tick(&mut self, dt_sec: f64) -> Result<Coordinate, MotionError> {
        if !(dt_sec.is_finite() && dt_sec > 0.0) {
            return Err(MotionError::InvalidStep { dt: dt_sec });
        }

        let remaining = self.remaining_km();
        if !remaining.is_finite() {
            return Err(MotionError::NonFinite {
                quantity: "remaining distance",
            });
        }

        let (speed_kmh, step_km) = match self.mode {
            SpeedMode::RequiredSpeed { trip_time_sec } => {
                let remaining_time = trip_time_sec - self.elapsed_sec;
                if remaining_time <= dt_sec {
                    (remaining / dt_sec * 3600.0, remaining)
                } else {
                    let speed = remaining / remaining_time * 3600.0;
                    (speed, speed / 3600.0 * dt_sec)
                }
            }
            SpeedMode::Profiled(profile) => {
                let speed = profile.speed_at(self.elapsed_sec + dt_sec / 2.0);
                (speed, speed / 3600.0 * dt_sec)
            }
        };

        if !speed_kmh.is_finite() {
            return Err(MotionError::NonFinite { quantity: "speed" });
        }
        if !step_km.is_finite() {
            return Err(MotionError::NonFinite {
                quantity: "step distance",
            });
        }

        let next = if step_km >= remaining {
            self.destination
        } else {
            project(self.position, step_km, self.bearing_deg())
        };
        if !next.is_finite() {
            return Err(MotionError::NonFinite {
                quantity: "position",
            });
        }

        trace!(
            dt_sec,
            speed_kmh,
            step_km,
            remaining_km = remaining,
            "movement step"
        );

        self.position = next;
        self.speed_kmh = speed_kmh;
        self.elapsed_sec += dt_sec;
        Ok(next)
    }
}

fn check_coordinate(field: &'static str, c: Coordinate) -> Result<(), MotionError> {
    if c.is_valid() {
        Ok(())
    } else {
        Err(MotionError::InvalidCoordinate {
            field,
            latitude: c.latitude,
            longitude: c.longitude,
        })
    }
}

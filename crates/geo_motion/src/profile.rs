//! Trapezoidal speed profile: linear ramp up, cruise, linear ramp down.

use crate::MotionError;

/// Speed curve spread over a trip-time budget
///
/// The cruise speed is chosen so the area under the curve equals the trip distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    cruise_speed_kmh: f64,
    trip_time_sec: f64,
    accel_fraction: f64,
    decel_fraction: f64,
}

impl SpeedProfile {
    /// Build a profile covering `distance_km` in `trip_time_sec`.
    ///
    /// `max_speed_kmh` caps the cruise speed; a capped profile arrives after the budget.
    pub fn new(
        distance_km: f64,
        trip_time_sec: f64,
        accel_fraction: f64,
        decel_fraction: f64,
        max_speed_kmh: Option<f64>,
    ) -> Result<Self, MotionError> {
        if !(distance_km.is_finite() && distance_km >= 0.0) {
            return Err(MotionError::InvalidProfile(format!(
                "distance must be finite and >= 0, got {distance_km}"
            )));
        }
        if !(trip_time_sec.is_finite() && trip_time_sec > 0.0) {
            return Err(MotionError::InvalidProfile(format!(
                "trip time must be finite and > 0, got {trip_time_sec}"
            )));
        }
        let fractions_ok = (0.0..=1.0).contains(&accel_fraction)
            && (0.0..=1.0).contains(&decel_fraction)
            && accel_fraction + decel_fraction <= 1.0;
        if !fractions_ok {
            return Err(MotionError::InvalidProfile(format!(
                "phase fractions {accel_fraction} + {decel_fraction} must lie in [0, 1]"
            )));
        }

        let effective_sec = trip_time_sec * (1.0 - (accel_fraction + decel_fraction) / 2.0);
        let mut cruise_speed_kmh = distance_km / effective_sec * 3600.0;
        if let Some(max) = max_speed_kmh {
            if !(max.is_finite() && max > 0.0) {
                return Err(MotionError::InvalidProfile(format!(
                    "max speed must be finite and > 0, got {max}"
                )));
            }
            cruise_speed_kmh = cruise_speed_kmh.min(max);
        }

        Ok(Self {
            cruise_speed_kmh,
            trip_time_sec,
            accel_fraction,
            decel_fraction,
        })
    }

    pub fn cruise_speed_kmh(&self) -> f64 {
        self.cruise_speed_kmh
    }

    pub fn trip_time_sec(&self) -> f64 {
        self.trip_time_sec
    }

    /// Speed in km/h at `elapsed_sec` into the trip
    ///
    /// Past the budget the vehicle keeps cruising until it arrives.
    pub fn speed_at(&self, elapsed_sec: f64) -> f64 {
        if elapsed_sec >= self.trip_time_sec {
            return self.cruise_speed_kmh;
        }

        let fraction = (elapsed_sec / self.trip_time_sec).max(0.0);
        if self.accel_fraction > 0.0 && fraction < self.accel_fraction {
            self.cruise_speed_kmh * fraction / self.accel_fraction
        } else if self.decel_fraction > 0.0 && fraction > 1.0 - self.decel_fraction {
            self.cruise_speed_kmh * (1.0 - fraction) / self.decel_fraction
        } else {
            self.cruise_speed_kmh
        }
    }
}

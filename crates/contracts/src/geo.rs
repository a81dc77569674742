//! Coordinate / VehicleState - geospatial primitives shared by movement and records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Geographic coordinate in decimal degrees (WGS84 sphere approximation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, [-90, 90]
    pub latitude: f64,

    /// Longitude, [-180, 180]
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without range checks
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Finite and within latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Validate the coordinate, naming `field` in the error.
    ///
    /// # Errors
    /// Returns `ConfigValidation` when a component is non-finite or out of range.
    pub fn validate(&self, field: &str) -> Result<(), ContractError> {
        if !self.is_finite() {
            return Err(ContractError::config_validation(
                field,
                format!(
                    "coordinate must be finite, got ({}, {})",
                    self.latitude, self.longitude
                ),
            ));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ContractError::config_validation(
                format!("{field}.latitude"),
                format!("latitude must be within [-90, 90], got {}", self.latitude),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ContractError::config_validation(
                format!("{field}.longitude"),
                format!("longitude must be within [-180, 180], got {}", self.longitude),
            ));
        }
        Ok(())
    }
}

/// Downtown Seattle, the demo route's start.
pub const SEATTLE: Coordinate = Coordinate::new(47.608013, -122.335167);

/// Pullman university campus, the demo route's destination.
pub const UNIVERSITY_CAMPUS: Coordinate = Coordinate::new(46.7252, -117.1596);

/// Per-run vehicle state
///
/// Owned by exactly one simulation run and mutated on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Vehicle identifier (e.g. "vehicle-arsene-212")
    pub id: String,

    /// Current position
    pub position: Coordinate,

    /// Trip destination
    pub destination: Coordinate,

    /// Speed used on the last tick (km/h)
    pub speed_kmh: f64,

    /// Wall-clock time the run started
    pub start_time: DateTime<Utc>,
}

impl VehicleState {
    /// Create a stationary vehicle at `position`
    pub fn new(
        id: impl Into<String>,
        position: Coordinate,
        destination: Coordinate,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            destination,
            speed_kmh: 0.0,
            start_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_route_is_valid() {
        assert!(SEATTLE.is_valid());
        assert!(UNIVERSITY_CAMPUS.is_valid());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let err = Coordinate::new(91.0, 0.0).validate("route.start").unwrap_err();
        assert!(err.to_string().contains("route.start.latitude"), "got: {err}");

        let err = Coordinate::new(0.0, -180.5)
            .validate("route.destination")
            .unwrap_err();
        assert!(err.to_string().contains("longitude"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_nan() {
        let err = Coordinate::new(f64::NAN, 0.0).validate("c").unwrap_err();
        assert!(err.to_string().contains("finite"), "got: {err}");
    }

    #[test]
    fn test_coordinate_serde_shape() {
        let json = serde_json::to_string(&SEATTLE).unwrap();
        assert!(json.contains("\"latitude\":47.608013"));
        assert!(json.contains("\"longitude\":-122.335167"));
    }
}

//! # Geo Motion
//!
//! Spherical-earth geodesy and per-tick vehicle movement.
//!
//! - [`geo`]: bearing, haversine distance, destination-point projection (pure functions)
//! - [`MovementModel`]: advances a position toward a destination on every tick
//! - [`SpeedProfile`]: accelerate / cruise / decelerate speed curve over a trip-time budget

pub mod error;
pub mod geo;
mod model;
mod profile;

pub use error::MotionError;
pub use geo::{EARTH_RADIUS_KM, bearing, distance_km, project};
pub use model::{MovementModel, SpeedMode};
pub use profile::SpeedProfile;

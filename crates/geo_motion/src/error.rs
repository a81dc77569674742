//! Movement error types

use thiserror::Error;

/// Errors raised while building or ticking a movement model
#[derive(Debug, Error, PartialEq)]
pub enum MotionError {
    /// Start or destination outside the valid coordinate range
    #[error("invalid coordinate '{field}': ({latitude}, {longitude})")]
    InvalidCoordinate {
        field: &'static str,
        latitude: f64,
        longitude: f64,
    },

    /// Tick length must be finite and > 0
    #[error("invalid tick length: {dt} s")]
    InvalidStep { dt: f64 },

    /// A computed quantity became NaN or infinite
    #[error("non-finite {quantity} produced by movement step")]
    NonFinite { quantity: &'static str },

    /// Speed profile parameters cannot describe a trip
    #[error("invalid speed profile: {0}")]
    InvalidProfile(String),
}

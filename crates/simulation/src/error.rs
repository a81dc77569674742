//! Fatal simulation errors

use geo_motion::MotionError;
use thiserror::Error;

/// Errors that terminate a run
///
/// Delivery failures are not here: they are logged and counted, and the run continues.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("movement failed: {0}")]
    Motion(#[from] MotionError),

    #[error("rate scheduler produced a non-finite rate: {rate_ms}")]
    NonFiniteRate { rate_ms: f64 },

    #[error("fixed clock step must be finite and > 0, got {step_sec}")]
    InvalidClock { step_sec: f64 },

    #[error(
        "destination unreachable: {remaining_km:.3} km left after {stalled_ticks} ticks without progress"
    )]
    Unreachable {
        remaining_km: f64,
        stalled_ticks: u32,
    },
}

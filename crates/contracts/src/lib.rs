//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the telemetry simulator.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Simulation time is seconds since run start (`f64`), owned by the simulation clock
//! - Record timestamps are wall-clock UTC: run start + simulated elapsed time

mod blueprint;
mod error;
mod geo;
mod record;
mod schedule;
mod sink;

pub use blueprint::*;
pub use error::*;
pub use geo::*;
pub use record::*;
pub use schedule::*;
pub use sink::*;

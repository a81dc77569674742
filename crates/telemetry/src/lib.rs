//! # Telemetry
//!
//! Assembles the five records published on every simulation tick.
//!
//! Position, timestamp and direction come from the tick; descriptive fields come from the
//! configured vehicle profile; the remaining fields are drawn from the injected RNG, so a
//! seeded RNG reproduces the same stream.

mod factory;

pub use factory::{RecordBundle, RecordFactory, TickContext, record_timestamp};

//! TelemetrySink trait - simulation output interface
//!
//! Defines the abstract interface for sinks.

use crate::{ContractError, TelemetryRecord};

/// Outcome of publishing one record
pub type DeliveryResult = Result<(), ContractError>;

/// Telemetry output trait
///
/// All sink implementations must implement this trait. Failures are reported,
/// never retried by the caller; retry policy belongs to the implementation.
#[trait_variant::make(TelemetrySink: Send)]
pub trait LocalTelemetrySink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Publish one record on a logical channel
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn publish(&mut self, channel: &str, record: &TelemetryRecord) -> DeliveryResult;

    /// Flush buffered records (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink and release its connection
    async fn close(&mut self) -> Result<(), ContractError>;
}

//! LogSink - logs record summaries via tracing

use contracts::{ContractError, DeliveryResult, TelemetryRecord, TelemetrySink};
use tracing::{info, instrument};

/// Sink that logs one line per record
pub struct LogSink {
    name: String,
    published: u64,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            published: 0,
        }
    }

    /// Records logged so far
    pub fn published(&self) -> u64 {
        self.published
    }

    fn log_record_summary(&self, channel: &str, record: &TelemetryRecord) {
        info!(
            sink = %self.name,
            channel,
            kind = record.channel_kind().as_str(),
            record_id = %record.id(),
            vehicle_id = record.vehicle_id(),
            timestamp = %record.timestamp(),
            "Telemetry record"
        );
    }
}

impl TelemetrySink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_publish",
        skip(self, record),
        fields(sink = %self.name, record_id = %record.id())
    )]
    async fn publish(&mut self, channel: &str, record: &TelemetryRecord) -> DeliveryResult {
        self.log_record_summary(channel, record);
        self.published += 1;
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, published = self.published, "LogSink closed");
        Ok(())
    }
}

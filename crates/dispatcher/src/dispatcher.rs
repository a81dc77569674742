//! Dispatcher - fan-out of telemetry records to sinks

use tracing::{debug, info, instrument, warn};

use contracts::{
    ContractError, DeliveryResult, SinkConfig, SinkType, TelemetryRecord, TelemetrySink,
    TransportConfig,
};

use crate::error::DispatcherError;
use crate::handle::{QueuedRecord, SinkHandle};
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink, NetworkSink};

const DISPATCHER_NAME: &str = "dispatcher";

/// Dispatcher configuration
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
    /// Endpoint used by network sinks that set no `addr`
    pub default_network_addr: Option<String>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
}

impl DispatcherBuilder {
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    /// Build the dispatcher and start one worker per sink
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config).await?;
        info!(sinks = handles.len(), "Dispatcher started");
        Ok(Dispatcher::with_handles(handles))
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config),
        fields(sink_count = config.sinks.len())
    )]
    async fn initialize_handles(
        config: &DispatcherConfig,
    ) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            match create_sink_handle(sink_config, config.default_network_addr.as_deref()).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    // stop the workers already running before reporting
                    for handle in handles {
                        let _ = handle.shutdown().await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, default_network_addr),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(
    config: &SinkConfig,
    default_network_addr: Option<&str>,
) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(config, e))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&config.name, &config.params, default_network_addr)
                .await
                .map_err(|e| DispatcherError::sink_creation(config, e))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// Fans every published record out to all sink queues
///
/// Publishing never waits on a sink. A record rejected by a full queue is reported as a
/// delivery failure; failures inside a sink are logged by its worker.
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    closed: bool,
    /// Final counters, filled on close
    closed_metrics: Vec<(String, MetricsSnapshot)>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            closed: false,
            closed_metrics: Vec::new(),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Get metrics for all sinks (final counters once closed)
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        if self.closed {
            return self.closed_metrics.clone();
        }
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    fn dispatch_record(&self, channel: &str, record: &TelemetryRecord) -> Vec<String> {
        let mut rejected = Vec::new();
        for handle in &self.handles {
            let queued = QueuedRecord {
                channel: channel.to_string(),
                record: record.clone(),
            };
            if let Err(e) = handle.try_send(queued) {
                debug!(error = %e, "Record not queued");
                rejected.push(e.sink_name().to_string());
            }
        }
        rejected
    }
}

impl TelemetrySink for Dispatcher {
    fn name(&self) -> &str {
        DISPATCHER_NAME
    }

    async fn publish(&mut self, channel: &str, record: &TelemetryRecord) -> DeliveryResult {
        if self.closed {
            return Err(ContractError::sink_unavailable(
                DISPATCHER_NAME,
                "dispatcher closed",
            ));
        }

        let rejected = self.dispatch_record(channel, record);
        if rejected.is_empty() {
            Ok(())
        } else {
            Err(ContractError::delivery(
                DISPATCHER_NAME,
                format!("record {} dropped by: {}", record.id(), rejected.join(", ")),
            ))
        }
    }

    /// Sinks flush themselves when their worker drains on close
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "dispatcher_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        for handle in self.handles.drain(..) {
            let name = handle.name().to_string();
            let snapshot = handle.shutdown().await;
            if snapshot.lost() > 0 {
                warn!(sink = %name, %snapshot, "Sink lost records");
            } else {
                debug!(sink = %name, %snapshot, "Sink totals");
            }
            self.closed_metrics.push((name, snapshot));
        }

        info!("Dispatcher shutdown complete");
        Ok(())
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, transport))]
pub async fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    transport: &TransportConfig,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
        default_network_addr: Some(transport.bootstrap_servers.clone()),
    };
    DispatcherBuilder::new(config).build().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::gps_record;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_dispatcher_fanout() {
        let sink1 = LogSink::new("sink1");
        let sink2 = LogSink::new("sink2");
        let handles = vec![SinkHandle::spawn(sink1, 10), SinkHandle::spawn(sink2, 10)];

        let mut dispatcher = Dispatcher::with_handles(handles);
        for i in 0..5 {
            dispatcher.publish("gps_data", &gps_record(i)).await.unwrap();
        }

        dispatcher.close().await.unwrap();
        assert_eq!(dispatcher.sink_count(), 0);

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.len(), 2);
        for (_, snapshot) in metrics {
            assert_eq!(snapshot.delivered, 5);
            assert_eq!(snapshot.dropped, 0);
        }
    }

    #[tokio::test]
    async fn test_create_dispatcher_from_config() {
        let dir = tempdir().unwrap();
        let configs = vec![
            SinkConfig {
                name: "test_log".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: 50,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "test_file".to_string(),
                sink_type: SinkType::File,
                queue_capacity: 50,
                params: HashMap::from([(
                    "base_path".to_string(),
                    dir.path().to_string_lossy().to_string(),
                )]),
            },
        ];

        let mut dispatcher = create_dispatcher(configs, &TransportConfig::default())
            .await
            .unwrap();
        assert_eq!(dispatcher.sink_count(), 2);

        dispatcher.publish("gps_data", &gps_record(1)).await.unwrap();
        dispatcher.close().await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("gps_data.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_network_sink_uses_transport_endpoint() {
        let receiver = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = TransportConfig {
            bootstrap_servers: receiver.local_addr().unwrap().to_string(),
        };
        let configs = vec![SinkConfig {
            name: "bus".to_string(),
            sink_type: SinkType::Network,
            queue_capacity: 8,
            params: HashMap::new(),
        }];

        let mut dispatcher = create_dispatcher(configs, &transport).await.unwrap();
        dispatcher.publish("gps_data", &gps_record(3)).await.unwrap();

        let mut buf = vec![0u8; 65536];
        let len = receiver.recv(&mut buf).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(value["channel"], "gps_data");

        dispatcher.close().await.unwrap();
    }

    struct StalledSink;

    impl TelemetrySink for StalledSink {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn publish(&mut self, _channel: &str, _record: &TelemetryRecord) -> DeliveryResult {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_full_queue_reports_failure_without_blocking_other_sinks() {
        let handles = vec![
            SinkHandle::spawn(LogSink::new("fast"), 64),
            SinkHandle::spawn(StalledSink, 1),
        ];
        let mut dispatcher = Dispatcher::with_handles(handles);

        let mut failures = 0;
        for i in 0..5 {
            if let Err(e) = dispatcher.publish("gps_data", &gps_record(i)).await {
                assert!(e.to_string().contains("stalled"));
                failures += 1;
            }
        }
        assert!(failures > 0);

        dispatcher.close().await.unwrap();
        let metrics: HashMap<_, _> = dispatcher.metrics().into_iter().collect();
        assert_eq!(metrics["fast"].delivered, 5);
        assert_eq!(metrics["stalled"].dropped, failures);
    }

    #[tokio::test]
    async fn test_publish_after_close_fails() {
        let mut dispatcher = Dispatcher::with_handles(vec![SinkHandle::spawn(LogSink::new("l"), 4)]);
        dispatcher.close().await.unwrap();
        assert!(dispatcher.publish("gps_data", &gps_record(1)).await.is_err());
        // closing twice is harmless
        dispatcher.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_network_sink_fails_creation() {
        let configs = vec![SinkConfig {
            name: "broken".to_string(),
            sink_type: SinkType::Network,
            queue_capacity: 8,
            params: HashMap::from([("max_packet_size".to_string(), "lots".to_string())]),
        }];

        let result = create_dispatcher(configs, &TransportConfig::default()).await;
        assert!(matches!(
            result,
            Err(DispatcherError::SinkCreation { ref name, .. }) if name == "broken"
        ));
    }
}

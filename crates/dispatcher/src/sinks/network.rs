//! NetworkSink - UDP fire-and-forget streaming of JSON envelopes

use contracts::{ContractError, DeliveryResult, TelemetryRecord, TelemetrySink};
use serde::Serialize;
use std::collections::HashMap;
use tokio::net::UdpSocket;
use tracing::{debug, instrument};

const DEFAULT_MAX_PACKET_SIZE: usize = 65000;

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target `host:port`
    pub addr: String,
    /// Max datagram size (UDP allows 65507 bytes over IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    ///
    /// `addr` falls back to `default_addr` (the transport bootstrap endpoint) when absent.
    pub fn from_params(
        params: &HashMap<String, String>,
        default_addr: Option<&str>,
    ) -> Result<Self, String> {
        let addr = params
            .get("addr")
            .map(String::as_str)
            .or(default_addr)
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;
        if addr.trim().is_empty() {
            return Err("'addr' cannot be empty".to_string());
        }

        let max_packet_size = match params.get("max_packet_size") {
            Some(raw) => raw
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{raw}': {e}"))?,
            None => DEFAULT_MAX_PACKET_SIZE,
        };

        Ok(Self {
            addr: addr.to_string(),
            max_packet_size,
        })
    }
}

/// Wire shape of one datagram
#[derive(Serialize)]
struct Envelope<'a> {
    channel: &'a str,
    /// Delivery key: the record id
    key: String,
    record: &'a TelemetryRecord,
}

/// Sink that sends one UDP datagram per record
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config), fields(target = %config.addr))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(config.addr.as_str()).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        default_addr: Option<&str>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params, default_addr)
            .map_err(|e| ContractError::config_validation(format!("sinks[{name}].params"), e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::sink_unavailable(name, e.to_string()))
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_unavailable(&self.name, "socket not connected"))
    }

    fn prepare_payload(
        &self,
        channel: &str,
        record: &TelemetryRecord,
    ) -> Result<Vec<u8>, ContractError> {
        let envelope = Envelope {
            channel,
            key: record.id().to_string(),
            record,
        };
        let data = serde_json::to_vec(&envelope)
            .map_err(|e| ContractError::encode(format!("json error: {e}")))?;

        if data.len() > self.config.max_packet_size {
            return Err(ContractError::delivery(
                &self.name,
                format!(
                    "packet of {} bytes exceeds max_packet_size {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }

        Ok(data)
    }
}

impl TelemetrySink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_publish",
        skip(self, record),
        fields(sink = %self.name, record_id = %record.id())
    )]
    async fn publish(&mut self, channel: &str, record: &TelemetryRecord) -> DeliveryResult {
        let socket = self.socket()?;
        let data = self.prepare_payload(channel, record)?;
        let sent = socket
            .send(&data)
            .await
            .map_err(|e| ContractError::delivery(&self.name, format!("udp send: {e}")))?;
        debug!(sink = %self.name, channel, bytes = sent, "Sent");
        Ok(())
    }

    #[instrument(name = "network_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // UDP doesn't buffer
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}

//! FileSink - appends records as JSON lines, one file per channel

use contracts::{ContractError, DeliveryResult, TelemetryRecord, TelemetrySink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// Sink that writes `<base_path>/<channel>.jsonl`
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writers: HashMap<String, BufWriter<File>>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            writers: HashMap::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    /// File a channel is written to
    pub fn channel_path(&self, channel: &str) -> PathBuf {
        self.config.base_path.join(format!("{channel}.jsonl"))
    }

    fn open_writer(path: &Path) -> std::io::Result<BufWriter<File>> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(BufWriter::new(file))
    }

    fn append_line(&mut self, channel: &str, record: &TelemetryRecord) -> std::io::Result<()> {
        if !self.writers.contains_key(channel) {
            let writer = Self::open_writer(&self.channel_path(channel))?;
            self.writers.insert(channel.to_string(), writer);
        }
        let Some(writer) = self.writers.get_mut(channel) else {
            return Err(std::io::Error::other("channel writer missing"));
        };

        serde_json::to_writer(&mut *writer, record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(b"\n")
    }

    fn persist_record(&mut self, channel: &str, record: &TelemetryRecord) -> DeliveryResult {
        self.append_line(channel, record).map_err(|e| {
            error!(
                sink = %self.name,
                channel,
                record_id = %record.id(),
                error = %e,
                "Write failed"
            );
            ContractError::delivery(&self.name, e.to_string())
        })
    }

    fn flush_all(&mut self) -> Result<(), ContractError> {
        for (channel, writer) in &mut self.writers {
            writer.flush().map_err(|e| {
                ContractError::delivery(&self.name, format!("flush '{channel}': {e}"))
            })?;
        }
        Ok(())
    }
}

impl TelemetrySink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_publish",
        skip(self, record),
        fields(sink = %self.name, record_id = %record.id())
    )]
    async fn publish(&mut self, channel: &str, record: &TelemetryRecord) -> DeliveryResult {
        self.persist_record(channel, record)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.flush_all()
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush_all()?;
        self.writers.clear();
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}

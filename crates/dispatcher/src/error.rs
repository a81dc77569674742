//! Errors raised while starting and feeding sink workers

use contracts::{SinkConfig, SinkType};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A configured sink could not be started
    #[error("cannot start {kind:?} sink '{name}': {reason}")]
    SinkCreation {
        name: String,
        kind: SinkType,
        reason: String,
    },

    /// The sink is behind; the record was dropped for this sink only
    #[error("sink '{sink_name}' is behind, record {record_id} dropped")]
    QueueFull { sink_name: String, record_id: Uuid },

    /// The worker task ended while the dispatcher was still open
    #[error("sink '{sink_name}' worker has stopped")]
    WorkerStopped { sink_name: String },
}

impl DispatcherError {
    pub fn sink_creation(config: &SinkConfig, reason: impl std::fmt::Display) -> Self {
        Self::SinkCreation {
            name: config.name.clone(),
            kind: config.sink_type,
            reason: reason.to_string(),
        }
    }

    /// Name of the sink the error belongs to
    pub fn sink_name(&self) -> &str {
        match self {
            Self::SinkCreation { name, .. } => name,
            Self::QueueFull { sink_name, .. } | Self::WorkerStopped { sink_name } => sink_name,
        }
    }
}

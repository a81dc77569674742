//! Error shared across crate boundaries
//!
//! Configuration problems stop a run before it starts; delivery problems are
//! counted and logged by the simulation loop and never end it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    /// Configuration text could not be decoded
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration decoded but a value is out of range
    #[error("invalid config value '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// A sink refused or lost one record
    #[error("delivery to '{sink_name}' failed: {message}")]
    Delivery { sink_name: String, message: String },

    /// A sink cannot accept anything (closed, unreachable)
    #[error("sink '{sink_name}' unavailable: {message}")]
    SinkUnavailable { sink_name: String, message: String },

    /// A record could not be encoded for the wire
    #[error("record encoding failed: {message}")]
    Encode { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn delivery(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    pub fn sink_unavailable(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkUnavailable {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// True for errors raised before the run starts
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } | Self::Io(_)
        )
    }
}

//! Error types for CLI operations.

use dispatcher::DispatcherError;
use simulation::SimulationError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or failed validation
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// Sinks could not be created
    #[error("Failed to start sinks: {0}")]
    Dispatcher(#[from] DispatcherError),

    /// Fatal simulation error
    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    /// Metrics endpoint could not be started
    #[error("Failed to start metrics endpoint: {0}")]
    Metrics(#[source] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Process exit code: 2 for configuration problems, 1 for everything else
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } => 2,
            Self::Config(e) if e.is_config() => 2,
            _ => 1,
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

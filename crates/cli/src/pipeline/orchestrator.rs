//! Pipeline orchestrator - wires sinks, metrics and the simulation loop.

use std::time::{Duration, Instant};

use contracts::SimulationBlueprint;
use simulation::{Clock, SimulationLoop};
use tokio::sync::watch;
use tracing::{info, warn};

use super::PipelineStats;
use crate::error::{CliError, Result};

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated simulation blueprint
    pub blueprint: SimulationBlueprint,

    /// Clock override (None = use the blueprint's clock section)
    pub clock: Option<Clock>,

    /// Maximum number of ticks (None = until arrival)
    pub max_ticks: Option<u64>,

    /// Wall-clock timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the simulation to completion
    ///
    /// Sending `true` on `shutdown` interrupts the run at the next tick boundary; the sinks are
    /// still drained and closed.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port).map_err(CliError::Metrics)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - telemetry records will be dropped");
        }
        let dispatcher =
            dispatcher::create_dispatcher(blueprint.sinks.clone(), &blueprint.transport).await?;
        let active_sinks = dispatcher.sink_count();
        info!(
            active_sinks,
            endpoint = %blueprint.transport.bootstrap_servers,
            "Dispatcher started"
        );

        // Setup Simulation
        let mut sim = SimulationLoop::new(blueprint, dispatcher)?.with_cancellation(shutdown);
        if let Some(clock) = self.config.clock {
            sim = sim.with_clock(clock);
        }
        if let Some(max) = self.config.max_ticks {
            sim = sim.stop_when(move |p| p.ticks >= max);
        }
        if let Some(timeout) = self.config.timeout {
            sim = sim.stop_when(move |p| p.wall_elapsed >= timeout);
        }

        info!(
            max_ticks = ?self.config.max_ticks,
            timeout_secs = ?self.config.timeout.map(|t| t.as_secs()),
            "Simulation running"
        );

        let summary = sim.run().await?;

        let sink_metrics = sim.sink().metrics();
        for (name, snapshot) in &sink_metrics {
            observability::record_sink_dropped(name, snapshot.dropped);
        }

        let stats = PipelineStats {
            summary,
            duration: start_time.elapsed(),
            active_sinks,
            sink_metrics,
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            ticks_per_sec = format!("{:.2}", stats.ticks_per_sec()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

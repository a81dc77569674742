//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::SimulationBlueprint;
use simulation::{Clock, RunOutcome};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::{RunArgs, TransportOverrides};
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    match &args.config {
        Some(path) => info!(config = %path.display(), "Loading configuration"),
        None => info!("No configuration file given, using demo route defaults"),
    }

    let mut blueprint = load_blueprint(args.config.as_deref()).context("Failed to load config")?;

    // Apply CLI / environment overrides, then re-check the result
    apply_overrides(&mut blueprint, args);
    config_loader::ConfigLoader::validate(&blueprint)
        .map_err(CliError::from)
        .context("Configuration invalid after applying overrides")?;

    info!(
        vehicle_id = %blueprint.route.vehicle_id,
        endpoint = %blueprint.transport.bootstrap_servers,
        trip_time_budget_sec = blueprint.movement.trip_time_budget_sec,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        clock: clock_override(args),
        max_ticks: (args.max_ticks > 0).then_some(args.max_ticks),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    // Setup graceful shutdown handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_task = tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping simulation...");
        let _ = shutdown_tx.send(true);
    });

    info!("Starting simulation...");
    let result = Pipeline::new(pipeline_config).run(shutdown_rx).await;
    signal_task.abort();

    let stats = result.context("Simulation failed")?;
    match stats.summary.outcome {
        RunOutcome::Arrived => info!(
            ticks = stats.summary.ticks,
            records = stats.summary.records_published,
            "Vehicle arrived at destination"
        ),
        RunOutcome::Cancelled => println!("Simulation interrupted by user"),
        RunOutcome::Stopped => info!(ticks = stats.summary.ticks, "Stop condition reached"),
    }
    stats.print_summary();

    info!("Telemetry Sim finished");
    Ok(())
}

/// Fold environment and flag overrides into the blueprint
fn apply_overrides(blueprint: &mut SimulationBlueprint, args: &RunArgs) {
    apply_transport_overrides(blueprint, &args.overrides);

    if let Some(seed) = args.seed {
        info!(seed, "Overriding random seed from CLI");
        blueprint.clock.seed = Some(seed);
    }
}

fn apply_transport_overrides(blueprint: &mut SimulationBlueprint, overrides: &TransportOverrides) {
    if let Some(ref endpoint) = overrides.bootstrap_server {
        info!(endpoint = %endpoint, "Overriding transport endpoint");
        blueprint.transport.bootstrap_servers = endpoint.clone();
    }

    let channels = &mut blueprint.channels;
    for (target, value) in [
        (&mut channels.vehicle, &overrides.vehicle_topic),
        (&mut channels.gps, &overrides.gps_topic),
        (&mut channels.traffic, &overrides.traffic_topic),
        (&mut channels.weather, &overrides.weather_topic),
        (&mut channels.emergency, &overrides.emergency_topic),
    ] {
        if let Some(name) = value {
            *target = name.clone();
        }
    }
}

fn clock_override(args: &RunArgs) -> Option<Clock> {
    if let Some(step_sec) = args.fixed_step {
        Some(Clock::FixedStep { step_sec })
    } else if args.virtual_clock {
        Some(Clock::Virtual)
    } else {
        None
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &SimulationBlueprint) {
    let route = &blueprint.route;
    println!("\n=== Configuration Summary ===\n");
    println!("Route:");
    println!("  Vehicle: {}", route.vehicle_id);
    println!(
        "  From: ({}, {})  To: ({}, {})",
        route.start.latitude,
        route.start.longitude,
        route.destination.latitude,
        route.destination.longitude
    );
    println!(
        "  Distance: {:.1} km in {} s",
        geo_motion::distance_km(route.start, route.destination),
        blueprint.movement.trip_time_budget_sec
    );
    println!("  Transport: {}", blueprint.transport.bootstrap_servers);

    println!("\nChannels:");
    for name in simulation::channel_names(&blueprint.channels) {
        println!("  - {}", name);
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}

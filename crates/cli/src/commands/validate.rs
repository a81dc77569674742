//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{MovementMode, SimulationBlueprint, SinkType};
use rate_engine::WindowPlanner;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

impl ValidationResult {
    fn invalid(config_path: String, error: String) -> Self {
        Self {
            valid: false,
            config_path,
            error: Some(error),
            warnings: Vec::new(),
            summary: None,
        }
    }
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    vehicle_id: String,
    distance_km: f64,
    trip_time_budget_sec: f64,
    movement_mode: MovementMode,
    /// Upper bound on rate changes for one run
    max_rate_changes: u32,
    sink_count: usize,
}

impl ConfigSummary {
    fn from_blueprint(blueprint: &SimulationBlueprint) -> Self {
        Self {
            version: format!("{:?}", blueprint.version),
            vehicle_id: blueprint.route.vehicle_id.clone(),
            distance_km: route_distance_km(blueprint),
            trip_time_budget_sec: blueprint.movement.trip_time_budget_sec,
            movement_mode: blueprint.movement.mode,
            max_rate_changes: available_windows(blueprint).min(blueprint.rate.max_changes),
            sink_count: blueprint.sinks.len(),
        }
    }
}

fn route_distance_km(blueprint: &SimulationBlueprint) -> f64 {
    geo_motion::distance_km(blueprint.route.start, blueprint.route.destination)
}

fn available_windows(blueprint: &SimulationBlueprint) -> u32 {
    WindowPlanner::from_rate_config(&blueprint.rate).max_windows(blueprint.plan_horizon_sec())
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        let error = format!("File not found: {config_path}");
        return ValidationResult::invalid(config_path, error);
    }

    match ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(ConfigSummary::from_blueprint(&blueprint)),
        },
        Err(e) => ValidationResult::invalid(config_path, e.to_string()),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SimulationBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if available_windows(blueprint) == 0 {
        warnings.push(
            "trip time budget leaves no change window - the rate will stay stable".to_string(),
        );
    }

    if route_distance_km(blueprint) <= blueprint.route.arrival_threshold_km {
        warnings.push(format!(
            "start is within {} km of the destination - the run ends on the first tick",
            blueprint.route.arrival_threshold_km
        ));
    }

    if blueprint
        .sinks
        .iter()
        .all(|s| s.sink_type == SinkType::Log)
    {
        warnings.push("only log sinks configured - records are not delivered anywhere".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Vehicle: {}", summary.vehicle_id);
            println!(
                "  Route: {:.1} km in {} s",
                summary.distance_km, summary.trip_time_budget_sec
            );
            println!("  Movement: {:?}", summary.movement_mode);
            println!("  Max rate changes: {}", summary.max_rate_changes);
            println!("  Sinks: {}", summary.sink_count);
        }

        if !result.warnings.is_empty() {
            println!("\n⚠ Warnings:");
            for warning in &result.warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

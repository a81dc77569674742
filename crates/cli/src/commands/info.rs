//! `info` command implementation.

use anyhow::{Context, Result};
use config_loader::{ConfigFormat, ConfigLoader};
use contracts::{ClockMode, Coordinate, MovementMode, SimulationBlueprint};
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    route: RouteInfo,
    movement: MovementInfo,
    rate: RateInfo,
    clock: ClockInfo,
    channels: Vec<String>,
    transport: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct RouteInfo {
    vehicle_id: String,
    start: Coordinate,
    destination: Coordinate,
    distance_km: f64,
    initial_bearing_deg: f64,
    arrival_threshold_km: f64,
}

#[derive(Serialize)]
struct MovementInfo {
    mode: MovementMode,
    trip_time_budget_sec: f64,
    average_speed_kmh: f64,
}

#[derive(Serialize)]
struct RateInfo {
    initial_rate_ms: f64,
    stable_rate_ms: f64,
    min_rate_ms: f64,
    max_rate_ms: f64,
    transition_duration_sec: u32,
    change_windows_available: u32,
}

#[derive(Serialize)]
struct ClockInfo {
    mode: ClockMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = ?args.config, "Loading configuration info");

    let blueprint = load_blueprint(args.config.as_deref()).context("Failed to load config")?;

    if args.dump {
        let format = if args.json {
            ConfigFormat::Json
        } else {
            ConfigFormat::Toml
        };
        let rendered =
            ConfigLoader::render(&blueprint, format).context("Failed to render config")?;
        println!("{rendered}");
        return Ok(());
    }

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&build_config_info(&blueprint, args), args);
    }

    Ok(())
}

fn build_config_info(blueprint: &SimulationBlueprint, args: &InfoArgs) -> ConfigInfo {
    let route = &blueprint.route;
    let distance_km = geo_motion::distance_km(route.start, route.destination);
    let budget = blueprint.movement.trip_time_budget_sec;

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    let rate = &blueprint.rate;
    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        route: RouteInfo {
            vehicle_id: route.vehicle_id.clone(),
            start: route.start,
            destination: route.destination,
            distance_km,
            initial_bearing_deg: geo_motion::bearing(route.start, route.destination),
            arrival_threshold_km: route.arrival_threshold_km,
        },
        movement: MovementInfo {
            mode: blueprint.movement.mode,
            trip_time_budget_sec: budget,
            average_speed_kmh: if budget > 0.0 {
                distance_km / budget * 3600.0
            } else {
                0.0
            },
        },
        rate: RateInfo {
            initial_rate_ms: rate.initial_rate_ms,
            stable_rate_ms: rate.stable_rate_ms,
            min_rate_ms: rate.min_rate_ms,
            max_rate_ms: rate.max_rate_ms,
            transition_duration_sec: rate.transition_duration_sec,
            change_windows_available: rate_engine::WindowPlanner::from_rate_config(rate)
                .max_windows(blueprint.plan_horizon_sec()),
        },
        clock: ClockInfo {
            mode: blueprint.clock.mode,
            seed: blueprint.clock.seed,
        },
        channels: simulation::channel_names(&blueprint.channels)
            .into_iter()
            .map(String::from)
            .collect(),
        transport: blueprint.transport.bootstrap_servers.clone(),
        sinks,
    }
}

fn print_config_info(info: &ConfigInfo, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Telemetry Sim Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Route
    let route = &info.route;
    println!("📍 Route");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Vehicle: {}", route.vehicle_id);
    println!(
        "   ├─ Start: ({}, {})",
        route.start.latitude, route.start.longitude
    );
    println!(
        "   ├─ Destination: ({}, {})",
        route.destination.latitude, route.destination.longitude
    );
    println!(
        "   ├─ Distance: {:.1} km, initial bearing {:.1}°",
        route.distance_km, route.initial_bearing_deg
    );
    println!("   └─ Arrival threshold: {} km", route.arrival_threshold_km);

    // Movement
    println!("\n🚗 Movement");
    println!("   ├─ Mode: {:?}", info.movement.mode);
    println!("   ├─ Trip budget: {} s", info.movement.trip_time_budget_sec);
    println!(
        "   └─ Average speed: {:.0} km/h",
        info.movement.average_speed_kmh
    );

    // Rate
    let rate = &info.rate;
    println!("\n⚙️  Emission Rate");
    println!(
        "   ├─ Warm-up: {} ms → {} ms over {} s",
        rate.initial_rate_ms, rate.stable_rate_ms, rate.transition_duration_sec
    );
    println!("   ├─ Bounds: [{} ms, {} ms]", rate.min_rate_ms, rate.max_rate_ms);
    println!("   └─ Change windows available: {}", rate.change_windows_available);

    // Clock
    println!("\n⏱  Clock");
    println!("   ├─ Mode: {:?}", info.clock.mode);
    match info.clock.seed {
        Some(seed) => println!("   └─ Seed: {}", seed),
        None => println!("   └─ Seed: (random)"),
    }

    // Channels
    println!("\n📡 Channels → {}", info.transport);
    for (i, channel) in info.channels.iter().enumerate() {
        let prefix = if i == info.channels.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        println!("   {} {}", prefix, channel);
    }

    // Sinks
    if args.sinks && !info.sinks.is_empty() {
        println!("\n📤 Sinks ({})", info.sinks.len());
        for (i, sink) in info.sinks.iter().enumerate() {
            let prefix = if i == info.sinks.len() - 1 {
                "└─"
            } else {
                "├─"
            };
            println!(
                "   {} {} ({}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_for_demo_route() {
        let args = InfoArgs {
            config: None,
            json: true,
            sinks: true,
            dump: false,
        };
        let info = build_config_info(&SimulationBlueprint::default(), &args);

        assert!((info.route.distance_km - 403.3).abs() < 0.5);
        assert!(info.route.initial_bearing_deg > 90.0 && info.route.initial_bearing_deg < 135.0);
        assert_eq!(info.rate.change_windows_available, 5);
        assert_eq!(info.channels.len(), 5);
        assert_eq!(info.sinks.len(), 1);

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["movement"]["mode"], "required_speed");
        assert_eq!(value["clock"]["mode"], "real_time");
        assert!(value["clock"].get("seed").is_none());
    }

    #[test]
    fn test_sinks_hidden_by_default() {
        let args = InfoArgs {
            config: None,
            json: true,
            sinks: false,
            dump: false,
        };
        let info = build_config_info(&SimulationBlueprint::default(), &args);
        let value = serde_json::to_value(&info).unwrap();
        assert!(value.get("sinks").is_none());
    }
}

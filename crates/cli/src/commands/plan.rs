//! `plan` command implementation.

use anyhow::{Context, Result};
use contracts::{ChangeKind, ChangeWindow, RateConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rate_engine::WindowPlanner;
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::PlanArgs;

/// One planned change, with absolute times
#[derive(Serialize)]
struct PlannedChange {
    #[serde(flatten)]
    window: ChangeWindow,
    start_sec: f64,
    end_sec: f64,
    target_rate_ms: f64,
}

#[derive(Serialize)]
struct PlanOutput {
    seed: Option<u64>,
    total_duration_sec: u32,
    max_windows: u32,
    changes: Vec<PlannedChange>,
}

/// Execute the `plan` command
pub fn run_plan(args: &PlanArgs) -> Result<()> {
    let blueprint = load_blueprint(args.config.as_deref()).context("Failed to load config")?;

    let seed = args.seed.or(blueprint.clock.seed);
    let total = args.duration.unwrap_or_else(|| blueprint.plan_horizon_sec());
    info!(seed = ?seed, total_duration_sec = total, "Planning change windows");

    let output = build_plan(&blueprint.rate, total, seed);

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialize plan")?;
        println!("{}", json);
    } else {
        print_plan(&output);
    }

    Ok(())
}

fn build_plan(rate: &RateConfig, total_duration_sec: u32, seed: Option<u64>) -> PlanOutput {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let planner = WindowPlanner::from_rate_config(rate);
    let windows = planner.plan(total_duration_sec, &mut rng);

    let changes = windows
        .into_iter()
        .map(|window| {
            let (start_sec, end_sec) =
                window.active_interval_sec(rate.initial_stable_period_sec, rate.window_size_sec);
            // target when the rate sits at stable on entry
            let target_rate_ms = match window.kind {
                ChangeKind::Accelerate => rate.min_rate_ms,
                ChangeKind::Decelerate => rate.max_rate_ms,
            };
            PlannedChange {
                window,
                start_sec,
                end_sec,
                target_rate_ms,
            }
        })
        .collect();

    PlanOutput {
        seed,
        total_duration_sec,
        max_windows: planner.max_windows(total_duration_sec),
        changes,
    }
}

fn print_plan(output: &PlanOutput) {
    println!(
        "Change Events ({} of {} windows, {} s run):",
        output.changes.len(),
        output.max_windows,
        output.total_duration_sec
    );
    if output.changes.is_empty() {
        println!("  (none - the run is too short for a change window)");
        return;
    }
    for change in &output.changes {
        println!(
            "  Window {:>3}: {:<10} at +{}s for {}s (t = {:.1}s .. {:.1}s, toward {} ms)",
            change.window.window_index,
            change.window.kind.as_str(),
            change.window.start_offset_sec,
            change.window.duration_sec,
            change.start_sec,
            change.end_sec,
            change.target_rate_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_plan_is_stable() {
        let rate = RateConfig::default();
        let a = build_plan(&rate, 60, Some(42));
        let b = build_plan(&rate, 60, Some(42));

        assert_eq!(a.max_windows, 5);
        assert!(!a.changes.is_empty() && a.changes.len() <= 5);
        let windows_a: Vec<_> = a.changes.iter().map(|c| c.window).collect();
        let windows_b: Vec<_> = b.changes.iter().map(|c| c.window).collect();
        assert_eq!(windows_a, windows_b);
    }

    #[test]
    fn test_absolute_times() {
        let rate = RateConfig::default();
        let plan = build_plan(&rate, 120, Some(3));
        for change in &plan.changes {
            let window_start = 10.0 + f64::from(change.window.window_index - 1) * 10.0;
            assert_eq!(
                change.start_sec,
                window_start + f64::from(change.window.start_offset_sec)
            );
            assert!(change.end_sec <= window_start + 10.0);
        }
    }

    #[test]
    fn test_short_run_has_no_changes() {
        let plan = build_plan(&RateConfig::default(), 15, Some(1));
        assert_eq!(plan.max_windows, 0);
        assert!(plan.changes.is_empty());

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["changes"], serde_json::json!([]));
    }

    #[test]
    fn test_json_flattens_window() {
        let plan = build_plan(&RateConfig::default(), 60, Some(9));
        let value = serde_json::to_value(&plan).unwrap();
        let first = &value["changes"][0];
        assert!(first.get("window_index").is_some());
        assert!(first.get("start_sec").is_some());
        assert_eq!(value["seed"], 9);
    }
}

//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Telemetry Sim - synthetic vehicle telemetry generator
#[derive(Parser, Debug)]
#[command(
    name = "telemetry-sim",
    author,
    version,
    about = "Synthetic vehicle telemetry generator",
    long_about = "Drives a simulated vehicle along a great-circle route and emits vehicle, GPS,\n\
                  traffic-camera, weather and emergency records on every tick, with the emission\n\
                  rate varied by randomly planned acceleration/deceleration windows."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TELEMETRY_SIM_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TELEMETRY_SIM_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the simulation until the vehicle arrives
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Print the planned rate change windows
    Plan(PlanArgs),
}

/// Overrides taken from the environment (or `.env`)
#[derive(Args, Debug, Clone, Default)]
pub struct TransportOverrides {
    /// Override the transport endpoint (host:port)
    #[arg(long, env = "KAFKA_BOOTSTRAP_SERVER")]
    pub bootstrap_server: Option<String>,

    /// Override the vehicle channel name
    #[arg(long, env = "VEHICLE_TOPIC")]
    pub vehicle_topic: Option<String>,

    /// Override the GPS channel name
    #[arg(long, env = "GPS_TOPIC")]
    pub gps_topic: Option<String>,

    /// Override the traffic-camera channel name
    #[arg(long, env = "TRAFFIC_TOPIC")]
    pub traffic_topic: Option<String>,

    /// Override the weather channel name
    #[arg(long, env = "WEATHER_TOPIC")]
    pub weather_topic: Option<String>,

    /// Override the emergency channel name
    #[arg(long, env = "EMERGENCY_TOPIC")]
    pub emergency_topic: Option<String>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); demo defaults when omitted
    #[arg(short, long, env = "TELEMETRY_SIM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: TransportOverrides,

    /// Random seed for the change schedule and record contents
    #[arg(long, env = "TELEMETRY_SIM_SEED")]
    pub seed: Option<u64>,

    /// Advance simulated time by a fixed step (seconds) without sleeping
    #[arg(
        long,
        value_name = "SECONDS",
        value_parser = parse_step_sec,
        conflicts_with = "virtual_clock"
    )]
    pub fixed_step: Option<f64>,

    /// Advance simulated time by the current rate without sleeping
    #[arg(long = "virtual")]
    pub virtual_clock: bool,

    /// Stop after this many ticks (0 = until arrival)
    #[arg(long, default_value = "0", env = "TELEMETRY_SIM_MAX_TICKS")]
    pub max_ticks: u64,

    /// Wall-clock timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "TELEMETRY_SIM_TIMEOUT")]
    pub timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TELEMETRY_SIM_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; demo defaults when omitted
    #[arg(short, long, env = "TELEMETRY_SIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,

    /// Print the effective configuration with defaults filled in (TOML, or JSON with --json)
    #[arg(long)]
    pub dump: bool,
}

/// Arguments for the `plan` command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// Path to configuration file; demo defaults when omitted
    #[arg(short, long, env = "TELEMETRY_SIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Random seed (overrides the configured one)
    #[arg(long, env = "TELEMETRY_SIM_SEED")]
    pub seed: Option<u64>,

    /// Total duration to plan for, in seconds (default: trip-time budget)
    #[arg(long)]
    pub duration: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

/// Fixed clock step: finite and strictly positive
fn parse_step_sec(s: &str) -> Result<f64, String> {
    let step: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if step.is_finite() && step > 0.0 {
        Ok(step)
    } else {
        Err(format!("step must be a finite number of seconds > 0, got {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fixed_step_must_advance_time() {
        for bad in ["0", "-1", "NaN", "inf"] {
            let result = Cli::try_parse_from(["telemetry-sim", "run", "--fixed-step", bad]);
            assert!(result.is_err(), "--fixed-step {bad} was accepted");
        }
        assert!(Cli::try_parse_from(["telemetry-sim", "run", "--fixed-step", "0.25"]).is_ok());
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "telemetry-sim",
            "-v",
            "run",
            "--fixed-step",
            "0.5",
            "--max-ticks",
            "10",
            "--seed",
            "42",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.fixed_step, Some(0.5));
        assert_eq!(args.max_ticks, 10);
        assert_eq!(args.seed, Some(42));
        assert!(!args.virtual_clock);
    }

    #[test]
    fn test_fixed_step_conflicts_with_virtual() {
        let result = Cli::try_parse_from([
            "telemetry-sim",
            "run",
            "--fixed-step",
            "1",
            "--virtual",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_plan() {
        let cli =
            Cli::try_parse_from(["telemetry-sim", "plan", "--duration", "120", "--json"]).unwrap();
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.duration, Some(120));
        assert!(args.json);
    }

    #[test]
    fn test_parse_info_dump() {
        let cli = Cli::try_parse_from(["telemetry-sim", "info", "--dump", "--json"]).unwrap();
        let Commands::Info(args) = cli.command else {
            panic!("expected info command");
        };
        assert!(args.dump && args.json && !args.sinks);
    }
}

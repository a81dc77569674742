//! # Telemetry Sim CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载、环境变量覆盖与验证
//! - 仿真运行编排与生命周期管理
//! - 优雅关闭处理 (Ctrl+C / SIGTERM)

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_plan, run_validate};
use error::CliError;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    observability::init_with_config(ObservabilityConfig::from_verbosity(
        cli.log_format.into(),
        cli.verbose,
        cli.quiet,
    ))
    .context("Failed to initialize logging")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry Sim CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
        Commands::Plan(args) => run_plan(args),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e:#}");
        let code = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<CliError>())
            .map_or(1, CliError::exit_code);
        std::process::exit(code);
    }

    Ok(())
}

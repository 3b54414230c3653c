//! Arbitrage client binary - one snapshot per run
//!
//! Usage:
//!   tandem_arb data/snapshot.json
//!   tandem_arb --config config/engine.toml --env production data/snapshot.json
//!   tandem_arb --print-config

use anyhow::{Context, Result};
use clap::Parser;
use config::{EngineConfig, LogFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tandem_arbitrage::{evaluate_snapshot, log_error, log_success};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tandem_arb")]
#[command(about = "Compare a weighted pool and a StableSwap pool for arbitrage")]
#[command(version)]
struct Args {
    /// Pool snapshot (JSON); falls back to global.snapshot_path
    snapshot: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay from config/environments/<ENV>.toml
    #[arg(short, long)]
    env: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            // Logging may not be initialized yet
            eprintln!("tandem_arb: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let config = EngineConfig::load(args.config.as_deref(), args.env.as_deref())
        .context("Failed to load engine configuration")?;

    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(&config)?;
    info!("Starting Tandem arbitrage check");

    let snapshot = args
        .snapshot
        .or_else(|| config.global.snapshot_path.clone())
        .context("No snapshot given on the command line or in global.snapshot_path")?;

    match evaluate_snapshot(&config, &snapshot) {
        Ok(Some(opportunity)) => {
            log_success!(
                "Profitable: {} with {}% net",
                opportunity.direction,
                opportunity.net_profit_percent.round_dp(4)
            );
            println!("{}", serde_json::to_string_pretty(&opportunity)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => {
            info!(
                "No opportunity above {}% net profit",
                config.detector.min_profit_percent
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log_error!("Evaluation failed: {:#}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_logging(config: &EngineConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.global.log_level))
        .with_context(|| format!("Invalid log level {:?}", config.global.log_level))?;

    match config.global.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    Ok(())
}

//! bitpeer - P2P offer pricing engine - Entry Point

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

/// Executable-price and liquidity analytics for P2P crypto marketplaces
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BITPEER_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Debug logging when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and print the effective configuration
    Doctor,
    /// Normalize one day of raw fetch records
    Process {
        /// UTC day to process (defaults to today)
        #[arg(long)]
        day: Option<NaiveDate>,
    },
    /// Compute execution, liquidity and combo metrics for one day
    Analyze {
        /// UTC day to analyze (defaults to today)
        #[arg(long)]
        day: Option<NaiveDate>,
        /// Print Prometheus metrics when done
        #[arg(long)]
        metrics: bool,
    },
}

fn day_key(day: Option<NaiveDate>) -> String {
    day.unwrap_or_else(|| Utc::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        bitpeer_telemetry::init_logging_with_default("debug")?;
    } else {
        bitpeer_telemetry::init_logging()?;
    }

    info!("Starting bitpeer v{}", env!("CARGO_PKG_VERSION"));

    let config_path = bitpeer_cli::AppConfig::resolve_path(args.config);
    info!(config_path = %config_path, "Loading configuration");

    let config = bitpeer_cli::AppConfig::from_file(&config_path)?;
    config.validate()?;
    info!(
        data_dir = %config.app.data_dir.display(),
        markets = config.markets.len(),
        intents = config.intents.len(),
        combos = config.combos.len(),
        "Configuration loaded"
    );

    match args.command {
        Command::Doctor => {
            println!("{}", config.to_toml()?);
        }
        Command::Process { day } => {
            let day = day_key(day);
            let summary = bitpeer_cli::process_day(&config, &day)?;
            println!(
                "{day}: {} records ({} skipped), {} offers, {} malformed -> {}",
                summary.records,
                summary.failed_records,
                summary.offers,
                summary.malformed,
                summary.output.display()
            );
        }
        Command::Analyze { day, metrics } => {
            let day = day_key(day);
            let summary = bitpeer_cli::analyze_day(Arc::new(config), &day).await?;
            println!(
                "{day}: {} snapshots, {} executions, {} liquidity, {} combos -> {}",
                summary.snapshots,
                summary.executions,
                summary.liquidity,
                summary.combos,
                summary.output.display()
            );
            if metrics {
                print!("{}", bitpeer_telemetry::Metrics::gather_text()?);
            }
        }
    }

    Ok(())
}

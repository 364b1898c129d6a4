//! Warehouse Insight CLI
//!
//! A command-line front end for the insight engine: reads a telemetry
//! replay file, runs the heuristics, and renders recommendations,
//! anomalies, forecasts, issue summaries, and cost attribution as tables
//! or JSON.

mod commands;
mod config;
mod output;
mod replay;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use insight_engine::InsightEngine;
use tracing_subscriber::EnvFilter;

use commands::costs::GroupBy;
use commands::{anomalies, costs, issues, recommendations};
use config::CliConfig;
use output::OutputFormat;
use replay::ReplaySource;

/// Warehouse Insight CLI
#[derive(Parser)]
#[command(name = "insight")]
#[command(author, version, about = "Insight reports over warehouse usage telemetry", long_about = None)]
pub struct Cli {
    /// Path to the telemetry replay file (JSON)
    #[arg(long, short, env = "INSIGHT_REPLAY")]
    pub input: std::path::PathBuf,

    /// Report date (defaults to the newest metering day in the replay)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sizing recommendations per resource
    Recommendations,

    /// Daily cost anomaly classification
    Anomalies,

    /// Linear-trend cost forecast
    Forecast,

    /// Query issue summary
    Issues,

    /// Cost attribution and concentration
    Costs {
        /// Grouping dimension
        #[arg(long, default_value = "resource")]
        by: GroupBy,
    },

    /// Every report in sequence
    Report,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load().context("failed to load configuration")?;
    let source = ReplaySource::load(&cli.input)?;

    let as_of = cli
        .as_of
        .or_else(|| source.latest_metering_day())
        .ok_or_else(|| anyhow!("replay file has no metering facts; pass --as-of explicitly"))?;

    let cost_per_credit = config.cost_per_credit;
    let engine = InsightEngine::new(source, config.engine);

    match cli.command {
        Commands::Recommendations => {
            recommendations::show_recommendations(&engine, as_of, cli.format)?;
        }
        Commands::Anomalies => {
            anomalies::show_anomalies(&engine, as_of, cost_per_credit, cli.format)?;
        }
        Commands::Forecast => {
            costs::show_forecast(&engine, as_of, cost_per_credit, cli.format)?;
        }
        Commands::Issues => {
            issues::show_issues(&engine, as_of, cli.format)?;
        }
        Commands::Costs { by } => {
            costs::show_costs(&engine, as_of, by, cost_per_credit, cli.format)?;
        }
        Commands::Report => {
            // Sections share the cached telemetry fetches within this run.
            recommendations::show_recommendations(&engine, as_of, cli.format)?;
            anomalies::show_anomalies(&engine, as_of, cost_per_credit, cli.format)?;
            if let Err(err) = costs::show_forecast(&engine, as_of, cost_per_credit, cli.format) {
                match err.downcast_ref::<insight_engine::EngineError>() {
                    Some(insight_engine::EngineError::InsufficientData { .. }) => {
                        output::print_warning("Not enough history for a forecast; skipping")
                    }
                    _ => return Err(err),
                }
            }
            issues::show_issues(&engine, as_of, cli.format)?;
            costs::show_costs(&engine, as_of, GroupBy::Resource, cost_per_credit, cli.format)?;
        }
    }

    Ok(())
}

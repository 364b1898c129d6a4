//! Cost anomaly report

use anyhow::Result;
use chrono::NaiveDate;
use insight_engine::{InsightEngine, Severity};
use tabled::Tabled;

use crate::output::{color_severity, format_currency, print_info, print_table, OutputFormat};
use crate::replay::ReplaySource;

/// Row for the anomaly table
#[derive(Tabled)]
struct AnomalyRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Baseline")]
    baseline: String,
    #[tabled(rename = "Z-Score")]
    z_score: String,
    #[tabled(rename = "Severity")]
    severity: String,
}

/// Show the z-score classification of every day in the window
pub fn show_anomalies(
    engine: &InsightEngine<ReplaySource>,
    as_of: NaiveDate,
    cost_per_credit: f64,
    format: OutputFormat,
) -> Result<()> {
    let points = engine.cost_anomalies(as_of)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        OutputFormat::Table => {
            let rows: Vec<AnomalyRow> = points
                .iter()
                .map(|p| AnomalyRow {
                    date: p.timestamp.to_string(),
                    cost: format_currency(p.observed_value * cost_per_credit),
                    baseline: format_currency(p.baseline_mean * cost_per_credit),
                    z_score: format!("{:.2}", p.z_score),
                    severity: color_severity(p.severity),
                })
                .collect();
            print_table(&rows);

            let critical = points
                .iter()
                .filter(|p| p.severity == Severity::Critical)
                .count();
            let warning = points
                .iter()
                .filter(|p| p.severity == Severity::Warning)
                .count();
            print_info(&format!(
                "{} critical, {} warning across {} days",
                critical,
                warning,
                points.len()
            ));
        }
    }

    Ok(())
}

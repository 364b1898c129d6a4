//! Cost attribution and forecast reports

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;
use insight_engine::{CostBreakdown, InsightEngine};
use tabled::Tabled;

use crate::output::{format_currency, print_info, print_table, print_warning, OutputFormat};
use crate::replay::ReplaySource;

/// Grouping dimension for cost attribution
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum GroupBy {
    /// Group by compute resource
    #[default]
    Resource,
    /// Group by the secondary dimension (user, service, database)
    Dimension,
}

/// Row for the attribution table
#[derive(Tabled)]
struct AttributionRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "% of Total")]
    percent: String,
}

/// Row for the forecast table
#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Predicted Cost")]
    predicted: String,
}

/// Show the ranked cost breakdown and its concentration point
pub fn show_costs(
    engine: &InsightEngine<ReplaySource>,
    as_of: NaiveDate,
    by: GroupBy,
    cost_per_credit: f64,
    format: OutputFormat,
) -> Result<()> {
    let breakdown: CostBreakdown = match by {
        GroupBy::Resource => engine.cost_by_resource(as_of)?,
        GroupBy::Dimension => engine.cost_by_dimension(as_of)?,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
        }
        OutputFormat::Table => {
            let rows: Vec<AttributionRow> = breakdown
                .rows
                .iter()
                .map(|r| AttributionRow {
                    group: r.group_key.clone(),
                    cost: format_currency(r.total_cost * cost_per_credit),
                    percent: format!("{:.1}%", r.percent_of_total),
                })
                .collect();
            print_table(&rows);

            if let Some(point) = &breakdown.concentration {
                print_info(&format!(
                    "Top {} of {} groups account for {:.1}% of cost",
                    point.group_count,
                    breakdown.rows.len(),
                    point.cumulative_percent
                ));
            }
        }
    }

    Ok(())
}

/// Show the linear-trend cost forecast past the window
pub fn show_forecast(
    engine: &InsightEngine<ReplaySource>,
    as_of: NaiveDate,
    cost_per_credit: f64,
    format: OutputFormat,
) -> Result<()> {
    let forecast = engine.cost_forecast(as_of)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&forecast)?);
        }
        OutputFormat::Table => {
            let rows: Vec<ForecastRow> = forecast
                .points
                .iter()
                .map(|p| ForecastRow {
                    date: p.timestamp.to_string(),
                    predicted: format_currency(p.predicted_value * cost_per_credit),
                })
                .collect();
            print_table(&rows);

            let total: f64 = forecast.points.iter().map(|p| p.predicted_value).sum();
            println!(
                "{} {} | Trend: {}/day | R² = {:.3}",
                format!("{}-Day Forecast:", forecast.points.len()).bold(),
                format_currency(total * cost_per_credit).bold(),
                format_currency(forecast.slope * cost_per_credit),
                forecast.r_squared
            );
            if forecast.r_squared < 0.5 {
                print_warning("Low R²: the linear trend explains little of the variance");
            }
        }
    }

    Ok(())
}

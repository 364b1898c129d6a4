//! Sizing recommendation report

use anyhow::Result;
use chrono::NaiveDate;
use insight_engine::{InsightEngine, SizingAction};
use tabled::Tabled;

use crate::output::{color_action, format_optional, print_info, print_table, OutputFormat};
use crate::replay::ReplaySource;

/// Row for the recommendations table
#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Avg Queue (s)")]
    avg_queue: String,
    #[tabled(rename = "Avg Load")]
    avg_load: String,
    #[tabled(rename = "Queries")]
    queries: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Show sizing recommendations for every resource with a known size class
pub fn show_recommendations(
    engine: &InsightEngine<ReplaySource>,
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let recommendations = engine.sizing_recommendations(as_of)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        }
        OutputFormat::Table => {
            let rows: Vec<RecommendationRow> = recommendations
                .iter()
                .map(|r| RecommendationRow {
                    resource: r.resource_id.clone(),
                    size: r.evidence.size.to_string(),
                    action: color_action(r.action),
                    avg_queue: format_optional(r.evidence.avg_queue_depth),
                    avg_load: format_optional(r.evidence.avg_concurrent_load),
                    queries: r
                        .evidence
                        .query_count
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    reason: r.reason.as_str().to_string(),
                })
                .collect();
            print_table(&rows);

            let actionable = recommendations
                .iter()
                .filter(|r| r.action != SizingAction::Optimal)
                .count();
            if actionable > 0 {
                print_info(&format!(
                    "{} of {} resources have a sizing action",
                    actionable,
                    recommendations.len()
                ));
            }
        }
    }

    Ok(())
}

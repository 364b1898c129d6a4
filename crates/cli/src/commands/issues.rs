//! Query issue report

use anyhow::Result;
use chrono::NaiveDate;
use insight_engine::InsightEngine;
use tabled::Tabled;

use crate::output::{format_bytes, print_info, print_table, OutputFormat};
use crate::replay::ReplaySource;

/// Row for the issue summary table
#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Issue")]
    issue: String,
    #[tabled(rename = "Queries")]
    count: u64,
    #[tabled(rename = "Avg Elapsed (s)")]
    avg_elapsed: String,
    #[tabled(rename = "Bytes Scanned")]
    bytes_scanned: String,
}

/// Show per-tag aggregates over the window's query history
pub fn show_issues(
    engine: &InsightEngine<ReplaySource>,
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let aggregates = engine.query_issue_summary(as_of)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&aggregates)?);
        }
        OutputFormat::Table => {
            if aggregates.is_empty() {
                print_info("No query issues detected in the window");
                return Ok(());
            }

            let rows: Vec<IssueRow> = aggregates
                .iter()
                .map(|a| IssueRow {
                    issue: a.tag.to_string(),
                    count: a.count,
                    avg_elapsed: format!("{:.1}", a.avg_elapsed_seconds),
                    bytes_scanned: format_bytes(a.total_bytes_scanned),
                })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}

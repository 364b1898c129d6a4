//! Core data models for the insight engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of aggregated telemetry: a daily measure for a resource,
/// optionally broken down by a secondary dimension (user, service,
/// database). The source guarantees one row per
/// `(timestamp, resource_id, dimension)` tuple within a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFact {
    pub timestamp: NaiveDate,
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    pub value: f64,
}

/// Execution status of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Failure,
}

/// One row describing a single executed query.
///
/// `partitions_total == 0` means partition pruning is not applicable to the
/// query, not that everything was pruned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub resource_id: String,
    pub elapsed_seconds: f64,
    pub queued_seconds: f64,
    pub compiled_seconds: f64,
    pub bytes_scanned: u64,
    pub bytes_spilled_local: u64,
    pub bytes_spilled_remote: u64,
    pub partitions_scanned: u64,
    pub partitions_total: u64,
    pub status: QueryStatus,
}

/// Compute size classes, ordered smallest to largest.
///
/// The ordering is load-bearing: the advisor's downsize rule compares a
/// resource's class against a configured cutoff instead of matching label
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeClass {
    #[serde(rename = "x-small")]
    XSmall,
    #[serde(rename = "small")]
    Small,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "large")]
    Large,
    #[serde(rename = "x-large")]
    XLarge,
    #[serde(rename = "2x-large")]
    X2Large,
    #[serde(rename = "3x-large")]
    X3Large,
    #[serde(rename = "4x-large")]
    X4Large,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::XSmall => "X-Small",
            SizeClass::Small => "Small",
            SizeClass::Medium => "Medium",
            SizeClass::Large => "Large",
            SizeClass::XLarge => "X-Large",
            SizeClass::X2Large => "2X-Large",
            SizeClass::X3Large => "3X-Large",
            SizeClass::X4Large => "4X-Large",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource usage summary derived fresh from telemetry on every engine
/// invocation; never persisted.
///
/// The load-history fields are `Option`s: `None` means the corresponding
/// rows were missing from the source, which is different from an observed
/// zero. Consumers must not collapse the two (the advisor skips any rule
/// whose input is absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsageSummary {
    pub resource_id: String,
    /// Total metered value (credits) over the window.
    pub total_value: f64,
    /// Number of distinct days with metering activity.
    pub active_periods: u32,
    /// Mean concurrently-running query load, if load history was supplied.
    pub avg_concurrent_load: Option<f64>,
    /// Mean queue wait in seconds, if load history was supplied.
    pub avg_queue_depth: Option<f64>,
    /// Number of queries executed, if query history was supplied.
    pub query_count: Option<u64>,
}

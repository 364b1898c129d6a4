//! Query issue classification
//!
//! Tags individual query records with problem categories from a fixed,
//! closed vocabulary. Every predicate is evaluated independently, so a
//! record can carry several tags at once; this replaces a single-label
//! precedence chain with rules that are testable and extensible on their
//! own.

use crate::error::EngineError;
use crate::models::{QueryRecord, QueryStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

const GIB: u64 = 1024 * 1024 * 1024;

/// Elapsed seconds above which a query is long-running.
pub const LONG_RUNNING_SECONDS: f64 = 300.0;
/// Queue seconds above which a query waited too long for a slot.
pub const HIGH_QUEUE_SECONDS: f64 = 60.0;
/// Local spill bytes above which spilling is excessive (1 GiB).
pub const LOCAL_SPILL_BYTES: u64 = GIB;
/// Scanned bytes above which a query reads excessively (10 GiB).
pub const EXCESSIVE_SCAN_BYTES: u64 = 10 * GIB;
/// Compilation share of elapsed time above which compilation dominates.
pub const COMPILE_OVERHEAD_RATIO: f64 = 0.3;
/// Partition count below which pruning quality is not judged.
pub const PRUNING_MIN_PARTITIONS: u64 = 100;
/// Scanned-partition share above which pruning is poor.
pub const PRUNING_SCAN_RATIO: f64 = 0.8;

/// Closed issue vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueTag {
    LongRunning,
    HighQueue,
    RemoteSpill,
    LocalSpill,
    CompileOverhead,
    Failed,
    ExcessiveScan,
    PoorPruning,
}

impl IssueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueTag::LongRunning => "LONG_RUNNING",
            IssueTag::HighQueue => "HIGH_QUEUE",
            IssueTag::RemoteSpill => "REMOTE_SPILL",
            IssueTag::LocalSpill => "LOCAL_SPILL",
            IssueTag::CompileOverhead => "COMPILE_OVERHEAD",
            IssueTag::Failed => "FAILED",
            IssueTag::ExcessiveScan => "EXCESSIVE_SCAN",
            IssueTag::PoorPruning => "POOR_PRUNING",
        }
    }
}

impl fmt::Display for IssueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tag rollup over all tagged records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueAggregate {
    pub tag: IssueTag,
    pub count: u64,
    pub avg_elapsed_seconds: f64,
    pub total_bytes_scanned: u64,
}

/// Tag one record with every issue it exhibits.
///
/// Rejects records whose partition counters violate the
/// `partitions_scanned <= partitions_total` invariant (when
/// `partitions_total > 0`; zero means pruning is not applicable).
pub fn classify(record: &QueryRecord) -> Result<Vec<IssueTag>, EngineError> {
    if record.partitions_total > 0 && record.partitions_scanned > record.partitions_total {
        return Err(EngineError::InvalidRecord {
            field: "partitions_scanned",
            value: record.partitions_scanned.to_string(),
            reason: "exceeds partitions_total",
        });
    }

    let mut tags = Vec::new();

    if record.elapsed_seconds > LONG_RUNNING_SECONDS {
        tags.push(IssueTag::LongRunning);
    }
    if record.queued_seconds > HIGH_QUEUE_SECONDS {
        tags.push(IssueTag::HighQueue);
    }
    if record.bytes_spilled_remote > 0 {
        tags.push(IssueTag::RemoteSpill);
    }
    if record.bytes_spilled_local > LOCAL_SPILL_BYTES {
        tags.push(IssueTag::LocalSpill);
    }
    // Undefined at zero elapsed time; skip rather than divide.
    if record.elapsed_seconds > 0.0
        && record.compiled_seconds / record.elapsed_seconds > COMPILE_OVERHEAD_RATIO
    {
        tags.push(IssueTag::CompileOverhead);
    }
    if record.status != QueryStatus::Success {
        tags.push(IssueTag::Failed);
    }
    if record.bytes_scanned > EXCESSIVE_SCAN_BYTES {
        tags.push(IssueTag::ExcessiveScan);
    }
    if record.partitions_total > PRUNING_MIN_PARTITIONS
        && record.partitions_scanned as f64 / record.partitions_total as f64 > PRUNING_SCAN_RATIO
    {
        tags.push(IssueTag::PoorPruning);
    }

    Ok(tags)
}

/// Group all tagged records by tag and roll up counts, mean elapsed time,
/// and scanned bytes. Untagged records appear in no group; the classifier
/// reports no overall total.
pub fn aggregate(records: &[QueryRecord]) -> Result<Vec<IssueAggregate>, EngineError> {
    struct Acc {
        count: u64,
        elapsed_sum: f64,
        bytes_scanned: u64,
    }

    let mut groups: BTreeMap<IssueTag, Acc> = BTreeMap::new();
    for record in records {
        for tag in classify(record)? {
            let acc = groups.entry(tag).or_insert(Acc {
                count: 0,
                elapsed_sum: 0.0,
                bytes_scanned: 0,
            });
            acc.count += 1;
            acc.elapsed_sum += record.elapsed_seconds;
            acc.bytes_scanned += record.bytes_scanned;
        }
    }

    let aggregates: Vec<IssueAggregate> = groups
        .into_iter()
        .map(|(tag, acc)| IssueAggregate {
            tag,
            count: acc.count,
            avg_elapsed_seconds: acc.elapsed_sum / acc.count as f64,
            total_bytes_scanned: acc.bytes_scanned,
        })
        .collect();

    debug!(
        records = records.len(),
        tags = aggregates.len(),
        "query issues aggregated"
    );

    Ok(aggregates)
}

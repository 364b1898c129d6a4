//! Per-resource usage summarization
//!
//! Derives [`ResourceUsageSummary`] values from the raw fact slices: daily
//! metering facts (credits), load-history samples (concurrent running
//! queries and queue wait), and the query history. Summaries are computed
//! fresh on every invocation and never persisted.
//!
//! Load history and query history are optional as whole inputs. When a
//! slice is absent the derived fields are `None` for every resource, so a
//! missing feed can never masquerade as an observed zero downstream.

use crate::models::{MetricFact, QueryRecord, ResourceUsageSummary};
use crate::stats;
use std::collections::{BTreeMap, BTreeSet};

/// Raw inputs for one summarization pass over a window.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryInputs<'a> {
    /// Daily metered credits per resource.
    pub metering: &'a [MetricFact],
    /// Samples of concurrently running query load, if the feed was present.
    pub concurrency: Option<&'a [MetricFact]>,
    /// Samples of queue wait seconds, if the feed was present.
    pub queueing: Option<&'a [MetricFact]>,
    /// Query history, if the feed was present.
    pub queries: Option<&'a [QueryRecord]>,
}

/// Summarize every resource seen in any of the input slices.
///
/// Output is sorted by resource id. A resource present in metering but
/// absent from a supplied query history gets `query_count: Some(0)` — it
/// truly ran nothing; with no query history at all it gets `None`.
pub fn summarize(inputs: &SummaryInputs<'_>) -> Vec<ResourceUsageSummary> {
    let mut resources: BTreeSet<&str> = BTreeSet::new();
    for fact in inputs.metering {
        resources.insert(&fact.resource_id);
    }
    for fact in inputs.concurrency.unwrap_or(&[]) {
        resources.insert(&fact.resource_id);
    }
    for fact in inputs.queueing.unwrap_or(&[]) {
        resources.insert(&fact.resource_id);
    }
    for record in inputs.queries.unwrap_or(&[]) {
        resources.insert(&record.resource_id);
    }

    let query_counts: Option<BTreeMap<&str, u64>> = inputs.queries.map(|records| {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for record in records {
            *counts.entry(record.resource_id.as_str()).or_insert(0) += 1;
        }
        counts
    });

    resources
        .into_iter()
        .map(|resource_id| {
            let metering: Vec<&MetricFact> = inputs
                .metering
                .iter()
                .filter(|f| f.resource_id == resource_id)
                .collect();
            let total_value = metering.iter().map(|f| f.value).sum();
            let active_periods = metering
                .iter()
                .map(|f| f.timestamp)
                .collect::<BTreeSet<_>>()
                .len() as u32;

            ResourceUsageSummary {
                resource_id: resource_id.to_string(),
                total_value,
                active_periods,
                avg_concurrent_load: mean_for(inputs.concurrency, resource_id),
                avg_queue_depth: mean_for(inputs.queueing, resource_id),
                query_count: query_counts
                    .as_ref()
                    .map(|counts| counts.get(resource_id).copied().unwrap_or(0)),
            }
        })
        .collect()
}

// Mean of a resource's samples within an optional feed. `None` when the
// feed itself was absent, or when it carries no rows for the resource (no
// samples is not an observed zero).
fn mean_for(feed: Option<&[MetricFact]>, resource_id: &str) -> Option<f64> {
    let values: Vec<f64> = feed?
        .iter()
        .filter(|f| f.resource_id == resource_id)
        .map(|f| f.value)
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(stats::mean(&values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryStatus;
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
    }

    fn fact(resource: &str, day_of_month: u32, value: f64) -> MetricFact {
        MetricFact {
            timestamp: day(day_of_month),
            resource_id: resource.to_string(),
            dimension: None,
            value,
        }
    }

    fn query(resource: &str, id: &str) -> QueryRecord {
        QueryRecord {
            id: id.to_string(),
            resource_id: resource.to_string(),
            elapsed_seconds: 5.0,
            queued_seconds: 0.0,
            compiled_seconds: 0.1,
            bytes_scanned: 1024,
            bytes_spilled_local: 0,
            bytes_spilled_remote: 0,
            partitions_scanned: 1,
            partitions_total: 10,
            status: QueryStatus::Success,
        }
    }

    #[test]
    fn test_totals_and_active_periods() {
        let metering = vec![
            fact("wh1", 1, 10.0),
            fact("wh1", 2, 14.0),
            fact("wh1", 2, 6.0), // second dimension row on the same day
            fact("wh2", 1, 3.0),
        ];
        let summaries = summarize(&SummaryInputs {
            metering: &metering,
            ..Default::default()
        });

        assert_eq!(summaries.len(), 2);
        let wh1 = &summaries[0];
        assert_eq!(wh1.resource_id, "wh1");
        assert_eq!(wh1.total_value, 30.0);
        assert_eq!(wh1.active_periods, 2);
    }

    #[test]
    fn test_absent_feeds_yield_none() {
        let metering = vec![fact("wh1", 1, 5.0)];
        let summaries = summarize(&SummaryInputs {
            metering: &metering,
            ..Default::default()
        });
        let wh1 = &summaries[0];
        assert_eq!(wh1.avg_concurrent_load, None);
        assert_eq!(wh1.avg_queue_depth, None);
        assert_eq!(wh1.query_count, None);
    }

    #[test]
    fn test_supplied_query_history_distinguishes_zero() {
        let metering = vec![fact("busy", 1, 5.0), fact("idle", 1, 2.0)];
        let queries = vec![query("busy", "q1"), query("busy", "q2")];
        let summaries = summarize(&SummaryInputs {
            metering: &metering,
            queries: Some(&queries),
            ..Default::default()
        });

        let busy = summaries.iter().find(|s| s.resource_id == "busy").unwrap();
        let idle = summaries.iter().find(|s| s.resource_id == "idle").unwrap();
        assert_eq!(busy.query_count, Some(2));
        assert_eq!(idle.query_count, Some(0));
    }

    #[test]
    fn test_load_feed_without_rows_for_resource_is_none() {
        let metering = vec![fact("wh1", 1, 5.0), fact("wh2", 1, 5.0)];
        let concurrency = vec![fact("wh1", 1, 2.0), fact("wh1", 2, 4.0)];
        let summaries = summarize(&SummaryInputs {
            metering: &metering,
            concurrency: Some(&concurrency),
            ..Default::default()
        });

        let wh1 = summaries.iter().find(|s| s.resource_id == "wh1").unwrap();
        let wh2 = summaries.iter().find(|s| s.resource_id == "wh2").unwrap();
        assert_eq!(wh1.avg_concurrent_load, Some(3.0));
        assert_eq!(wh2.avg_concurrent_load, None);
    }

    #[test]
    fn test_resource_only_in_query_history_is_included() {
        let queries = vec![query("loader", "q1")];
        let summaries = summarize(&SummaryInputs {
            metering: &[],
            queries: Some(&queries),
            ..Default::default()
        });
        let loader = &summaries[0];
        assert_eq!(loader.resource_id, "loader");
        assert_eq!(loader.total_value, 0.0);
        assert_eq!(loader.active_periods, 0);
        assert_eq!(loader.query_count, Some(1));
    }

    #[test]
    fn test_output_sorted_by_resource_id() {
        let metering = vec![fact("zeta", 1, 1.0), fact("alpha", 1, 1.0)];
        let summaries = summarize(&SummaryInputs {
            metering: &metering,
            ..Default::default()
        });
        assert_eq!(summaries[0].resource_id, "alpha");
        assert_eq!(summaries[1].resource_id, "zeta");
    }
}

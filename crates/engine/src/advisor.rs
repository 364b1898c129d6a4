//! Resource sizing advisor
//!
//! Classifies each compute resource into a sizing action from queueing and
//! utilization signals. Rules are evaluated in a fixed priority order and
//! the first match wins, which resolves the case where several conditions
//! hold at once (a queueing resource with zero recorded queries is
//! resource-constrained, not idle).

use crate::error::EngineError;
use crate::models::{ResourceUsageSummary, SizeClass};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Sizing action for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingAction {
    Upsize,
    Downsize,
    SuspendOrDrop,
    Optimal,
}

/// Fixed reason vocabulary backing the recommendation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationReason {
    QueueingObserved,
    LowUtilizationAtLargeSize,
    NoActivityInWindow,
    OptimallySized,
}

impl RecommendationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationReason::QueueingObserved => {
                "queueing observed - workload is resource-constrained"
            }
            RecommendationReason::LowUtilizationAtLargeSize => {
                "sustained low utilization at large size"
            }
            RecommendationReason::NoActivityInWindow => "no activity in window",
            RecommendationReason::OptimallySized => "resource is optimally sized",
        }
    }
}

/// The summary fields that triggered the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingEvidence {
    pub size: SizeClass,
    pub avg_queue_depth: Option<f64>,
    pub avg_concurrent_load: Option<f64>,
    pub query_count: Option<u64>,
}

/// One sizing recommendation for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub resource_id: String,
    pub action: SizingAction,
    pub reason: RecommendationReason,
    pub evidence: SizingEvidence,
}

/// Advisor thresholds.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Average queue seconds above which a resource is under-provisioned.
    pub queue_threshold_seconds: f64,
    /// Smallest size class eligible for the low-utilization downsize rule.
    pub downsize_cutoff: SizeClass,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            queue_threshold_seconds: 5.0,
            downsize_cutoff: SizeClass::Large,
        }
    }
}

/// Classifies resources into sizing actions.
#[derive(Debug, Clone, Default)]
pub struct ResourceAdvisor {
    config: AdvisorConfig,
}

impl ResourceAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    /// Recommend an action for one resource.
    ///
    /// A load-history field that is `None` was missing at the source and
    /// skips the rule that reads it; it is never treated as an observed
    /// zero. In particular `query_count: None` must not produce
    /// `SuspendOrDrop`.
    pub fn recommend(
        &self,
        summary: &ResourceUsageSummary,
        size: SizeClass,
    ) -> Result<Recommendation, EngineError> {
        validate_load_field("avg_queue_depth", summary.avg_queue_depth)?;
        validate_load_field("avg_concurrent_load", summary.avg_concurrent_load)?;

        let (action, reason) = if summary
            .avg_queue_depth
            .is_some_and(|q| q > self.config.queue_threshold_seconds)
        {
            (SizingAction::Upsize, RecommendationReason::QueueingObserved)
        } else if summary.avg_concurrent_load.is_some_and(|l| l < 1.0)
            && size >= self.config.downsize_cutoff
        {
            (
                SizingAction::Downsize,
                RecommendationReason::LowUtilizationAtLargeSize,
            )
        } else if summary.query_count == Some(0) {
            (
                SizingAction::SuspendOrDrop,
                RecommendationReason::NoActivityInWindow,
            )
        } else {
            (SizingAction::Optimal, RecommendationReason::OptimallySized)
        };

        if action != SizingAction::Optimal {
            info!(
                resource_id = %summary.resource_id,
                action = ?action,
                size = %size,
                avg_queue_depth = ?summary.avg_queue_depth,
                avg_concurrent_load = ?summary.avg_concurrent_load,
                query_count = ?summary.query_count,
                "sizing recommendation"
            );
        }

        Ok(Recommendation {
            resource_id: summary.resource_id.clone(),
            action,
            reason,
            evidence: SizingEvidence {
                size,
                avg_queue_depth: summary.avg_queue_depth,
                avg_concurrent_load: summary.avg_concurrent_load,
                query_count: summary.query_count,
            },
        })
    }

    /// Recommend actions for a batch of size-annotated summaries.
    pub fn recommend_all(
        &self,
        inputs: &[(ResourceUsageSummary, SizeClass)],
    ) -> Result<Vec<Recommendation>, EngineError> {
        inputs
            .iter()
            .map(|(summary, size)| self.recommend(summary, *size))
            .collect()
    }
}

fn validate_load_field(field: &'static str, value: Option<f64>) -> Result<(), EngineError> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            return Err(EngineError::InvalidRecord {
                field,
                value: v.to_string(),
                reason: "must be a finite non-negative number",
            });
        }
    }
    Ok(())
}

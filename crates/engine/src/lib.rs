//! Insight engine for warehouse usage telemetry
//!
//! This crate provides the core functionality for:
//! - Cost anomaly detection over daily metering series
//! - Short-horizon cost forecasting
//! - Resource sizing recommendations
//! - Query issue classification
//! - Cost attribution and concentration statistics
//! - TTL-based result caching around the telemetry fetches
//!
//! The engine is synchronous and pure over in-memory tabular input; all
//! I/O lives behind the [`TelemetrySource`] trait and happens before the
//! heuristics run.

pub mod advisor;
pub mod anomaly;
pub mod attribution;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod models;
pub mod source;
pub mod stats;
pub mod summary;

pub use advisor::{
    AdvisorConfig, Recommendation, RecommendationReason, ResourceAdvisor, SizingAction,
    SizingEvidence,
};
pub use anomaly::{AnomalyDetector, AnomalyPoint, Severity};
pub use attribution::{AttributionRow, ConcentrationPoint, CostAttribution, CostBreakdown};
pub use cache::{CacheKey, ResultCache};
pub use classifier::{IssueAggregate, IssueTag};
pub use config::EngineConfig;
pub use engine::InsightEngine;
pub use error::EngineError;
pub use forecast::{Forecast, ForecastPoint, TrendForecaster};
pub use models::{MetricFact, QueryRecord, QueryStatus, ResourceUsageSummary, SizeClass};
pub use source::{LookbackWindow, TelemetrySource};

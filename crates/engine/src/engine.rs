//! Engine facade
//!
//! Wires a [`TelemetrySource`] implementation, the configuration, and the
//! result cache in front of the analytics. Each operation fetches the rows
//! it needs through the cache (so repeated dashboard-style invocations
//! within the TTL hit memory, not the source), runs the pure computation,
//! and returns plain structured records for the caller to render.

use crate::advisor::{AdvisorConfig, Recommendation, ResourceAdvisor};
use crate::anomaly::{AnomalyDetector, AnomalyPoint};
use crate::attribution::{CostAttribution, CostBreakdown};
use crate::cache::{CacheKey, ResultCache};
use crate::classifier::{self, IssueAggregate};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::forecast::{Forecast, TrendForecaster};
use crate::models::{MetricFact, ResourceUsageSummary};
use crate::source::{LookbackWindow, TelemetrySource};
use crate::summary::{self, SummaryInputs};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Stateless insight computation over one telemetry source.
///
/// The only cross-request state is the result cache; every analytic output
/// is recomputed from fetched rows once the TTL lapses or after
/// [`InsightEngine::refresh`].
pub struct InsightEngine<S: TelemetrySource> {
    source: S,
    config: EngineConfig,
    cache: ResultCache,
    detector: AnomalyDetector,
    forecaster: TrendForecaster,
    advisor: ResourceAdvisor,
    attribution: CostAttribution,
}

impl<S: TelemetrySource> InsightEngine<S> {
    pub fn new(source: S, config: EngineConfig) -> Self {
        let detector = AnomalyDetector::new(config.z_score_warning, config.z_score_critical);
        let forecaster = TrendForecaster::new(config.forecast_horizon_days);
        let advisor = ResourceAdvisor::new(AdvisorConfig {
            queue_threshold_seconds: config.queue_threshold_seconds,
            downsize_cutoff: config.downsize_cutoff,
        });
        Self {
            source,
            config,
            cache: ResultCache::new(),
            detector,
            forecaster,
            advisor,
            attribution: CostAttribution::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Look-back window ending at `as_of`.
    pub fn window(&self, as_of: NaiveDate) -> LookbackWindow {
        LookbackWindow::ending(as_of, self.config.lookback_days)
    }

    /// Drop every cached result; the next call of each operation refetches.
    pub fn refresh(&self) {
        self.cache.invalidate_all();
    }

    /// Total daily cost series over the window, summed across resources
    /// and dimensions.
    ///
    /// The series spans the first through the last day with observed
    /// metering inside the window, with interior gaps filled with zero, so
    /// downstream consumers always see one contiguous value per day. Days
    /// outside the observed range are not fabricated.
    pub fn daily_cost_series(&self, as_of: NaiveDate) -> Result<Vec<(NaiveDate, f64)>> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("daily_cost_series", window_args(&window)),
            self.ttl(),
            || {
                let facts = self.source.metering_facts(&window)?;
                Ok(build_daily_series(&facts, &window))
            },
        )
    }

    /// Z-score classification of every day of the cost series.
    pub fn cost_anomalies(&self, as_of: NaiveDate) -> Result<Vec<AnomalyPoint>> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("cost_anomalies", window_args(&window)),
            self.ttl(),
            || {
                let series = self.daily_cost_series(as_of)?;
                Ok(self.detector.detect(&series))
            },
        )
    }

    /// Linear-trend cost forecast extrapolated past the window.
    pub fn cost_forecast(&self, as_of: NaiveDate) -> Result<Forecast> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("cost_forecast", window_args(&window)),
            self.ttl(),
            || {
                let series = self.daily_cost_series(as_of)?;
                self.forecaster.forecast(&series)
            },
        )
    }

    /// Per-resource usage summaries derived from all supplied feeds.
    pub fn usage_summaries(&self, as_of: NaiveDate) -> Result<Vec<ResourceUsageSummary>> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("usage_summaries", window_args(&window)),
            self.ttl(),
            || {
                let metering = self.source.metering_facts(&window)?;
                let concurrency = self.source.concurrency_facts(&window)?;
                let queueing = self.source.queueing_facts(&window)?;
                let queries = self.source.query_records(&window)?;
                Ok(summary::summarize(&SummaryInputs {
                    metering: &metering,
                    concurrency: concurrency.as_deref(),
                    queueing: queueing.as_deref(),
                    queries: queries.as_deref(),
                }))
            },
        )
    }

    /// Sizing recommendation per resource with a known size class.
    ///
    /// Resources the source reports no size for are skipped with a
    /// warning: the downsize rule cannot be evaluated honestly without
    /// knowing the present allocation.
    pub fn sizing_recommendations(&self, as_of: NaiveDate) -> Result<Vec<Recommendation>> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("sizing_recommendations", window_args(&window)),
            self.ttl(),
            || {
                let summaries = self.usage_summaries(as_of)?;
                let sizes = self.source.resource_sizes()?;
                let mut recommendations = Vec::with_capacity(summaries.len());
                for summary in &summaries {
                    match sizes.get(&summary.resource_id) {
                        Some(size) => recommendations.push(self.advisor.recommend(summary, *size)?),
                        None => warn!(
                            resource_id = %summary.resource_id,
                            "no size class known; skipping sizing advice"
                        ),
                    }
                }
                Ok(recommendations)
            },
        )
    }

    /// Per-tag issue aggregates over the window's query history.
    ///
    /// An absent query-history feed yields an empty report, not an error:
    /// there is nothing to classify.
    pub fn query_issue_summary(&self, as_of: NaiveDate) -> Result<Vec<IssueAggregate>> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("query_issue_summary", window_args(&window)),
            self.ttl(),
            || match self.source.query_records(&window)? {
                Some(records) => classifier::aggregate(&records),
                None => {
                    debug!("no query history supplied; issue summary empty");
                    Ok(Vec::new())
                }
            },
        )
    }

    /// Cost breakdown grouped by resource.
    pub fn cost_by_resource(&self, as_of: NaiveDate) -> Result<CostBreakdown> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("cost_by_resource", window_args(&window)),
            self.ttl(),
            || {
                let facts = self.source.metering_facts(&window)?;
                Ok(self.attribution.attribute(&facts, |f| f.resource_id.clone()))
            },
        )
    }

    /// Cost breakdown grouped by the secondary dimension; facts without
    /// one land in an "unattributed" group.
    pub fn cost_by_dimension(&self, as_of: NaiveDate) -> Result<CostBreakdown> {
        let window = self.window(as_of);
        self.cache.get_or_try_compute(
            CacheKey::new("cost_by_dimension", window_args(&window)),
            self.ttl(),
            || {
                let facts = self.source.metering_facts(&window)?;
                Ok(self.attribution.attribute(&facts, |f| {
                    f.dimension
                        .clone()
                        .unwrap_or_else(|| "unattributed".to_string())
                }))
            },
        )
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.cache_ttl_secs)
    }
}

fn window_args(window: &LookbackWindow) -> String {
    format!("{}/{}", window.end, window.days)
}

// Group facts into one summed value per day and zero-fill interior gaps
// between the first and last observed day of the window.
fn build_daily_series(facts: &[MetricFact], window: &LookbackWindow) -> Vec<(NaiveDate, f64)> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for fact in facts {
        if window.contains(fact.timestamp) {
            *by_day.entry(fact.timestamp).or_insert(0.0) += fact.value;
        }
    }

    let (Some(&first), Some(&last)) = (by_day.keys().next(), by_day.keys().next_back()) else {
        return Vec::new();
    };

    window
        .iter_days()
        .filter(|day| *day >= first && *day <= last)
        .map(|day| (day, by_day.get(&day).copied().unwrap_or(0.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::SizingAction;
    use crate::anomaly::Severity;
    use crate::error::EngineError;
    use crate::models::{QueryRecord, QueryStatus, SizeClass};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
    }

    fn fact(resource: &str, date: NaiveDate, value: f64) -> MetricFact {
        MetricFact {
            timestamp: date,
            resource_id: resource.to_string(),
            dimension: None,
            value,
        }
    }

    /// In-memory source for facade tests; counts metering fetches so the
    /// cache behavior is observable.
    #[derive(Default)]
    struct StubSource {
        metering: Vec<MetricFact>,
        queries: Option<Vec<QueryRecord>>,
        sizes: BTreeMap<String, SizeClass>,
        metering_fetches: AtomicUsize,
    }

    impl TelemetrySource for StubSource {
        fn metering_facts(&self, _window: &LookbackWindow) -> anyhow::Result<Vec<MetricFact>> {
            self.metering_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.metering.clone())
        }

        fn concurrency_facts(
            &self,
            _window: &LookbackWindow,
        ) -> anyhow::Result<Option<Vec<MetricFact>>> {
            Ok(None)
        }

        fn queueing_facts(
            &self,
            _window: &LookbackWindow,
        ) -> anyhow::Result<Option<Vec<MetricFact>>> {
            Ok(None)
        }

        fn query_records(
            &self,
            _window: &LookbackWindow,
        ) -> anyhow::Result<Option<Vec<QueryRecord>>> {
            Ok(self.queries.clone())
        }

        fn resource_sizes(&self) -> anyhow::Result<BTreeMap<String, SizeClass>> {
            Ok(self.sizes.clone())
        }
    }

    fn spike_source() -> StubSource {
        // Nine days of 100 credits then a 1000-credit day.
        let metering = (1..=9)
            .map(|n| fact("wh1", day(n), 100.0))
            .chain(std::iter::once(fact("wh1", day(10), 1000.0)))
            .collect();
        StubSource {
            metering,
            ..Default::default()
        }
    }

    #[test]
    fn test_daily_series_fills_interior_gaps_with_zero() {
        let source = StubSource {
            metering: vec![
                fact("wh1", day(1), 10.0),
                fact("wh2", day(1), 5.0),
                fact("wh1", day(4), 20.0),
            ],
            ..Default::default()
        };
        let engine = InsightEngine::new(source, EngineConfig::default());

        let series = engine.daily_cost_series(day(10)).unwrap();
        assert_eq!(
            series,
            vec![
                (day(1), 15.0),
                (day(2), 0.0),
                (day(3), 0.0),
                (day(4), 20.0),
            ]
        );
    }

    #[test]
    fn test_facts_outside_window_are_ignored() {
        let source = StubSource {
            metering: vec![fact("wh1", day(1), 999.0), fact("wh1", day(20), 10.0)],
            ..Default::default()
        };
        let config = EngineConfig {
            lookback_days: 5,
            ..Default::default()
        };
        let engine = InsightEngine::new(source, config);

        let series = engine.daily_cost_series(day(20)).unwrap();
        assert_eq!(series, vec![(day(20), 10.0)]);
    }

    #[test]
    fn test_cost_anomalies_flag_the_spike_day() {
        let engine = InsightEngine::new(spike_source(), EngineConfig::default());
        let points = engine.cost_anomalies(day(10)).unwrap();

        assert_eq!(points.len(), 10);
        assert_eq!(points[9].severity, Severity::Critical);
        assert!(points[..9].iter().all(|p| p.severity == Severity::Normal));
    }

    #[test]
    fn test_cost_forecast_requires_seven_days() {
        let source = StubSource {
            metering: (1..=6).map(|n| fact("wh1", day(n), 50.0)).collect(),
            ..Default::default()
        };
        let engine = InsightEngine::new(source, EngineConfig::default());
        let err = engine.cost_forecast(day(6)).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { .. }));
    }

    #[test]
    fn test_metering_fetch_is_cached_across_operations() {
        let engine = InsightEngine::new(spike_source(), EngineConfig::default());

        engine.cost_anomalies(day(10)).unwrap();
        engine.cost_anomalies(day(10)).unwrap();
        engine.cost_forecast(day(10)).unwrap();

        // Both analytics share the one cached daily series.
        assert_eq!(engine.source.metering_fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_refresh_forces_refetch() {
        let engine = InsightEngine::new(spike_source(), EngineConfig::default());
        engine.daily_cost_series(day(10)).unwrap();
        engine.refresh();
        engine.daily_cost_series(day(10)).unwrap();
        assert_eq!(engine.source.metering_fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_recommendations_skip_resources_without_size() {
        let mut sizes = BTreeMap::new();
        sizes.insert("wh1".to_string(), SizeClass::Medium);
        let source = StubSource {
            metering: vec![fact("wh1", day(1), 10.0), fact("wh2", day(1), 10.0)],
            queries: Some(Vec::new()),
            sizes,
            ..Default::default()
        };
        let engine = InsightEngine::new(source, EngineConfig::default());

        let recommendations = engine.sizing_recommendations(day(10)).unwrap();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].resource_id, "wh1");
        assert_eq!(recommendations[0].action, SizingAction::SuspendOrDrop);
    }

    #[test]
    fn test_issue_summary_empty_without_query_history() {
        let engine = InsightEngine::new(spike_source(), EngineConfig::default());
        assert!(engine.query_issue_summary(day(10)).unwrap().is_empty());
    }

    #[test]
    fn test_cost_by_dimension_buckets_unattributed() {
        let source = StubSource {
            metering: vec![
                MetricFact {
                    timestamp: day(1),
                    resource_id: "wh1".to_string(),
                    dimension: Some("etl".to_string()),
                    value: 30.0,
                },
                fact("wh1", day(2), 10.0),
            ],
            ..Default::default()
        };
        let engine = InsightEngine::new(source, EngineConfig::default());

        let breakdown = engine.cost_by_dimension(day(10)).unwrap();
        assert_eq!(breakdown.rows[0].group_key, "etl");
        assert_eq!(breakdown.rows[1].group_key, "unattributed");
    }
}

//! Replay-file telemetry source
//!
//! Reads a JSON snapshot of account telemetry exported from the warehouse's
//! system tables and serves it through the engine's [`TelemetrySource`]
//! trait. Feeds that were not exported are absent from the file entirely
//! (`null` or missing keys), which the source reports as `None` so the
//! engine can honor the absent-vs-zero contract.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use insight_engine::{LookbackWindow, MetricFact, QueryRecord, SizeClass, TelemetrySource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// On-disk replay layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryReplay {
    /// Daily metered credits per resource.
    #[serde(default)]
    pub metering: Vec<MetricFact>,
    /// Average running-query load samples, when exported.
    #[serde(default)]
    pub concurrency: Option<Vec<MetricFact>>,
    /// Average queue-wait samples (seconds), when exported.
    #[serde(default)]
    pub queueing: Option<Vec<MetricFact>>,
    /// Query history, when exported.
    #[serde(default)]
    pub queries: Option<Vec<QueryRecord>>,
    /// Present size class per resource.
    #[serde(default)]
    pub sizes: BTreeMap<String, SizeClass>,
}

/// File-backed [`TelemetrySource`].
#[derive(Debug)]
pub struct ReplaySource {
    replay: TelemetryReplay,
}

impl ReplaySource {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read replay file {}", path.display()))?;
        let replay: TelemetryReplay = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse replay file {}", path.display()))?;
        debug!(
            path = %path.display(),
            metering_rows = replay.metering.len(),
            has_queries = replay.queries.is_some(),
            "telemetry replay loaded"
        );
        Ok(Self { replay })
    }

    pub fn from_replay(replay: TelemetryReplay) -> Self {
        Self { replay }
    }

    /// Newest metering day in the file; the default report date.
    pub fn latest_metering_day(&self) -> Option<NaiveDate> {
        self.replay.metering.iter().map(|f| f.timestamp).max()
    }
}

fn facts_in_window(facts: &[MetricFact], window: &LookbackWindow) -> Vec<MetricFact> {
    facts
        .iter()
        .filter(|f| window.contains(f.timestamp))
        .cloned()
        .collect()
}

impl TelemetrySource for ReplaySource {
    fn metering_facts(&self, window: &LookbackWindow) -> Result<Vec<MetricFact>> {
        Ok(facts_in_window(&self.replay.metering, window))
    }

    fn concurrency_facts(&self, window: &LookbackWindow) -> Result<Option<Vec<MetricFact>>> {
        Ok(self
            .replay
            .concurrency
            .as_ref()
            .map(|facts| facts_in_window(facts, window)))
    }

    fn queueing_facts(&self, window: &LookbackWindow) -> Result<Option<Vec<MetricFact>>> {
        Ok(self
            .replay
            .queueing
            .as_ref()
            .map(|facts| facts_in_window(facts, window)))
    }

    fn query_records(&self, _window: &LookbackWindow) -> Result<Option<Vec<QueryRecord>>> {
        // Query rows carry no day stamp in the replay; an export is already
        // scoped to the window it was taken for.
        Ok(self.replay.queries.clone())
    }

    fn resource_sizes(&self) -> Result<BTreeMap<String, SizeClass>> {
        Ok(self.replay.sizes.clone())
    }
}

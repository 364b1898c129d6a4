//! Telemetry source seam
//!
//! The engine has no opinion on where telemetry comes from — a SQL
//! warehouse, a metrics API, or a replay file all work, as long as the
//! source can answer "give me the facts for this window" as typed rows.
//! Fetch failures surface as `anyhow` errors and are wrapped into
//! [`crate::EngineError::Telemetry`] at the engine boundary.

use crate::models::{MetricFact, QueryRecord, SizeClass};
use anyhow::Result;
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// A look-back window of `days` whole days ending at `end` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub end: NaiveDate,
    pub days: u32,
}

impl LookbackWindow {
    pub fn ending(end: NaiveDate, days: u32) -> Self {
        Self { end, days }
    }

    /// First day of the window (inclusive).
    pub fn start(&self) -> NaiveDate {
        self.end
            .checked_sub_days(Days::new(self.days.saturating_sub(1) as u64))
            .unwrap_or(self.end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start() && day <= self.end
    }

    /// The window's days, oldest first.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let start = self.start();
        (0..self.days as u64).filter_map(move |offset| start.checked_add_days(Days::new(offset)))
    }
}

/// Tabular telemetry provider for one account.
///
/// Implementations must honor the absent-vs-zero contract: a feed they
/// cannot produce at all is `Ok(None)`, never an empty list, so the engine
/// can tell "no load history available" apart from "load history says
/// nothing ran".
pub trait TelemetrySource {
    /// Daily metered credits per resource (and optional dimension).
    fn metering_facts(&self, window: &LookbackWindow) -> Result<Vec<MetricFact>>;

    /// Average concurrently-running query load samples per resource.
    fn concurrency_facts(&self, window: &LookbackWindow) -> Result<Option<Vec<MetricFact>>>;

    /// Average queue wait (seconds) samples per resource.
    fn queueing_facts(&self, window: &LookbackWindow) -> Result<Option<Vec<MetricFact>>>;

    /// Individual query executions within the window.
    fn query_records(&self, window: &LookbackWindow) -> Result<Option<Vec<QueryRecord>>>;

    /// Present size class per resource.
    fn resource_sizes(&self) -> Result<BTreeMap<String, SizeClass>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let window = LookbackWindow::ending(end, 30);
        assert_eq!(window.start(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert!(window.contains(end));
        assert!(window.contains(window.start()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()));
    }

    #[test]
    fn test_single_day_window() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let window = LookbackWindow::ending(end, 1);
        assert_eq!(window.start(), end);
        assert_eq!(window.iter_days().count(), 1);
    }

    #[test]
    fn test_iter_days_is_contiguous_oldest_first() {
        let end = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let window = LookbackWindow::ending(end, 3);
        let days: Vec<NaiveDate> = window.iter_days().collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            ]
        );
    }
}

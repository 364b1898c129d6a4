//! Cost anomaly detection
//!
//! Flags statistically unusual daily cost values with a z-score test
//! against the full window's mean and population standard deviation. The
//! baseline deliberately includes the point under test (a simple outlier
//! test, not leave-one-out); changing that would change alerting behavior.

use crate::stats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum points for a meaningful baseline. Below this the detector
/// returns no anomalies rather than an error: a single day has no baseline
/// but is not itself erroneous.
const MIN_POINTS_FOR_BASELINE: usize = 2;

/// Anomaly severity, from the z-score thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

/// One classified point of the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyPoint {
    pub timestamp: NaiveDate,
    pub observed_value: f64,
    pub baseline_mean: f64,
    pub baseline_stddev: f64,
    pub z_score: f64,
    pub severity: Severity,
}

/// Z-score outlier detector over a daily cost series.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// Z-score at or above which a point is a warning.
    pub warning_threshold: f64,
    /// Z-score at or above which a point is critical.
    pub critical_threshold: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            warning_threshold: 2.0,
            critical_threshold: 3.0,
        }
    }
}

impl AnomalyDetector {
    pub fn new(warning_threshold: f64, critical_threshold: f64) -> Self {
        Self {
            warning_threshold,
            critical_threshold,
        }
    }

    /// Classify every point of the series, in input order.
    ///
    /// Fewer than two points yields an empty result. A zero standard
    /// deviation (all values identical) yields `z = 0` everywhere, so no
    /// anomalies.
    pub fn detect(&self, series: &[(NaiveDate, f64)]) -> Vec<AnomalyPoint> {
        if series.len() < MIN_POINTS_FOR_BASELINE {
            return Vec::new();
        }

        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let mean = stats::mean(&values);
        let stddev = stats::std_dev(&values, mean);

        let points: Vec<AnomalyPoint> = series
            .iter()
            .map(|&(timestamp, observed)| {
                let z_score = if stddev < f64::EPSILON {
                    0.0
                } else {
                    (observed - mean).abs() / stddev
                };
                AnomalyPoint {
                    timestamp,
                    observed_value: observed,
                    baseline_mean: mean,
                    baseline_stddev: stddev,
                    z_score,
                    severity: self.severity_for(z_score),
                }
            })
            .collect();

        let flagged = points
            .iter()
            .filter(|p| p.severity != Severity::Normal)
            .count();
        if flagged > 0 {
            debug!(
                points = points.len(),
                flagged,
                baseline_mean = mean,
                baseline_stddev = stddev,
                "cost anomalies detected"
            );
        }

        points
    }

    // Boundaries are inclusive: a point exactly at the critical threshold
    // is critical.
    fn severity_for(&self, z_score: f64) -> Severity {
        if z_score >= self.critical_threshold {
            Severity::Critical
        } else if z_score >= self.warning_threshold {
            Severity::Warning
        } else {
            Severity::Normal
        }
    }
}

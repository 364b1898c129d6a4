//! Engine configuration

use crate::models::SizeClass;
use serde::Deserialize;

/// Thresholds and window sizes for one engine instance.
///
/// The engine works in raw metered units throughout; converting credits to
/// currency is the caller's concern.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Analysis window in days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Average queue seconds above which a resource should be upsized.
    #[serde(default = "default_queue_threshold")]
    pub queue_threshold_seconds: f64,

    /// Z-score at or above which a cost point is a warning.
    #[serde(default = "default_z_warning")]
    pub z_score_warning: f64,

    /// Z-score at or above which a cost point is critical.
    #[serde(default = "default_z_critical")]
    pub z_score_critical: f64,

    /// Days of cost forecast to project past the window.
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon_days: usize,

    /// Smallest size class eligible for the downsize rule.
    #[serde(default = "default_downsize_cutoff")]
    pub downsize_cutoff: SizeClass,

    /// Result cache time-to-live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_lookback_days() -> u32 {
    30
}

fn default_queue_threshold() -> f64 {
    5.0
}

fn default_z_warning() -> f64 {
    2.0
}

fn default_z_critical() -> f64 {
    3.0
}

fn default_forecast_horizon() -> usize {
    30
}

fn default_downsize_cutoff() -> SizeClass {
    SizeClass::Large
}

fn default_cache_ttl() -> u64 {
    3600
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            queue_threshold_seconds: default_queue_threshold(),
            z_score_warning: default_z_warning(),
            z_score_critical: default_z_critical(),
            forecast_horizon_days: default_forecast_horizon(),
            downsize_cutoff: default_downsize_cutoff(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

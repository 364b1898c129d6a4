//! Short-horizon cost forecasting
//!
//! Fits a linear trend to a contiguous daily series and extrapolates a
//! future window. Predictions are clamped at zero (costs and volumes cannot
//! be negative) and every point carries the fit's R² so the consumer can
//! judge quality; the engine never suppresses low-confidence forecasts
//! itself.

use crate::error::EngineError;
use crate::stats::{self, LinearFit};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum points required for a trend fit.
pub const MIN_POINTS_FOR_FIT: usize = 7;

/// One extrapolated future day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    /// Trend projection, clamped to a minimum of 0.
    pub predicted_value: f64,
    pub model_r_squared: f64,
}

/// A fitted trend plus its extrapolated window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub points: Vec<ForecastPoint>,
}

/// Least-squares trend forecaster.
#[derive(Debug, Clone)]
pub struct TrendForecaster {
    /// Number of future days to project.
    pub horizon_days: usize,
}

impl TrendForecaster {
    pub fn new(horizon_days: usize) -> Self {
        Self { horizon_days }
    }

    /// Fit `series` (contiguous daily values; the caller fills gaps with
    /// zero beforehand) and extrapolate `horizon_days` past its end.
    ///
    /// Fewer than [`MIN_POINTS_FOR_FIT`] points is an
    /// [`EngineError::InsufficientData`].
    pub fn forecast(&self, series: &[(NaiveDate, f64)]) -> Result<Forecast, EngineError> {
        if series.len() < MIN_POINTS_FOR_FIT {
            return Err(EngineError::InsufficientData {
                required: MIN_POINTS_FOR_FIT,
                supplied: series.len(),
            });
        }

        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let fit: LinearFit = stats::linear_fit(&values);

        let last_day = series[series.len() - 1].0;
        let points = (0..self.horizon_days)
            .map(|offset| {
                let index = (series.len() + offset) as f64;
                ForecastPoint {
                    timestamp: last_day
                        .checked_add_days(Days::new(offset as u64 + 1))
                        .unwrap_or(last_day),
                    predicted_value: fit.predict(index).max(0.0),
                    model_r_squared: fit.r_squared,
                }
            })
            .collect();

        debug!(
            observed = series.len(),
            horizon = self.horizon_days,
            slope = fit.slope,
            r_squared = fit.r_squared,
            "trend forecast computed"
        );

        Ok(Forecast {
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            points,
        })
    }
}

//! Engine error taxonomy
//!
//! The engine never logs-and-swallows: every failure is surfaced as a typed
//! error and the caller decides what to do with it. Ratio computations are
//! not errors at a zero denominator; each component defines that case as
//! "condition not applicable" instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Too few input points for a statistically meaningful computation.
    #[error("insufficient data: {required} points required, {supplied} supplied")]
    InsufficientData { required: usize, supplied: usize },

    /// An input row violated one of its documented invariants.
    #[error("invalid record: {field} = {value}: {reason}")]
    InvalidRecord {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The telemetry source failed to produce rows.
    #[error("telemetry source failure")]
    Telemetry(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! CLI command implementations

pub mod anomalies;
pub mod costs;
pub mod issues;
pub mod recommendations;

//! Cost attribution
//!
//! Groups cost facts by an arbitrary dimension and computes concentration
//! statistics: how many of the top groups it takes to reach a target share
//! of total cost ("top N resources account for 80% of cost").

use crate::models::MetricFact;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default concentration target, the classic 80/20 reading.
pub const DEFAULT_CONCENTRATION_TARGET: f64 = 80.0;

/// One attributed group, in descending cost order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionRow {
    pub group_key: String,
    pub total_cost: f64,
    pub percent_of_total: f64,
}

/// The smallest leading prefix of groups whose cumulative share first
/// reaches or exceeds the target (inclusive at the boundary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationPoint {
    pub group_count: usize,
    pub cumulative_percent: f64,
    pub target_percent: f64,
}

/// Attribution rows plus the concentration point. No concentration point
/// is reported when the total cost is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub rows: Vec<AttributionRow>,
    pub concentration: Option<ConcentrationPoint>,
}

/// Groups cost facts and ranks the groups by spend.
#[derive(Debug, Clone)]
pub struct CostAttribution {
    target_percent: f64,
}

impl Default for CostAttribution {
    fn default() -> Self {
        Self {
            target_percent: DEFAULT_CONCENTRATION_TARGET,
        }
    }
}

impl CostAttribution {
    pub fn with_target(target_percent: f64) -> Self {
        Self { target_percent }
    }

    /// Group `facts` by `key` and compute the ranked breakdown.
    ///
    /// Rows are sorted by descending cost, then ascending key so equal
    /// spenders rank deterministically.
    pub fn attribute<F>(&self, facts: &[MetricFact], key: F) -> CostBreakdown
    where
        F: Fn(&MetricFact) -> String,
    {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for fact in facts {
            *totals.entry(key(fact)).or_insert(0.0) += fact.value;
        }

        let grand_total: f64 = totals.values().sum();

        let mut rows: Vec<AttributionRow> = totals
            .into_iter()
            .map(|(group_key, total_cost)| AttributionRow {
                group_key,
                total_cost,
                percent_of_total: if grand_total > 0.0 {
                    total_cost / grand_total * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_cost
                .partial_cmp(&a.total_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.group_key.cmp(&b.group_key))
        });

        let concentration = self.concentration_point(&rows, grand_total);

        CostBreakdown {
            rows,
            concentration,
        }
    }

    fn concentration_point(
        &self,
        rows: &[AttributionRow],
        grand_total: f64,
    ) -> Option<ConcentrationPoint> {
        if grand_total <= 0.0 {
            return None;
        }

        let mut cumulative = 0.0;
        for (index, row) in rows.iter().enumerate() {
            cumulative += row.percent_of_total;
            if cumulative >= self.target_percent {
                return Some(ConcentrationPoint {
                    group_count: index + 1,
                    cumulative_percent: cumulative,
                    target_percent: self.target_percent,
                });
            }
        }

        // Percentages always sum to ~100; only a target above 100 or float
        // rounding at exactly 100 lands here.
        Some(ConcentrationPoint {
            group_count: rows.len(),
            cumulative_percent: cumulative,
            target_percent: self.target_percent,
        })
    }
}

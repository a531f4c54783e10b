//! Dashboard metrics models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::DecisionOutcome;

/// Aggregate statistics over a collection of audit records.
///
/// One shape serves both the gateway's metrics snapshot and the local
/// recomputation, so the two can be compared field by field (see
/// `services::aggregate`). All rates are percentages in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Records in the aggregated collection. The gateway's payload omits
    /// this field, hence the default.
    #[serde(default)]
    pub total: u64,
    pub total_today: u64,
    pub total_week: u64,
    pub total_month: u64,
    pub approval_rate: f64,
    pub denial_rate: f64,
    pub flagged_rate: f64,
    pub avg_duration_ms: f64,
    /// Always carries all four enumerated outcomes, even at zero
    pub by_outcome: BTreeMap<String, u64>,
    /// Keys are exactly the distinct model names observed
    pub by_model: BTreeMap<String, u64>,
    pub by_decision_type: BTreeMap<String, u64>,
}

impl Metrics {
    /// Metrics of the empty collection: zero everywhere, outcome buckets
    /// present
    pub fn empty() -> Self {
        let mut by_outcome = BTreeMap::new();
        for outcome in DecisionOutcome::ALL {
            by_outcome.insert(outcome.as_str().to_string(), 0);
        }

        Self {
            total: 0,
            total_today: 0,
            total_week: 0,
            total_month: 0,
            approval_rate: 0.0,
            denial_rate: 0.0,
            flagged_rate: 0.0,
            avg_duration_ms: 0.0,
            by_outcome,
            by_model: BTreeMap::new(),
            by_decision_type: BTreeMap::new(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::empty()
    }
}

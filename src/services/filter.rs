//! Client-side narrowing of audit record collections
//!
//! The engine is pure and synchronous: it performs no I/O and keeps no
//! state, so it can be re-applied on every filter change without cumulative
//! effects. All dimensions combine conjunctively, and empty dimensions
//! (empty search string, "all" outcome) pass records through rather than
//! matching nothing.

use chrono::{DateTime, Utc};

use crate::models::{AuditLog, DecisionOutcome, RiskLevel};

/// Outcome dimension of a filter: one specific outcome, or pass-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutcomeFilter {
    #[default]
    All,
    Only(DecisionOutcome),
}

impl OutcomeFilter {
    /// Parse the wire form: "all" (or empty) passes through, anything else
    /// must be a known outcome
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "" | "all" => Some(OutcomeFilter::All),
            other => DecisionOutcome::from_str(other).map(OutcomeFilter::Only),
        }
    }

    pub fn matches(&self, outcome: DecisionOutcome) -> bool {
        match self {
            OutcomeFilter::All => true,
            OutcomeFilter::Only(only) => *only == outcome,
        }
    }
}

/// Filter criteria over a record collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    /// Case-insensitive substring matched against decision type and model
    /// name; empty passes everything
    pub search: String,
    pub outcome: OutcomeFilter,
    /// Inclusive lower timestamp bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper timestamp bound
    pub to: Option<DateTime<Utc>>,
    /// Records at or above this level match
    pub min_risk: Option<RiskLevel>,
}

impl LogFilter {
    /// True when every dimension passes records through unchanged
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.outcome == OutcomeFilter::All
            && self.from.is_none()
            && self.to.is_none()
            && self.min_risk.is_none()
    }

    /// Whether a single record satisfies every filter dimension
    pub fn matches(&self, log: &AuditLog) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let in_type = log
                .decision_type
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            let in_model = log.model_name.to_lowercase().contains(&needle);
            if !in_type && !in_model {
                return false;
            }
        }

        if !self.outcome.matches(log.decision_outcome) {
            return false;
        }

        if let Some(from) = self.from {
            if log.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if log.timestamp > to {
                return false;
            }
        }

        if let Some(min) = self.min_risk {
            if log.risk_level < min {
                return false;
            }
        }

        true
    }
}

/// Narrow a collection to the records matching `filter`.
///
/// The result is an order-preserving subsequence of the input (the
/// gateway's newest-first order is kept), which also makes filtering
/// idempotent: applying the same filter to its own output is a no-op.
pub fn filter_logs(logs: &[AuditLog], filter: &LogFilter) -> Vec<AuditLog> {
    logs.iter().filter(|log| filter.matches(log)).cloned().collect()
}

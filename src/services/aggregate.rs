//! Metrics aggregation over audit-log snapshots
//!
//! Pure counterpart of the gateway's own metrics endpoint. Computing the
//! same shape locally lets the dashboard serve metrics from the latest
//! snapshot without an extra round trip, and lets `compare_metrics` flag
//! a gateway that aggregates differently.

use chrono::{DateTime, Duration, Utc};

use crate::models::{AuditLog, DecisionOutcome, Metrics};

/// Bucket for records that carry no decision type, matching the gateway
const UNKNOWN_DECISION_TYPE: &str = "unknown";

/// Rates are compared against the gateway within this tolerance
const RATE_TOLERANCE: f64 = 0.01;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 * 100.0 / total as f64)
    }
}

/// Aggregate dashboard metrics over a collection of audit logs.
///
/// `now` anchors the time windows: `total_today` counts records on the same
/// UTC calendar day, `total_week` and `total_month` the trailing 7 and 30
/// days. Rates are percentages in [0, 100] rounded to two decimals, zero
/// when the collection is empty. Order of the input never affects the
/// output.
pub fn aggregate(logs: &[AuditLog], now: DateTime<Utc>) -> Metrics {
    let mut metrics = Metrics::empty();
    metrics.total = logs.len() as u64;

    let today = now.date_naive();
    let week_start = now - Duration::days(7);
    let month_start = now - Duration::days(30);

    let mut flagged = 0u64;
    let mut duration_total = 0u64;

    for log in logs {
        if log.timestamp.date_naive() == today {
            metrics.total_today += 1;
        }
        if log.timestamp >= week_start {
            metrics.total_week += 1;
        }
        if log.timestamp >= month_start {
            metrics.total_month += 1;
        }

        if log.flagged {
            flagged += 1;
        }
        duration_total += log.duration_ms;

        *metrics
            .by_outcome
            .entry(log.decision_outcome.as_str().to_string())
            .or_insert(0) += 1;
        *metrics.by_model.entry(log.model_name.clone()).or_insert(0) += 1;

        let decision_type = log
            .decision_type
            .as_deref()
            .unwrap_or(UNKNOWN_DECISION_TYPE);
        *metrics
            .by_decision_type
            .entry(decision_type.to_string())
            .or_insert(0) += 1;
    }

    let approved = metrics.by_outcome[DecisionOutcome::Approved.as_str()];
    let denied = metrics.by_outcome[DecisionOutcome::Denied.as_str()];

    metrics.approval_rate = rate(approved, metrics.total);
    metrics.denial_rate = rate(denied, metrics.total);
    metrics.flagged_rate = rate(flagged, metrics.total);
    metrics.avg_duration_ms = if metrics.total == 0 {
        0.0
    } else {
        round2(duration_total as f64 / metrics.total as f64)
    };

    metrics
}

/// Field-level differences between locally aggregated metrics and the
/// gateway's snapshot. Empty means consistent.
///
/// Windowed counts are not compared: the two sides sample the clock at
/// different instants. Rates and the duration average are compared within
/// a 0.01 tolerance, counts exactly.
pub fn compare_metrics(local: &Metrics, gateway: &Metrics) -> Vec<String> {
    let mut differences = Vec::new();

    // The gateway's payload omits `total` (deserialized as 0); only compare
    // when it actually reported one.
    if gateway.total != 0 && local.total != gateway.total {
        differences.push(format!(
            "total: local {} vs gateway {}",
            local.total, gateway.total
        ));
    }

    let rates = [
        ("approval_rate", local.approval_rate, gateway.approval_rate),
        ("denial_rate", local.denial_rate, gateway.denial_rate),
        ("flagged_rate", local.flagged_rate, gateway.flagged_rate),
        ("avg_duration_ms", local.avg_duration_ms, gateway.avg_duration_ms),
    ];
    for (name, ours, theirs) in rates {
        if (ours - theirs).abs() > RATE_TOLERANCE {
            differences.push(format!(
                "{}: local {:.2} vs gateway {:.2}",
                name, ours, theirs
            ));
        }
    }

    for outcome in DecisionOutcome::ALL {
        let key = outcome.as_str();
        let ours = local.by_outcome.get(key).copied().unwrap_or(0);
        let theirs = gateway.by_outcome.get(key).copied().unwrap_or(0);
        if ours != theirs {
            differences.push(format!(
                "by_outcome.{}: local {} vs gateway {}",
                key, ours, theirs
            ));
        }
    }

    differences
}

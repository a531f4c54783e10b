//! Test fixtures for common test data
//!
//! Fixtures provide pre-defined audit records and wire payloads that can be
//! used across multiple tests.

use chrono::{Duration, Utc};

use auditlayer_webui::models::{AuditLog, DecisionOutcome, RiskLevel};

/// Test audit log fixtures
pub struct LogFixtures;

impl LogFixtures {
    /// An approved low-risk loan decision, one hour old
    pub fn approved_loan() -> AuditLog {
        AuditLog {
            id: "log_approved".to_string(),
            timestamp: Utc::now() - Duration::hours(1),
            user_id: "user_jane".to_string(),
            decision_type: Some("loan_approval".to_string()),
            decision_outcome: DecisionOutcome::Approved,
            model_name: "gpt-4-turbo".to_string(),
            model_provider: Some("openai".to_string()),
            risk_level: RiskLevel::Low,
            flagged: false,
            duration_ms: 2345,
        }
    }

    /// A denied medium-risk loan decision, two hours old
    pub fn denied_loan() -> AuditLog {
        AuditLog {
            id: "log_denied".to_string(),
            timestamp: Utc::now() - Duration::hours(2),
            user_id: "user_bob".to_string(),
            decision_type: Some("loan_approval".to_string()),
            decision_outcome: DecisionOutcome::Denied,
            model_name: "claude-3-opus".to_string(),
            model_provider: Some("anthropic".to_string()),
            risk_level: RiskLevel::Medium,
            flagged: false,
            duration_ms: 1800,
        }
    }

    /// A flagged high-risk transaction review, three hours old
    pub fn flagged_transaction() -> AuditLog {
        AuditLog {
            id: "log_flagged".to_string(),
            timestamp: Utc::now() - Duration::hours(3),
            user_id: "user_eve".to_string(),
            decision_type: Some("transaction_review".to_string()),
            decision_outcome: DecisionOutcome::Flagged,
            model_name: "gpt-4-turbo".to_string(),
            model_provider: Some("openai".to_string()),
            risk_level: RiskLevel::High,
            flagged: true,
            duration_ms: 3100,
        }
    }

    /// Three records covering each primary outcome, newest first
    pub fn three_outcomes() -> Vec<AuditLog> {
        vec![
            Self::approved_loan(),
            Self::denied_loan(),
            Self::flagged_transaction(),
        ]
    }
}

/// Wire payload fixtures, shaped like gateway responses
pub mod wire {
    use serde_json::{json, Value};

    /// A valid summary record as the gateway serializes it
    pub fn log_json(id: &str, outcome: &str) -> Value {
        json!({
            "id": id,
            "timestamp": "2025-06-01T12:00:00Z",
            "user_id": "user_jane",
            "decision_type": "loan_approval",
            "decision_outcome": outcome,
            "model_name": "gpt-4-turbo",
            "model_provider": "openai",
            "risk_level": "low",
            "flagged": outcome == "flagged",
            "duration_ms": 2345
        })
    }

    /// A record the decoder must reject (unrecognized risk level)
    pub fn malformed_log_json(id: &str) -> Value {
        json!({
            "id": id,
            "timestamp": "2025-06-01T12:00:00Z",
            "user_id": "user_jane",
            "decision_outcome": "approved",
            "model_name": "gpt-4-turbo",
            "risk_level": "severe",
            "duration_ms": 100
        })
    }

    /// List envelope wrapping the given records
    pub fn list_response(logs: Vec<Value>) -> Value {
        json!({
            "total": logs.len(),
            "limit": 50,
            "offset": 0,
            "logs": logs
        })
    }

    /// A full detail record whose content hash matches its content;
    /// verification reports it as verified
    pub fn sealed_detail_json(id: &str) -> Value {
        let detail = crate::common::factories::DetailFactory::new()
            .create()
            .with_id(id)
            .build();
        serde_json::to_value(detail).expect("Failed to serialize detail fixture")
    }

    /// A full detail record without a content hash;
    /// verification reports it as unverifiable
    pub fn unhashed_detail_json(id: &str) -> Value {
        let detail = crate::common::factories::DetailFactory::new()
            .create()
            .with_id(id)
            .build_without_hash();
        serde_json::to_value(detail).expect("Failed to serialize detail fixture")
    }

    /// A metrics snapshot as the gateway reports it (no `total` field)
    pub fn metrics_json() -> Value {
        json!({
            "total_today": 3,
            "total_week": 3,
            "total_month": 3,
            "approval_rate": 33.33,
            "denial_rate": 33.33,
            "flagged_rate": 33.33,
            "avg_duration_ms": 2415.0,
            "by_outcome": {"approved": 1, "denied": 1, "flagged": 1, "other": 0},
            "by_model": {"claude-3-opus": 1, "gpt-4-turbo": 2},
            "by_decision_type": {"loan_approval": 2, "transaction_review": 1}
        })
    }

    /// Gateway health payload
    pub fn health_json() -> Value {
        json!({"status": "healthy", "version": "1.2.0"})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditlayer_webui::models::AuditLog;

    #[test]
    fn test_wire_log_fixture_decodes() {
        let log = AuditLog::from_value(wire::log_json("log_001", "approved")).unwrap();
        assert_eq!(log.id, "log_001");
        assert_eq!(log.decision_outcome, DecisionOutcome::Approved);
    }

    #[test]
    fn test_malformed_fixture_is_rejected() {
        assert!(AuditLog::from_value(wire::malformed_log_json("log_bad")).is_err());
    }

    #[test]
    fn test_three_outcomes_are_distinct() {
        let logs = LogFixtures::three_outcomes();
        assert_eq!(logs.len(), 3);
        assert_ne!(logs[0].decision_outcome, logs[1].decision_outcome);
        assert_ne!(logs[1].decision_outcome, logs[2].decision_outcome);
    }
}

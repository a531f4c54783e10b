//! Test factories for generating test data
//!
//! Factories create unique audit records per call, useful when a test needs
//! a collection of distinct records without repeating boilerplate.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};

use auditlayer_webui::models::{
    AuditLog, AuditLogDetail, DecisionOutcome, Factor, FactorValue, MetaValue, RiskLevel,
};
use auditlayer_webui::services::compute_content_hash;

/// Factory for creating test audit log summaries
pub struct LogFactory {
    counter: AtomicU64,
}

impl Default for LogFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFactory {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Create a unique test audit log
    pub fn create(&self) -> LogBuilder {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        LogBuilder {
            log: AuditLog {
                id: format!("log_{:04}", n),
                timestamp: Utc::now(),
                user_id: format!("user_{}", n),
                decision_type: Some("loan_approval".to_string()),
                decision_outcome: DecisionOutcome::Approved,
                model_name: "gpt-4-turbo".to_string(),
                model_provider: Some("openai".to_string()),
                risk_level: RiskLevel::Low,
                flagged: false,
                duration_ms: 1200,
            },
        }
    }
}

/// Builder for test audit logs
pub struct LogBuilder {
    log: AuditLog,
}

impl LogBuilder {
    pub fn with_id(mut self, id: &str) -> Self {
        self.log.id = id.to_string();
        self
    }

    /// Set the outcome; `flagged` follows the derived rule
    pub fn with_outcome(mut self, outcome: DecisionOutcome) -> Self {
        self.log.decision_outcome = outcome;
        self.log.flagged = AuditLog::derived_flag(outcome, self.log.risk_level);
        self
    }

    /// Set the risk level; `flagged` follows the derived rule
    pub fn with_risk(mut self, risk: RiskLevel) -> Self {
        self.log.risk_level = risk;
        self.log.flagged = AuditLog::derived_flag(self.log.decision_outcome, risk);
        self
    }

    /// Override the flag explicitly, detaching it from the derived rule
    pub fn flagged(mut self, flagged: bool) -> Self {
        self.log.flagged = flagged;
        self
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.log.user_id = user_id.to_string();
        self
    }

    pub fn with_model(mut self, model_name: &str) -> Self {
        self.log.model_name = model_name.to_string();
        self
    }

    pub fn with_decision_type(mut self, decision_type: &str) -> Self {
        self.log.decision_type = Some(decision_type.to_string());
        self
    }

    pub fn without_decision_type(mut self) -> Self {
        self.log.decision_type = None;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.log.timestamp = timestamp;
        self
    }

    /// Backdate the record by whole days
    pub fn days_ago(mut self, days: i64) -> Self {
        self.log.timestamp = Utc::now() - Duration::days(days);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.log.duration_ms = duration_ms;
        self
    }

    pub fn build(self) -> AuditLog {
        self.log
    }
}

/// Factory for creating test detail records
pub struct DetailFactory {
    counter: AtomicU64,
}

impl Default for DetailFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DetailFactory {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Create a unique test detail record
    pub fn create(&self) -> DetailBuilder {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);

        let summary = AuditLog {
            id: format!("log_{:04}", n),
            timestamp: Utc::now(),
            user_id: format!("user_{}", n),
            decision_type: Some("loan_approval".to_string()),
            decision_outcome: DecisionOutcome::Approved,
            model_name: "gpt-4-turbo".to_string(),
            model_provider: Some("openai".to_string()),
            risk_level: RiskLevel::Low,
            flagged: false,
            duration_ms: 1200,
        };

        let mut factors = BTreeMap::new();
        factors.insert(
            "credit_score".to_string(),
            Factor {
                passed: true,
                value: FactorValue::Number(serde_json::Number::from(720)),
            },
        );

        let mut metadata = BTreeMap::new();
        metadata.insert("region".to_string(), MetaValue::Text("us-east".to_string()));

        DetailBuilder {
            detail: AuditLogDetail {
                summary,
                request_id: format!("req_{:04}", n),
                organization_id: "org_acme".to_string(),
                prompt_content: "Analyze loan application for applicant".to_string(),
                prompt_tokens: 150,
                response_content: "APPROVED with standard terms".to_string(),
                response_tokens: 80,
                reasoning: Some("Strong credit profile".to_string()),
                factors,
                compliance_tags: vec!["SOX".to_string(), "FCRA".to_string()],
                metadata,
                content_hash: String::new(),
            },
        }
    }
}

/// Builder for test detail records
pub struct DetailBuilder {
    detail: AuditLogDetail,
}

impl DetailBuilder {
    pub fn with_id(mut self, id: &str) -> Self {
        self.detail.summary.id = id.to_string();
        self
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.detail.prompt_content = prompt.to_string();
        self
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.detail.response_content = response.to_string();
        self
    }

    pub fn with_reasoning(mut self, reasoning: &str) -> Self {
        self.detail.reasoning = Some(reasoning.to_string());
        self
    }

    pub fn without_reasoning(mut self) -> Self {
        self.detail.reasoning = None;
        self
    }

    pub fn with_factor(mut self, name: &str, passed: bool, value: i64) -> Self {
        self.detail.factors.insert(
            name.to_string(),
            Factor {
                passed,
                value: FactorValue::Number(serde_json::Number::from(value)),
            },
        );
        self
    }

    pub fn with_metadata(mut self, key: &str, value: MetaValue) -> Self {
        self.detail.metadata.insert(key.to_string(), value);
        self
    }

    /// Build with the content hash computed over the content fields;
    /// verification reports the record as verified
    pub fn build(self) -> AuditLogDetail {
        let mut detail = self.detail;
        detail.content_hash =
            compute_content_hash(&detail).expect("Failed to hash detail content");
        detail
    }

    /// Build without a content hash; verification reports the record
    /// as unverifiable
    pub fn build_without_hash(self) -> AuditLogDetail {
        self.detail
    }

    /// Build with a hash that no longer matches the content;
    /// verification reports the record as tampered
    pub fn build_tampered(self) -> AuditLogDetail {
        let mut detail = self.build();
        detail.response_content.push_str(" [altered]");
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditlayer_webui::models::VerificationStatus;
    use auditlayer_webui::services::verify_detail;

    #[test]
    fn test_log_factory_creates_unique_logs() {
        let factory = LogFactory::new();
        let log1 = factory.create().build();
        let log2 = factory.create().build();

        assert_ne!(log1.id, log2.id);
        assert_ne!(log1.user_id, log2.user_id);
    }

    #[test]
    fn test_outcome_updates_derived_flag() {
        let factory = LogFactory::new();
        let log = factory
            .create()
            .with_outcome(DecisionOutcome::Flagged)
            .build();
        assert!(log.flagged);
    }

    #[test]
    fn test_sealed_detail_verifies() {
        let factory = DetailFactory::new();
        let detail = factory.create().build();
        let report = verify_detail(&detail);
        assert_eq!(report.status, VerificationStatus::Verified);
    }

    #[test]
    fn test_tampered_detail_fails_verification() {
        let factory = DetailFactory::new();
        let detail = factory.create().build_tampered();
        let report = verify_detail(&detail);
        assert_eq!(report.status, VerificationStatus::Tampered);
    }
}

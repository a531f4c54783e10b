//! Audit record models
//!
//! An audit record describes one AI decision event. Records come in two
//! forms: the summary form (`AuditLog`) returned by list queries, and the
//! detail form (`AuditLogDetail`) which refines exactly one summary record
//! with the full prompt/response content and the content hash that binds it.
//!
//! Records are created exclusively by the gateway's producer side. This
//! crate never creates, mutates, or deletes one; `id`, `timestamp` and
//! `content_hash` are immutable once assigned.
//!
//! Decoding from the wire goes through [`AuditLog::from_value`] /
//! [`AuditLogDetail::from_value`], which enforce the semantic checks the
//! plain serde derives cannot express (negative durations, unrecognized
//! enum values, unsupported metadata kinds) and report them as
//! [`MalformedRecord`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// A record that could not be decoded into a valid audit log.
///
/// Collection processing skips and counts these instead of aborting; see
/// `services::gateway`.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MalformedRecord(pub String);

// ==================== Enumerations ====================

/// Categorical result of an AI-mediated decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    Approved,
    Denied,
    Flagged,
    /// Catch-all bucket; also what an absent wire value maps to
    #[default]
    Other,
}

impl DecisionOutcome {
    /// All enumerated outcomes, in display order
    pub const ALL: [DecisionOutcome; 4] = [
        DecisionOutcome::Approved,
        DecisionOutcome::Denied,
        DecisionOutcome::Flagged,
        DecisionOutcome::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Approved => "approved",
            DecisionOutcome::Denied => "denied",
            DecisionOutcome::Flagged => "flagged",
            DecisionOutcome::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(DecisionOutcome::Approved),
            "denied" => Some(DecisionOutcome::Denied),
            "flagged" => Some(DecisionOutcome::Flagged),
            "other" => Some(DecisionOutcome::Other),
            _ => None,
        }
    }
}

/// Ordered severity classification attached to a decision
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "critical" => Some(RiskLevel::Critical),
            _ => None,
        }
    }

    /// High and critical risk flag a record regardless of outcome
    pub fn is_elevated(&self) -> bool {
        *self >= RiskLevel::High
    }
}

// ==================== Tagged values ====================

/// Permitted value kinds for `metadata` entries.
///
/// A closed union instead of raw `serde_json::Value` so the canonical
/// serialization used for content hashing stays deterministic. Nested maps
/// are `BTreeMap`, which keeps key order sorted everywhere a value is
/// serialized. Arrays and null are outside the union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Map(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    /// Lossless conversion from raw JSON; `None` for kinds outside the union
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// Value of a single decision factor (number or string)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorValue {
    Number(serde_json::Number),
    Text(String),
}

/// One entry in the weighted-decision-factor breakdown.
///
/// Field order matters: canonical serialization emits struct fields in
/// declaration order, and the canonical form requires lexicographic keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub passed: bool,
    pub value: FactorValue,
}

// ==================== Records ====================

/// Summary audit record, as returned by list queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    /// Opaque identifier, globally unique, immutable
    pub id: String,
    /// Assigned at creation, immutable
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub decision_type: Option<String>,
    pub decision_outcome: DecisionOutcome,
    /// AI system that produced the decision
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
    pub risk_level: RiskLevel,
    /// Stored explicitly on the wire; derivable from outcome and risk
    pub flagged: bool,
    pub duration_ms: u64,
}

impl AuditLog {
    /// Decode a wire payload, enforcing the record's semantic checks
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedRecord> {
        let raw: RawAuditLog =
            serde_json::from_value(value).map_err(|e| MalformedRecord(e.to_string()))?;
        raw.try_into()
    }

    /// The rule `flagged` is derived from when absent on the wire:
    /// a flagged outcome or elevated risk flags the record.
    pub fn derived_flag(outcome: DecisionOutcome, risk: RiskLevel) -> bool {
        outcome == DecisionOutcome::Flagged || risk.is_elevated()
    }
}

/// Detail form: the full record behind one summary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogDetail {
    #[serde(flatten)]
    pub summary: AuditLog,
    pub request_id: String,
    pub organization_id: String,
    pub prompt_content: String,
    pub prompt_tokens: u32,
    pub response_content: String,
    pub response_tokens: u32,
    pub reasoning: Option<String>,
    #[serde(default)]
    pub factors: BTreeMap<String, Factor>,
    /// Order is display-relevant but not semantically significant
    #[serde(default)]
    pub compliance_tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetaValue>,
    /// Lowercase-hex SHA-256 over the content fields; empty when the
    /// producer supplied none (the verifier reports that as unverifiable)
    #[serde(default)]
    pub content_hash: String,
}

impl AuditLogDetail {
    /// Decode a wire payload, enforcing the record's semantic checks
    pub fn from_value(value: serde_json::Value) -> Result<Self, MalformedRecord> {
        let raw: RawAuditLogDetail =
            serde_json::from_value(value).map_err(|e| MalformedRecord(e.to_string()))?;
        raw.try_into()
    }
}

// ==================== Wire forms ====================

/// Summary record as it arrives from the gateway, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawAuditLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    #[serde(default)]
    pub decision_type: Option<String>,
    #[serde(default)]
    pub decision_outcome: Option<String>,
    pub model_name: String,
    #[serde(default)]
    pub model_provider: Option<String>,
    pub risk_level: String,
    #[serde(default)]
    pub flagged: Option<bool>,
    pub duration_ms: i64,
}

impl TryFrom<RawAuditLog> for AuditLog {
    type Error = MalformedRecord;

    fn try_from(raw: RawAuditLog) -> Result<Self, Self::Error> {
        let outcome = match raw.decision_outcome.as_deref() {
            None | Some("") => DecisionOutcome::Other,
            Some(s) => DecisionOutcome::from_str(s)
                .ok_or_else(|| MalformedRecord(format!("unrecognized decision outcome: {}", s)))?,
        };

        let risk_level = RiskLevel::from_str(&raw.risk_level)
            .ok_or_else(|| MalformedRecord(format!("unrecognized risk level: {}", raw.risk_level)))?;

        let duration_ms = u64::try_from(raw.duration_ms)
            .map_err(|_| MalformedRecord(format!("negative duration_ms: {}", raw.duration_ms)))?;

        // The explicit wire value wins, but a disagreement with the derived
        // rule is reported rather than silently accepted.
        let derived = AuditLog::derived_flag(outcome, risk_level);
        let flagged = match raw.flagged {
            Some(explicit) => {
                if explicit != derived {
                    warn!(
                        id = %raw.id,
                        stored = explicit,
                        derived = derived,
                        "flagged value disagrees with outcome/risk rule"
                    );
                }
                explicit
            }
            None => derived,
        };

        Ok(AuditLog {
            id: raw.id,
            timestamp: raw.timestamp,
            user_id: raw.user_id,
            decision_type: raw.decision_type,
            decision_outcome: outcome,
            model_name: raw.model_name,
            model_provider: raw.model_provider,
            risk_level,
            flagged,
            duration_ms,
        })
    }
}

/// Detail record as it arrives from the gateway, before validation.
///
/// Unknown wire fields land in `extra` and are preserved under `metadata`
/// after conversion, so future producer fields do not break older
/// consumers.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAuditLogDetail {
    #[serde(flatten)]
    pub summary: RawAuditLog,
    pub request_id: String,
    pub organization_id: String,
    pub prompt_content: String,
    pub prompt_tokens: i64,
    pub response_content: String,
    pub response_tokens: i64,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub factors: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub compliance_tags: Vec<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub content_hash: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<RawAuditLogDetail> for AuditLogDetail {
    type Error = MalformedRecord;

    fn try_from(raw: RawAuditLogDetail) -> Result<Self, Self::Error> {
        let id = raw.summary.id.clone();
        let summary: AuditLog = raw.summary.try_into()?;

        let prompt_tokens = u32::try_from(raw.prompt_tokens)
            .map_err(|_| MalformedRecord(format!("prompt_tokens out of range: {}", raw.prompt_tokens)))?;
        let response_tokens = u32::try_from(raw.response_tokens).map_err(|_| {
            MalformedRecord(format!("response_tokens out of range: {}", raw.response_tokens))
        })?;

        let mut factors = BTreeMap::new();
        for (name, value) in raw.factors.into_iter().flatten() {
            let factor: Factor = serde_json::from_value(value).map_err(|_| {
                MalformedRecord(format!("factor {} is not a {{value, passed}} entry", name))
            })?;
            factors.insert(name, factor);
        }

        let mut metadata = BTreeMap::new();
        for (key, value) in raw.metadata.into_iter().flatten() {
            let converted = MetaValue::from_json(value).ok_or_else(|| {
                MalformedRecord(format!("metadata key {} has an unsupported value kind", key))
            })?;
            metadata.insert(key, converted);
        }

        // Forward compatibility: unknown producer fields are kept under
        // metadata when they fit the value union, dropped with a warning
        // when they do not. Declared metadata entries are never overwritten.
        for (key, value) in raw.extra {
            match MetaValue::from_json(value) {
                Some(converted) => {
                    metadata.entry(key).or_insert(converted);
                }
                None => {
                    warn!(id = %id, field = %key, "dropping extra wire field with unsupported value kind");
                }
            }
        }

        Ok(AuditLogDetail {
            summary,
            request_id: raw.request_id,
            organization_id: raw.organization_id,
            prompt_content: raw.prompt_content,
            prompt_tokens,
            response_content: raw.response_content,
            response_tokens,
            reasoning: raw.reasoning,
            factors,
            compliance_tags: raw.compliance_tags,
            metadata,
            content_hash: raw.content_hash,
        })
    }
}

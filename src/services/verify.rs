//! Integrity verification of audit records
//!
//! Recomputes the digest that binds a record's content fields and compares
//! it with the stored `content_hash`. The byte-level canonicalization is a
//! contract shared with the producer; any divergence between the two sides
//! is indistinguishable from tampering, so the rule is pinned here,
//! versioned, and spelled out in full:
//!
//! Contract `v1`: UTF-8, compact JSON (no whitespace), a single object with
//! exactly these keys in lexicographic order:
//!
//! ```json
//! {"decision_outcome": <enum string>,
//!  "factors": {<name, sorted>: {"passed": bool, "value": number|string}},
//!  "metadata": {<key, sorted, recursively>: <value>},
//!  "prompt_content": <string>,
//!  "reasoning": <string or null>,
//!  "response_content": <string>}
//! ```
//!
//! Absent factors/metadata encode as `{}`, absent reasoning as `null`. The
//! digest is lowercase-hex SHA-256 over those bytes.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{
    AuditLogDetail, Factor, MetaValue, VerificationReport, VerificationStatus,
};

/// Version tag of the canonical form implemented in this module
pub const CANONICALIZATION_VERSION: &str = "v1";

/// Content fields of a record, in canonical key order.
///
/// Serializing this struct IS the canonical form: serde emits struct fields
/// in declaration order, the declaration order here is lexicographic, and
/// every contained map is a `BTreeMap`, so keys are sorted at every nesting
/// level.
#[derive(Serialize)]
struct CanonicalContent<'a> {
    decision_outcome: &'a str,
    factors: &'a BTreeMap<String, Factor>,
    metadata: &'a BTreeMap<String, MetaValue>,
    prompt_content: &'a str,
    reasoning: Option<&'a str>,
    response_content: &'a str,
}

/// Canonical byte encoding of a record's content fields
pub fn canonical_content_bytes(detail: &AuditLogDetail) -> Result<Vec<u8>, serde_json::Error> {
    let content = CanonicalContent {
        decision_outcome: detail.summary.decision_outcome.as_str(),
        factors: &detail.factors,
        metadata: &detail.metadata,
        prompt_content: &detail.prompt_content,
        reasoning: detail.reasoning.as_deref(),
        response_content: &detail.response_content,
    };
    serde_json::to_vec(&content)
}

/// Lowercase-hex SHA-256 of the canonical content encoding
pub fn compute_content_hash(detail: &AuditLogDetail) -> Result<String, serde_json::Error> {
    let bytes = canonical_content_bytes(detail)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Check a record's stored content hash against a local recomputation.
///
/// Side-effect-free and infallible: tampered and unverifiable records are
/// findings reported in the result, never faults.
pub fn verify_detail(detail: &AuditLogDetail) -> VerificationReport {
    let verified_at = Utc::now();
    let log_id = detail.summary.id.clone();

    if detail.content_hash.is_empty() {
        return VerificationReport {
            log_id,
            status: VerificationStatus::Unverifiable,
            stored_hash: None,
            computed_hash: None,
            canonicalization: CANONICALIZATION_VERSION.to_string(),
            verified_at,
            reason: Some("record carries no content hash".to_string()),
        };
    }

    if !is_sha256_hex(&detail.content_hash) {
        return VerificationReport {
            log_id,
            status: VerificationStatus::Unverifiable,
            stored_hash: Some(detail.content_hash.clone()),
            computed_hash: None,
            canonicalization: CANONICALIZATION_VERSION.to_string(),
            verified_at,
            reason: Some("stored hash is not a SHA-256 hex digest".to_string()),
        };
    }

    match compute_content_hash(detail) {
        Ok(computed) => {
            let status = if computed == detail.content_hash.to_lowercase() {
                VerificationStatus::Verified
            } else {
                VerificationStatus::Tampered
            };
            VerificationReport {
                log_id,
                status,
                stored_hash: Some(detail.content_hash.clone()),
                computed_hash: Some(computed),
                canonicalization: CANONICALIZATION_VERSION.to_string(),
                verified_at,
                reason: None,
            }
        }
        Err(e) => VerificationReport {
            log_id,
            status: VerificationStatus::Unverifiable,
            stored_hash: Some(detail.content_hash.clone()),
            computed_hash: None,
            canonicalization: CANONICALIZATION_VERSION.to_string(),
            verified_at,
            reason: Some(format!("canonical serialization failed: {}", e)),
        },
    }
}

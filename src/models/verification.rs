//! Integrity verification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an integrity check.
///
/// These are data findings, not faults: verification never errors out, it
/// reports one of these three states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Recomputed digest matches the stored hash
    Verified,
    /// Digests differ: content was altered after recording
    Tampered,
    /// Stored hash or required content missing, or not comparable
    Unverifiable,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "verified",
            VerificationStatus::Tampered => "tampered",
            VerificationStatus::Unverifiable => "unverifiable",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "verified" => Some(VerificationStatus::Verified),
            "tampered" => Some(VerificationStatus::Tampered),
            "unverifiable" => Some(VerificationStatus::Unverifiable),
            _ => None,
        }
    }
}

/// Result of verifying a single record against its stored content hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub log_id: String,
    pub status: VerificationStatus,
    /// Stored hash as delivered by the gateway; `None` when absent
    pub stored_hash: Option<String>,
    /// Locally recomputed digest; `None` when canonicalization failed
    pub computed_hash: Option<String>,
    /// Canonicalization contract version used for the recomputation.
    /// A producer-side change of the rule shows up here, not as tampering.
    pub canonicalization: String,
    pub verified_at: DateTime<Utc>,
    /// Why the record could not be verified, for unverifiable results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationReport {
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}

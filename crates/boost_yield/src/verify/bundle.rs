//! Evidence bundle and SHA-256 reproducibility hash.

use crate::boost::AccrualInput;
use crate::compute::{accrue_input, AccrualBreakdown};
use crate::numeric::ArithmeticError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("arithmetic: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

/// Evidence bundle: the snapshots read plus the computed claim, for reproducibility.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub version: u32,
    /// Caller-chosen identifier, e.g. the stake account address.
    pub label: String,
    pub created_utc_rfc3339: String,
    pub input: AccrualInput,
    pub breakdown: AccrualBreakdown,
}

const BUNDLE_VERSION: u32 = 1;

impl EvidenceBundle {
    /// Run the calculator over `input` and capture the result.
    pub fn build(label: String, input: AccrualInput) -> Result<Self, ArithmeticError> {
        let breakdown = accrue_input(&input)?;
        let created_utc_rfc3339 = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        Ok(Self {
            version: BUNDLE_VERSION,
            label,
            created_utc_rfc3339,
            input,
            breakdown,
        })
    }

    pub fn claimable(&self) -> u64 {
        self.breakdown.claimable
    }
}

/// Normalize JSON for hashing: sort keys and no whitespace.
pub fn normalize_for_hash(value: &serde_json::Value) -> Result<String, VerifyError> {
    let sorted = sort_json_keys(value);
    Ok(serde_json::to_string(&sorted)?)
}

fn sort_json_keys(v: &serde_json::Value) -> serde_json::Value {
    match v {
        serde_json::Value::Object(m) => {
            let sorted: std::collections::BTreeMap<&String, serde_json::Value> =
                m.iter().map(|(k, v)| (k, sort_json_keys(v))).collect();
            serde_json::Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), v))
                    .collect(),
            )
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sort_json_keys).collect())
        }
        other => other.clone(),
    }
}

/// Compute SHA-256 over normalized bundle JSON.
pub fn reproducibility_hash(bundle: &EvidenceBundle) -> Result<String, VerifyError> {
    let json = serde_json::to_value(bundle)?;
    let normalized = normalize_for_hash(&json)?;
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationResult {
    pub bundle_hash: String,
    pub expected_hash: Option<String>,
    pub hash_matches: bool,
    /// Claimable amount recomputed from the embedded snapshots.
    pub recomputed_claimable: u64,
    pub claimable_matches: bool,
}

impl VerificationResult {
    /// Both the recomputation and, when one was given, the hash agree.
    pub fn matches(&self) -> bool {
        self.claimable_matches && (self.expected_hash.is_none() || self.hash_matches)
    }
}

/// Recompute the claim from the bundle's snapshots and check it, and the hash, against what was stored.
pub fn verify_bundle(
    bundle: &EvidenceBundle,
    expected_hex: Option<&str>,
) -> Result<VerificationResult, VerifyError> {
    let recomputed = accrue_input(&bundle.input)?;
    let bundle_hash = reproducibility_hash(bundle)?;
    let expected_hash = expected_hex.map(|h| h.trim().to_lowercase());
    let hash_matches = expected_hash
        .as_deref()
        .is_some_and(|exp| bundle_hash.to_lowercase() == exp);
    Ok(VerificationResult {
        bundle_hash,
        expected_hash,
        hash_matches,
        recomputed_claimable: recomputed.claimable,
        claimable_matches: recomputed == bundle.breakdown,
    })
}

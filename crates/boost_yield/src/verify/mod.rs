//! Reproducibility hashing and bundle verification.

mod bundle;

pub use bundle::normalize_for_hash;
pub use bundle::{
    reproducibility_hash, verify_bundle, EvidenceBundle, VerificationResult, VerifyError,
};

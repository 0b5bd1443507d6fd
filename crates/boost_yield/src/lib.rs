//! boost_yield — claimable-yield calculator for boost staking pools.
//!
//! Recomputes, off-chain and bit-for-bit, the rewards a staker can claim from a
//! boost given snapshots of the boost config, the boost, its proof, and the stake.
//! Pure computation; no RPC, no keys, no transaction building.

pub mod boost;
pub mod compute;
pub mod numeric;
pub mod verify;

pub use boost::{AccrualInput, Boost, BoostConfig, Proof, Stake, YieldConfig};
pub use compute::{accrue, compute_claimable, AccrualBreakdown, AccrualOutcome};
pub use numeric::{ArithmeticError, Numeric};
pub use verify::{reproducibility_hash, verify_bundle, EvidenceBundle, VerificationResult};

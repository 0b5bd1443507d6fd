//! Read-only snapshots of the four accounts the claimable-yield math reads.
//!
//! Every field is optional: an account that was never initialized or synced
//! leaves it absent, and the calculator decides per step whether absence means
//! "skip" or "zero".

use crate::numeric::Numeric;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Global rewards accumulator shared by every boost.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoostConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards_factor: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_weight: Option<u64>,
}

/// One boost pool.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    /// The boost's own rewards-per-deposit factor as of its last sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards_factor: Option<Numeric>,
    /// Config rewards factor observed at the boost's last sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rewards_factor: Option<Numeric>,
    /// Share of the config's total weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_deposits: Option<u64>,
}

/// The boost's proof account; `balance` is yield not yet folded into the config factor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
}

/// One staker's position in a boost.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stake {
    /// Already accrued, unclaimed rewards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<u64>,
    /// Boost rewards factor observed at the stake's last sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rewards_factor: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
}

/// The four snapshots a single claimable-yield computation needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccrualInput {
    #[serde(default)]
    pub boost_config: BoostConfig,
    #[serde(default)]
    pub boost: Boost,
    #[serde(default)]
    pub boost_proof: Proof,
    #[serde(default)]
    pub stake: Stake,
}

impl AccrualInput {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

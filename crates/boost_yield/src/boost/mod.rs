//! Boost account snapshots and local settings.

mod settings;
mod snapshot;

pub use settings::{YieldConfig, DEFAULT_DISPLAY_DECIMALS};
pub use snapshot::{AccrualInput, Boost, BoostConfig, Proof, SnapshotError, Stake};

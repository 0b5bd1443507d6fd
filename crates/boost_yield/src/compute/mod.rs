//! Claimable-yield accrual and display-unit conversion.

mod accrual;
mod units;

pub use accrual::{
    accrue, accrue_input, compute_claimable, AccrualBreakdown, AccrualOutcome, UnsyncedReason,
};
pub use units::{format_units, whole_units};

//! Fixed-point numbers for rewards-factor math.

mod fixed;

pub use fixed::{ArithmeticError, Numeric, FRACTIONAL_BITS, SCALE};

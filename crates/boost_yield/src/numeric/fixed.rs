//! Signed 80.48 fixed-point value with exact scaled-integer arithmetic.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

uint::construct_uint! {
    /// 256-bit unsigned intermediate for fixed-point products and quotients.
    struct U256(4);
}

/// Number of fractional bits carried by every [`Numeric`].
pub const FRACTIONAL_BITS: u32 = 48;

/// Raw representation of `1.0`.
pub const SCALE: i128 = 1 << FRACTIONAL_BITS;

const DISPLAY_DIGITS: u32 = 12;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("fixed-point overflow")]
    Overflow,
    #[error("negative value has no unsigned integer part")]
    Negative,
}

/// Fixed-point number stored as `value * 2^48` in an `i128`.
///
/// Same bit layout as the I80F48 rewards factors held by the on-chain program,
/// so values read from account data compare and combine bit-for-bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Numeric {
    bits: i128,
}

impl Numeric {
    pub const ZERO: Numeric = Numeric { bits: 0 };
    pub const ONE: Numeric = Numeric { bits: SCALE };

    pub const fn from_bits(bits: i128) -> Self {
        Self { bits }
    }

    pub const fn to_bits(self) -> i128 {
        self.bits
    }

    /// Decode the 16-byte little-endian form used in account data.
    pub const fn from_le_bytes(bytes: [u8; 16]) -> Self {
        Self::from_bits(i128::from_le_bytes(bytes))
    }

    pub const fn to_le_bytes(self) -> [u8; 16] {
        self.bits.to_le_bytes()
    }

    /// Lossless: 64 integer bits always fit above the 48 fractional bits.
    pub const fn from_u64(value: u64) -> Self {
        Self::from_bits((value as i128) << FRACTIONAL_BITS)
    }

    /// `numerator / denominator`, truncated to 48 fractional bits.
    pub fn from_fraction(numerator: u64, denominator: u64) -> Result<Self, ArithmeticError> {
        if denominator == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }
        let scaled = (numerator as i128) << FRACTIONAL_BITS;
        Ok(Self::from_bits(scaled / denominator as i128))
    }

    /// Integer part, fractional remainder discarded.
    pub fn to_u64(self) -> Result<u64, ArithmeticError> {
        if self.bits < 0 {
            return Err(ArithmeticError::Negative);
        }
        u64::try_from(self.bits >> FRACTIONAL_BITS).map_err(|_| ArithmeticError::Overflow)
    }

    pub const fn is_negative(self) -> bool {
        self.bits < 0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.bits
            .checked_add(rhs.bits)
            .map(Self::from_bits)
            .ok_or(ArithmeticError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticError> {
        self.bits
            .checked_sub(rhs.bits)
            .map(Self::from_bits)
            .ok_or(ArithmeticError::Overflow)
    }

    /// `(a * b) >> 48` on a 256-bit intermediate, truncated toward zero.
    pub fn checked_mul(self, rhs: Self) -> Result<Self, ArithmeticError> {
        let product = U256::from(self.bits.unsigned_abs()) * U256::from(rhs.bits.unsigned_abs());
        let magnitude = product >> FRACTIONAL_BITS;
        Self::from_magnitude(magnitude, self.is_negative() != rhs.is_negative())
    }

    /// `(a << 48) / b` on a 256-bit intermediate, truncated toward zero.
    pub fn checked_div(self, rhs: Self) -> Result<Self, ArithmeticError> {
        if rhs.bits == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }
        let numerator = U256::from(self.bits.unsigned_abs()) << FRACTIONAL_BITS;
        let magnitude = numerator / U256::from(rhs.bits.unsigned_abs());
        Self::from_magnitude(magnitude, self.is_negative() != rhs.is_negative())
    }

    fn from_magnitude(magnitude: U256, negative: bool) -> Result<Self, ArithmeticError> {
        if magnitude > U256::from(i128::MAX as u128) {
            return Err(ArithmeticError::Overflow);
        }
        let bits = magnitude.low_u128() as i128;
        Ok(Self::from_bits(if negative { -bits } else { bits }))
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.bits.unsigned_abs();
        let whole = magnitude >> FRACTIONAL_BITS;
        let frac = magnitude & (SCALE as u128 - 1);
        // frac < 2^48 and 10^12 < 2^40, so the product stays well inside u128.
        let digits = (frac * 10u128.pow(DISPLAY_DIGITS)) >> FRACTIONAL_BITS;
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            whole,
            digits,
            width = DISPLAY_DIGITS as usize
        )
    }
}

impl FromStr for Numeric {
    type Err = std::num::ParseIntError;

    /// Parses raw bits, not a decimal value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i128>().map(Self::from_bits)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| D::Error::custom(format!("numeric bits {:?}: {}", raw, e)))
    }
}

//! Fixed-point arithmetic types for pool math
//!
//! Token amounts, weights and fee rates are stored as integers scaled by
//! [`SCALE`] (10^9). Every multiply, divide and power exists in a rounding-down
//! and a rounding-up form because each formula in the engine picks its
//! direction on purpose.
//!
//! ## Design Principles
//!
//! - **No Precision Loss**: All values stored as scaled integers
//! - **Overflow Protection**: Products are formed in 256 bits and narrowed with a check
//! - **Type Safety**: [`ScaledAmount`] is distinct from the amplification scale
//! - **Rounding Discipline**: Round down what the user receives, round up what the user pays
//!
//! ## Convention
//!
//! | Quantity | Direction | Rationale |
//! |----------|-----------|-----------|
//! | Output amount | [`Rounding::Down`] | User receives less |
//! | Input amount | [`Rounding::Up`] | User pays more |
//! | Solved pool balance after a swap | [`Rounding::Up`] | Output computed from it shrinks |

use super::errors::MathError;
use super::log_exp;
use super::wide::{self, widen};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scale factor for token amounts, weights and fee rates (9 decimals)
pub const SCALE: u128 = 1_000_000_000;

/// Decimal places represented by [`SCALE`]
pub const SCALE_DECIMALS: u32 = 9;

const TWO_RAW: u128 = 2 * SCALE;
const FOUR_RAW: u128 = 4 * SCALE;

/// Relative error bound of the `exp(y·ln x)` path, in SCALE units (1e-9)
const MAX_POW_RELATIVE_ERROR: u128 = 1;

/// Direction of an inexact integer division
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rounding {
    /// Toward −∞ (floor)
    Down,
    /// Toward +∞ (ceiling)
    Up,
}

/// Non-negative real quantity scaled by 10^9
///
/// Examples:
/// - 1.0 token = ScaledAmount(1_000_000_000)
/// - 0.3% fee = ScaledAmount(3_000_000)
/// - weight 0.5 = ScaledAmount(500_000_000)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ScaledAmount(pub u128);

impl ScaledAmount {
    /// Scale factor for 9 decimal places
    pub const SCALE: u128 = SCALE;

    /// Zero
    pub const ZERO: Self = Self(0);

    /// 1.0
    pub const ONE: Self = Self(SCALE);

    /// 2.0
    pub const TWO: Self = Self(TWO_RAW);

    /// 4.0
    pub const FOUR: Self = Self(FOUR_RAW);

    /// Create from raw scaled integer
    #[inline]
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Create from whole units (compile-time constant for test vectors)
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Self(units as u128 * SCALE)
    }

    /// Get the raw scaled integer value
    #[inline]
    pub const fn raw_value(self) -> u128 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Create from a decimal string with exact parsing, truncating past 9 decimals
    pub fn from_decimal_str(s: &str) -> Result<Self, MathError> {
        use std::str::FromStr;

        let decimal = Decimal::from_str(s).map_err(|_| MathError::InvalidAmount {
            reason: "not a decimal number",
        })?;
        Self::from_decimal(decimal)
    }

    /// Convert a non-negative `Decimal`, truncating past 9 decimals
    pub fn from_decimal(value: Decimal) -> Result<Self, MathError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(MathError::InvalidAmount {
                reason: "scaled amounts are non-negative",
            });
        }
        let scaled = value
            .checked_mul(Decimal::from(SCALE as u64))
            .ok_or(MathError::Overflow)?
            .trunc();
        scaled.to_u128().map(Self).ok_or(MathError::Overflow)
    }

    /// Exact conversion to `Decimal` for reporting
    pub fn to_decimal(self) -> Result<Decimal, MathError> {
        let raw = i128::try_from(self.0).map_err(|_| MathError::Overflow)?;
        Decimal::try_from_i128_with_scale(raw, SCALE_DECIMALS).map_err(|_| MathError::Overflow)
    }

    /// Convert to f64 for display or logging only
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    // CHECKED ARITHMETIC - same scale on both sides

    pub fn checked_add(self, rhs: Self) -> Result<Self, MathError> {
        self.0.checked_add(rhs.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, MathError> {
        self.0.checked_sub(rhs.0).map(Self).ok_or(MathError::Overflow)
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    pub fn abs_diff(self, rhs: Self) -> Self {
        Self(self.0.abs_diff(rhs.0))
    }

    // FIXED-POINT ARITHMETIC

    /// `self · rhs / SCALE` with an explicit rounding direction
    pub fn mul(self, rhs: Self, rounding: Rounding) -> Result<Self, MathError> {
        let product = wide::mul(widen(self.0), widen(rhs.0))?;
        let quotient = wide::div(product, widen(SCALE), rounding)?;
        wide::narrow(quotient).map(Self)
    }

    /// `self · SCALE / rhs` with an explicit rounding direction
    pub fn div(self, rhs: Self, rounding: Rounding) -> Result<Self, MathError> {
        if rhs.is_zero() {
            return Err(MathError::DivideByZero);
        }
        let numerator = wide::mul(widen(self.0), widen(SCALE))?;
        let quotient = wide::div(numerator, widen(rhs.0), rounding)?;
        wide::narrow(quotient).map(Self)
    }

    pub fn mul_down(self, rhs: Self) -> Result<Self, MathError> {
        self.mul(rhs, Rounding::Down)
    }

    pub fn mul_up(self, rhs: Self) -> Result<Self, MathError> {
        self.mul(rhs, Rounding::Up)
    }

    pub fn div_down(self, rhs: Self) -> Result<Self, MathError> {
        self.div(rhs, Rounding::Down)
    }

    pub fn div_up(self, rhs: Self) -> Result<Self, MathError> {
        self.div(rhs, Rounding::Up)
    }

    /// `1 − self`, clamped at zero when `self > 1`
    pub fn complement(self) -> Self {
        Self(SCALE.saturating_sub(self.0))
    }

    /// `self ^ exponent`, never above the exact power
    pub fn pow_down(self, exponent: Self) -> Result<Self, MathError> {
        self.pow(exponent, Rounding::Down)
    }

    /// `self ^ exponent`, never below the exact power
    pub fn pow_up(self, exponent: Self) -> Result<Self, MathError> {
        self.pow(exponent, Rounding::Up)
    }

    /// Power with exact fast paths for 0, 1, 2 and 4; other exponents go
    /// through `exp(y · ln x)` and are widened by the series error bound
    pub fn pow(self, exponent: Self, rounding: Rounding) -> Result<Self, MathError> {
        match exponent.0 {
            0 => Ok(Self::ONE),
            SCALE => Ok(self),
            TWO_RAW => self.mul(self, rounding),
            FOUR_RAW => {
                let squared = self.mul(self, rounding)?;
                squared.mul(squared, rounding)
            }
            _ => {
                let raw = Self(pow_raw(self.0, exponent.0)?);
                let max_error = raw
                    .mul_up(Self(MAX_POW_RELATIVE_ERROR))?
                    .checked_add(Self(1))?;
                match rounding {
                    Rounding::Down => Ok(raw.saturating_sub(max_error)),
                    Rounding::Up => raw.checked_add(max_error),
                }
            }
        }
    }
}

/// `base ^ exponent` through the 18-decimal log/exp series, truncated to 9 decimals
fn pow_raw(base: u128, exponent: u128) -> Result<u128, MathError> {
    if exponent == 0 {
        return Ok(SCALE);
    }
    if base == 0 {
        return Ok(0);
    }

    let upscale = (log_exp::ONE_18 as u128) / SCALE;
    let to_18 = |value: u128| -> Result<i128, MathError> {
        i128::try_from(value)
            .ok()
            .and_then(|v| v.checked_mul(upscale as i128))
            .ok_or(MathError::Overflow)
    };

    let result = log_exp::pow(to_18(base)?, to_18(exponent)?)?;
    // exp() is never negative
    Ok(result as u128 / upscale)
}

/// Display implementation for convenient logging
impl fmt::Display for ScaledAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.0 / SCALE, self.0 % SCALE)
    }
}

impl From<u64> for ScaledAmount {
    /// Interprets the argument as raw scaled units
    fn from(raw: u64) -> Self {
        Self(raw as u128)
    }
}

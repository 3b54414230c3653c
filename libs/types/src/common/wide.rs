//! 256-bit intermediates for products of scaled amounts
//!
//! Products such as `D²`, `D·AMP_PRECISION` and the running `D_P` term do not
//! fit in `u128` for realistic pools. Every helper here is checked and maps a
//! wrap onto [`MathError::Overflow`]; narrowing back to `u128` is explicit.

use super::errors::MathError;
use super::fixed_point::Rounding;
pub use primitive_types::U256;

/// Lift a `u128` into the 256-bit working width
#[inline]
pub fn widen(value: u128) -> U256 {
    U256::from(value)
}

/// Narrow a 256-bit result back to `u128`, failing loudly if it does not fit
#[inline]
pub fn narrow(value: U256) -> Result<u128, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.low_u128())
}

#[inline]
pub fn mul(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_mul(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

#[inline]
pub fn sub(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::Overflow)
}

/// Division with an explicit rounding direction
///
/// - [`Rounding::Down`]: floor division.
/// - [`Rounding::Up`]: smallest integer ≥ the exact quotient.
pub fn div(numerator: U256, denominator: U256, rounding: Rounding) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivideByZero);
    }
    let quotient = numerator / denominator;
    match rounding {
        Rounding::Down => Ok(quotient),
        Rounding::Up => {
            if (numerator % denominator).is_zero() {
                Ok(quotient)
            } else {
                // quotient < numerator here, so +1 cannot wrap
                Ok(quotient + U256::one())
            }
        }
    }
}

/// |a − b| without a signed type
#[inline]
pub fn abs_diff(a: U256, b: U256) -> U256 {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

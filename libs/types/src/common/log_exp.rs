//! Natural logarithm and exponential in 18-decimal fixed point
//!
//! Backs the non-integer branch of [`ScaledAmount::pow_down`] /
//! [`ScaledAmount::pow_up`](super::fixed_point::ScaledAmount::pow_up):
//! `x^y = exp(y · ln x)`. Evaluation runs at 10^18 so that truncation back to
//! the 10^9 token scale dominates the series error.
//!
//! - `ln`: binary range reduction to `m ∈ [1, 2)`, then
//!   `ln m = 2·atanh((m − 1)/(m + 1))` whose argument is below 1/3.
//! - `exp`: `x = k·ln2 + r` with `r ∈ [0, ln2)`, Taylor series for `e^r`,
//!   then a shift by `k`.

use super::errors::MathError;

/// 1.0 at 18 decimals
pub const ONE_18: i128 = 1_000_000_000_000_000_000;

/// ln(2) at 18 decimals
const LN_2_18: i128 = 693_147_180_559_945_309;

/// e^46 ≈ 9.5e19 is the largest power that still fits in i128 at 18 decimals
pub const MAX_NATURAL_EXPONENT: i128 = 46 * ONE_18;

/// e^-42 < 1e-18 truncates to zero
pub const MIN_NATURAL_EXPONENT: i128 = -42 * ONE_18;

const MAX_SERIES_TERMS: i128 = 64;

/// `a · b / ONE_18` without forming the full product
///
/// `a = q·ONE + r`, so `a·b/ONE = q·b + r·b/ONE`; both partial products stay
/// inside i128 for the magnitudes the power function produces.
pub fn mul_18(a: i128, b: i128) -> Result<i128, MathError> {
    let whole = (a / ONE_18).checked_mul(b).ok_or(MathError::Overflow)?;
    let frac = (a % ONE_18).checked_mul(b).ok_or(MathError::Overflow)? / ONE_18;
    whole.checked_add(frac).ok_or(MathError::Overflow)
}

/// Natural logarithm of an 18-decimal value
pub fn ln(x: i128) -> Result<i128, MathError> {
    if x <= 0 {
        return Err(MathError::InvalidAmount {
            reason: "logarithm of a non-positive value",
        });
    }

    let mut mantissa = x;
    let mut exponent: i128 = 0;
    while mantissa >= 2 * ONE_18 {
        mantissa /= 2;
        exponent += 1;
    }
    while mantissa < ONE_18 {
        mantissa *= 2;
        exponent -= 1;
    }

    // z ∈ [0, 1/3)
    let z = (mantissa - ONE_18) * ONE_18 / (mantissa + ONE_18);
    let z_squared = z * z / ONE_18;

    let mut term = z;
    let mut sum = z;
    let mut denominator = 3;
    while term != 0 && denominator < 2 * MAX_SERIES_TERMS {
        term = term * z_squared / ONE_18;
        sum += term / denominator;
        denominator += 2;
    }

    let log_two_part = exponent.checked_mul(LN_2_18).ok_or(MathError::Overflow)?;
    log_two_part
        .checked_add(2 * sum)
        .ok_or(MathError::Overflow)
}

/// e^x for an 18-decimal exponent
pub fn exp(x: i128) -> Result<i128, MathError> {
    if x > MAX_NATURAL_EXPONENT {
        return Err(MathError::Overflow);
    }
    if x < MIN_NATURAL_EXPONENT {
        return Ok(0);
    }

    let mut k = x / LN_2_18;
    let mut r = x - k * LN_2_18;
    if r < 0 {
        r += LN_2_18;
        k -= 1;
    }

    let mut term = ONE_18;
    let mut sum = ONE_18;
    let mut i: i128 = 1;
    while term != 0 && i <= MAX_SERIES_TERMS {
        term = term * r / (ONE_18 * i);
        sum += term;
        i += 1;
    }

    if k >= 0 {
        if k > 100 {
            return Err(MathError::Overflow);
        }
        sum.checked_mul(1i128 << k).ok_or(MathError::Overflow)
    } else {
        let shift = (-k) as u32;
        if shift >= 127 {
            Ok(0)
        } else {
            Ok(sum >> shift)
        }
    }
}

/// `x^y` for 18-decimal operands, `x > 0`
pub fn pow(x: i128, y: i128) -> Result<i128, MathError> {
    let log_x = ln(x)?;
    exp(mul_18(log_x, y)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: i128, expected: i128, tolerance: i128) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} ± {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    #[test]
    fn test_ln_of_one_is_zero() {
        assert_eq!(ln(ONE_18).unwrap(), 0);
    }

    #[test]
    fn test_ln_known_values() {
        assert_close(ln(2 * ONE_18).unwrap(), LN_2_18, 10);
        // ln(10) = 2.302585092994045684
        assert_close(ln(10 * ONE_18).unwrap(), 2_302_585_092_994_045_684, 1_000);
        // ln(0.5) = -ln(2)
        assert_close(ln(ONE_18 / 2).unwrap(), -LN_2_18, 10);
    }

    #[test]
    fn test_ln_rejects_non_positive() {
        assert!(ln(0).is_err());
        assert!(ln(-ONE_18).is_err());
    }

    #[test]
    fn test_exp_known_values() {
        assert_eq!(exp(0).unwrap(), ONE_18);
        // e = 2.718281828459045235
        assert_close(exp(ONE_18).unwrap(), 2_718_281_828_459_045_235, 1_000);
        // e^-1 = 0.367879441171442321
        assert_close(exp(-ONE_18).unwrap(), 367_879_441_171_442_321, 1_000);
    }

    #[test]
    fn test_exp_bounds() {
        assert_eq!(exp(MAX_NATURAL_EXPONENT + 1), Err(MathError::Overflow));
        assert_eq!(exp(MIN_NATURAL_EXPONENT - 1).unwrap(), 0);
        assert!(exp(MAX_NATURAL_EXPONENT).is_ok());
    }

    #[test]
    fn test_pow_square_root() {
        // 2^0.5 = 1.414213562373095048
        let root = pow(2 * ONE_18, ONE_18 / 2).unwrap();
        assert_close(root, 1_414_213_562_373_095_048, 10_000);
    }

    #[test]
    fn test_mul_18_matches_direct_product() {
        assert_eq!(mul_18(3 * ONE_18, 2 * ONE_18).unwrap(), 6 * ONE_18);
        assert_eq!(mul_18(-3 * ONE_18 / 2, 2 * ONE_18).unwrap(), -3 * ONE_18);
    }
}

//! Weighted (Balancer-style) pool math
//!
//! Invariant `Π balanceᵢ^weightᵢ` with normalized weights summing to ONE.
//! The spot price is available in two forms that must agree: a `Decimal` one
//! for reporting and a fixed-point one with an explicit [`Rounding`].

use crate::pool_traits::validate_swap_fee;
use crate::spot_price::{PriceSource, SpotPrice};
use crate::stable_math::{check_pair, check_pool_size};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::common::wide::{self, widen};
use types::{MathError, Rounding, ScaledAmount, SCALE};

/// Weighted pool state: balances, normalized weights and fee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPoolState {
    pub balances: Vec<ScaledAmount>,
    pub weights: Vec<ScaledAmount>,
    pub swap_fee: ScaledAmount, // Fraction of SCALE (3_000_000 = 0.3%)
}

impl WeightedPoolState {
    pub fn new(
        balances: Vec<ScaledAmount>,
        weights: Vec<ScaledAmount>,
        swap_fee: ScaledAmount,
    ) -> Result<Self, MathError> {
        check_pool_size(&balances)?;
        validate_weights(&weights, balances.len())?;
        validate_swap_fee(swap_fee)?;
        Ok(Self {
            balances,
            weights,
            swap_fee,
        })
    }

    /// `(balance_in, weight_in, balance_out, weight_out)` for a token pair
    pub fn pair(
        &self,
        token_in: usize,
        token_out: usize,
    ) -> Result<(ScaledAmount, ScaledAmount, ScaledAmount, ScaledAmount), MathError> {
        check_pair(token_in, token_out, self.balances.len())?;
        check_pair(token_in, token_out, self.weights.len())?;
        Ok((
            self.balances[token_in],
            self.weights[token_in],
            self.balances[token_out],
            self.weights[token_out],
        ))
    }

    pub fn spot_price_between(
        &self,
        token_in: usize,
        token_out: usize,
    ) -> Result<SpotPrice, MathError> {
        let (balance_in, weight_in, balance_out, weight_out) = self.pair(token_in, token_out)?;
        WeightedMath::spot_price_quote(balance_in, weight_in, balance_out, weight_out)
    }

    pub fn invariant(&self) -> Result<ScaledAmount, MathError> {
        WeightedMath::calc_invariant(&self.balances, &self.weights)
    }
}

/// Weighted pool math functions
pub struct WeightedMath;

impl WeightedMath {
    /// Spot price of `token_out` per `token_in` for reporting
    ///
    /// `(weight_in / weight_out) × (balance_out / balance_in)` in `Decimal`.
    pub fn spot_price(
        balance_in: ScaledAmount,
        weight_in: ScaledAmount,
        balance_out: ScaledAmount,
        weight_out: ScaledAmount,
    ) -> Result<Decimal, MathError> {
        if balance_in.is_zero() || weight_out.is_zero() {
            return Err(MathError::DivideByZero);
        }

        let weight_ratio = weight_in
            .to_decimal()?
            .checked_div(weight_out.to_decimal()?)
            .ok_or(MathError::Overflow)?;
        let balance_ratio = balance_out
            .to_decimal()?
            .checked_div(balance_in.to_decimal()?)
            .ok_or(MathError::Overflow)?;

        weight_ratio
            .checked_mul(balance_ratio)
            .ok_or(MathError::Overflow)
    }

    /// Spot price in scaled units with one 256-bit division
    ///
    /// `(balance_out · weight_in · SCALE) / (balance_in · weight_out)`
    pub fn spot_price_scaled(
        balance_in: ScaledAmount,
        weight_in: ScaledAmount,
        balance_out: ScaledAmount,
        weight_out: ScaledAmount,
        rounding: Rounding,
    ) -> Result<ScaledAmount, MathError> {
        let numerator = wide::mul(
            wide::mul(widen(balance_out.raw_value()), widen(weight_in.raw_value()))?,
            widen(SCALE),
        )?;
        let denominator = wide::mul(widen(balance_in.raw_value()), widen(weight_out.raw_value()))?;
        let price = wide::div(numerator, denominator, rounding)?;
        Ok(ScaledAmount::from_raw(wide::narrow(price)?))
    }

    /// Both spot price forms, scaled rounded down
    pub fn spot_price_quote(
        balance_in: ScaledAmount,
        weight_in: ScaledAmount,
        balance_out: ScaledAmount,
        weight_out: ScaledAmount,
    ) -> Result<SpotPrice, MathError> {
        let price = Self::spot_price(balance_in, weight_in, balance_out, weight_out)?;
        let scaled = Self::spot_price_scaled(
            balance_in,
            weight_in,
            balance_out,
            weight_out,
            Rounding::Down,
        )?;
        Ok(SpotPrice {
            price,
            scaled,
            source: PriceSource::ClosedForm,
        })
    }

    /// `Π balanceᵢ^weightᵢ`, each power and product rounded down
    pub fn calc_invariant(
        balances: &[ScaledAmount],
        weights: &[ScaledAmount],
    ) -> Result<ScaledAmount, MathError> {
        if balances.is_empty() || balances.len() != weights.len() {
            return Err(MathError::InvalidAmount {
                reason: "balances and weights must be non-empty and the same length",
            });
        }

        let invariant = balances
            .iter()
            .zip(weights)
            .try_fold(ScaledAmount::ONE, |acc, (balance, weight)| {
                acc.mul_down(balance.pow_down(*weight)?)
            })?;

        if invariant.is_zero() {
            return Err(MathError::InvalidAmount {
                reason: "weighted invariant is zero",
            });
        }
        Ok(invariant)
    }

    /// Exact-in swap output before fees
    ///
    /// `balance_out × (1 − (balance_in / (balance_in + amount_in))^(weight_in / weight_out))`
    ///
    /// Every step rounds toward a smaller output: the base (< 1) up, the
    /// exponent down, the power up, the final product down.
    pub fn calc_out_given_in(
        balance_in: ScaledAmount,
        weight_in: ScaledAmount,
        balance_out: ScaledAmount,
        weight_out: ScaledAmount,
        amount_in: ScaledAmount,
    ) -> Result<ScaledAmount, MathError> {
        let base = balance_in.div_up(balance_in.checked_add(amount_in)?)?;
        let exponent = weight_in.div_down(weight_out)?;
        let power = base.pow_up(exponent)?;
        balance_out.mul_down(power.complement())
    }
}

fn validate_weights(weights: &[ScaledAmount], expected_len: usize) -> Result<(), MathError> {
    if weights.len() != expected_len {
        return Err(MathError::InvalidWeights {
            reason: "one weight per balance required",
        });
    }
    if weights.iter().any(|weight| weight.is_zero()) {
        return Err(MathError::InvalidWeights {
            reason: "weights must be non-zero",
        });
    }
    let total = weights
        .iter()
        .try_fold(ScaledAmount::ZERO, |acc, weight| acc.checked_add(*weight))?;
    if total != ScaledAmount::ONE {
        return Err(MathError::InvalidWeights {
            reason: "weights must sum to one",
        });
    }
    Ok(())
}

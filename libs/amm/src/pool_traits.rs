//! Pool trait definitions for unified AMM interface

use crate::spot_price::SpotPrice;
use crate::stable_math::StablePoolState;
use crate::weighted_math::{WeightedMath, WeightedPoolState};
use serde::{Deserialize, Serialize};
use types::{MathError, ScaledAmount};

/// Pool type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    Weighted,
    Stable,
}

/// Unified pool interface for arbitrage calculations
///
/// Token indices address the pool's own balance vector.
pub trait AmmPool {
    fn pool_type(&self) -> PoolType;

    /// Price of `token_out` per unit of `token_in`, before fees
    fn spot_price(&self, token_in: usize, token_out: usize) -> Result<SpotPrice, MathError>;

    /// Exact-in swap output with the pool fee taken from the output
    fn quote_out(
        &self,
        token_in: usize,
        token_out: usize,
        amount_in: ScaledAmount,
    ) -> Result<ScaledAmount, MathError>;

    /// Fee as a fraction of SCALE
    fn swap_fee(&self) -> ScaledAmount;

    fn balances(&self) -> &[ScaledAmount];
}

impl AmmPool for WeightedPoolState {
    fn pool_type(&self) -> PoolType {
        PoolType::Weighted
    }

    fn spot_price(&self, token_in: usize, token_out: usize) -> Result<SpotPrice, MathError> {
        self.spot_price_between(token_in, token_out)
    }

    fn quote_out(
        &self,
        token_in: usize,
        token_out: usize,
        amount_in: ScaledAmount,
    ) -> Result<ScaledAmount, MathError> {
        let (balance_in, weight_in, balance_out, weight_out) = self.pair(token_in, token_out)?;
        let gross = WeightedMath::calc_out_given_in(
            balance_in,
            weight_in,
            balance_out,
            weight_out,
            amount_in,
        )?;
        apply_swap_fee(gross, self.swap_fee)
    }

    fn swap_fee(&self) -> ScaledAmount {
        self.swap_fee
    }

    fn balances(&self) -> &[ScaledAmount] {
        &self.balances
    }
}

impl AmmPool for StablePoolState {
    fn pool_type(&self) -> PoolType {
        PoolType::Stable
    }

    fn spot_price(&self, token_in: usize, token_out: usize) -> Result<SpotPrice, MathError> {
        self.solver
            .spot_price_between(self.amp, &self.balances, token_in, token_out)
    }

    fn quote_out(
        &self,
        token_in: usize,
        token_out: usize,
        amount_in: ScaledAmount,
    ) -> Result<ScaledAmount, MathError> {
        let gross =
            self.solver
                .calc_out_given_in(self.amp, &self.balances, token_in, token_out, amount_in)?;
        apply_swap_fee(gross, self.swap_fee)
    }

    fn swap_fee(&self) -> ScaledAmount {
        self.swap_fee
    }

    fn balances(&self) -> &[ScaledAmount] {
        &self.balances
    }
}

/// Fees must leave something for the trader
pub fn validate_swap_fee(fee: ScaledAmount) -> Result<(), MathError> {
    if fee >= ScaledAmount::ONE {
        return Err(MathError::InvalidSwapFee {
            fee: fee.raw_value(),
            max: ScaledAmount::ONE.raw_value(),
        });
    }
    Ok(())
}

/// Output after the fee: `amount_out · (1 − fee)`, rounded down
pub fn apply_swap_fee(
    amount_out: ScaledAmount,
    fee: ScaledAmount,
) -> Result<ScaledAmount, MathError> {
    validate_swap_fee(fee)?;
    amount_out.mul_down(fee.complement())
}

/// Slippage guard for a quoted output
pub fn enforce_min_out(
    amount_out: ScaledAmount,
    min_amount_out: ScaledAmount,
) -> Result<ScaledAmount, MathError> {
    if amount_out < min_amount_out {
        return Err(MathError::SlippageExceeded {
            amount_out: amount_out.raw_value(),
            min_amount_out: min_amount_out.raw_value(),
        });
    }
    Ok(amount_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_taken_from_output() {
        let out = apply_swap_fee(ScaledAmount::from_units(1_000), ScaledAmount(3_000_000)).unwrap();
        assert_eq!(out, ScaledAmount::from_units(997));
    }

    #[test]
    fn test_fee_rounds_down() {
        // 7 · 0.997 = 6.979 → 6
        let out = apply_swap_fee(ScaledAmount(7), ScaledAmount(3_000_000)).unwrap();
        assert_eq!(out, ScaledAmount(6));
    }

    #[test]
    fn test_full_fee_rejected() {
        assert!(matches!(
            apply_swap_fee(ScaledAmount::ONE, ScaledAmount::ONE),
            Err(MathError::InvalidSwapFee { .. })
        ));
    }

    #[test]
    fn test_min_out_guard() {
        let out = ScaledAmount::from_units(10);
        assert_eq!(enforce_min_out(out, ScaledAmount::from_units(9)), Ok(out));
        assert_eq!(
            enforce_min_out(out, ScaledAmount::from_units(11)),
            Err(MathError::SlippageExceeded {
                amount_out: 10_000_000_000,
                min_amount_out: 11_000_000_000,
            })
        );
    }
}

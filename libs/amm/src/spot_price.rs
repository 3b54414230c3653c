//! Spot price estimation
//!
//! Weighted pools have a closed form. StableSwap pools do not, so the price is
//! read off a small reference swap through the solver. When that swap cannot
//! be quoted the estimator degrades to the raw balance ratio and says so in
//! [`SpotPrice::source`]; callers decide whether a degraded price is usable.

use crate::stable_math::{check_pair, AmpFactor, StableSwapSolver};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use types::{MathError, ScaledAmount};

/// Input of the reference swap used to probe a StableSwap curve (1.0 token)
pub const REFERENCE_SWAP_AMOUNT: ScaledAmount = ScaledAmount::ONE;

/// How a spot price was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Weighted-pool closed form
    ClosedForm,
    /// StableSwap reference swap
    Solved,
    /// Balance ratio used after the solver could not quote
    NaiveRatio,
}

/// Price of the output token per unit of input token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotPrice {
    /// Reporting form
    pub price: Decimal,
    /// Same price in scaled units, rounded down
    pub scaled: ScaledAmount,
    pub source: PriceSource,
}

impl SpotPrice {
    /// True when the price did not come from the pool's own curve
    pub fn is_fallback(&self) -> bool {
        self.source == PriceSource::NaiveRatio
    }
}

impl StableSwapSolver {
    /// Spot price of a two-token StableSwap pool
    ///
    /// `amount_out / REFERENCE_SWAP_AMOUNT` for a reference swap of
    /// `balance_in → balance_out`, or `balance_out / balance_in` when the
    /// swap fails or quotes nothing.
    pub fn spot_price(
        &self,
        balance_in: ScaledAmount,
        balance_out: ScaledAmount,
        amp: AmpFactor,
    ) -> Result<SpotPrice, MathError> {
        self.spot_price_between(amp, &[balance_in, balance_out], 0, 1)
    }

    /// Spot price between two tokens of an n-token StableSwap pool
    pub fn spot_price_between(
        &self,
        amp: AmpFactor,
        balances: &[ScaledAmount],
        token_in: usize,
        token_out: usize,
    ) -> Result<SpotPrice, MathError> {
        check_pair(token_in, token_out, balances.len())?;

        let failure = match self.calc_out_given_in(
            amp,
            balances,
            token_in,
            token_out,
            REFERENCE_SWAP_AMOUNT,
        ) {
            Ok(amount_out) if !amount_out.is_zero() => {
                let scaled = amount_out.div_down(REFERENCE_SWAP_AMOUNT)?;
                let price = amount_out
                    .to_decimal()?
                    .checked_div(REFERENCE_SWAP_AMOUNT.to_decimal()?)
                    .ok_or(MathError::Overflow)?;
                debug!(%price, token_in, token_out, "StableSwap spot price solved");
                return Ok(SpotPrice {
                    price,
                    scaled,
                    source: PriceSource::Solved,
                });
            }
            Ok(_) => "reference swap quoted zero output".to_string(),
            Err(error) => error.to_string(),
        };

        warn!(
            fallback = true,
            reason = %failure,
            token_in,
            token_out,
            "StableSwap spot price falling back to balance ratio"
        );
        naive_ratio(balances[token_in], balances[token_out])
    }
}

/// [`StableSwapSolver::spot_price`] with default limits
pub fn stable_spot_price(
    balance_in: ScaledAmount,
    balance_out: ScaledAmount,
    amp: AmpFactor,
) -> Result<SpotPrice, MathError> {
    StableSwapSolver::default().spot_price(balance_in, balance_out, amp)
}

fn naive_ratio(
    balance_in: ScaledAmount,
    balance_out: ScaledAmount,
) -> Result<SpotPrice, MathError> {
    if balance_in.is_zero() {
        return Err(MathError::DivideByZero);
    }
    let price = balance_out
        .to_decimal()?
        .checked_div(balance_in.to_decimal()?)
        .ok_or(MathError::Overflow)?;
    Ok(SpotPrice {
        price,
        scaled: balance_out.div_down(balance_in)?,
        source: PriceSource::NaiveRatio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stable_math::SolverLimits;
    use rust_decimal_macros::dec;

    fn amp(whole: u64) -> AmpFactor {
        AmpFactor::from_whole(whole).unwrap()
    }

    #[test]
    fn test_balanced_pool_price_near_one() {
        let spot = stable_spot_price(
            ScaledAmount::from_units(1_000_000),
            ScaledAmount::from_units(1_000_000),
            amp(100),
        )
        .unwrap();
        assert_eq!(spot.source, PriceSource::Solved);
        assert!(spot.price < dec!(1));
        assert!(spot.price > dec!(0.999));
        assert_eq!(spot.price, spot.scaled.to_decimal().unwrap());
    }

    #[test]
    fn test_scarce_output_prices_lower() {
        let spot = stable_spot_price(
            ScaledAmount::from_units(1_500_000),
            ScaledAmount::from_units(500_000),
            amp(50),
        )
        .unwrap();
        assert!(!spot.is_fallback());
        assert!(spot.price < dec!(1));
        assert!(spot.price > dec!(1) / dec!(3));
    }

    #[test]
    fn test_fallback_when_solver_cannot_quote() {
        let starved = StableSwapSolver::new(
            SolverLimits {
                max_iterations: 0,
                tolerance: 0,
            },
            SolverLimits::BALANCE,
        );
        let spot = starved
            .spot_price(
                ScaledAmount::from_units(200),
                ScaledAmount::from_units(100),
                amp(100),
            )
            .unwrap();
        assert_eq!(spot.source, PriceSource::NaiveRatio);
        assert_eq!(spot.price, dec!(0.5));
        assert_eq!(spot.scaled, ScaledAmount(500_000_000));
    }

    #[test]
    fn test_fallback_with_empty_input_side_fails() {
        let result = stable_spot_price(ScaledAmount::ZERO, ScaledAmount::from_units(100), amp(100));
        assert_eq!(result, Err(MathError::DivideByZero));
    }

    #[test]
    fn test_bad_indices_are_not_masked() {
        let balances = [ScaledAmount::from_units(1), ScaledAmount::from_units(1)];
        assert_eq!(
            StableSwapSolver::default().spot_price_between(amp(100), &balances, 0, 5),
            Err(MathError::TokenIndexOutOfBounds { index: 5, len: 2 })
        );
    }
}

//! # Arbitrage Opportunity Detection Engine
//!
//! ## Purpose
//!
//! Compares the spot price of one token pair in a weighted pool and in a
//! StableSwap pool and decides whether the spread survives both pools' fees.
//!
//! ```text
//! price_diff_percent = |p_weighted − p_stable| / min(p_weighted, p_stable) × 100
//! total_fees_percent = fee_weighted% + fee_stable%
//! net_profit_percent = price_diff_percent − total_fees_percent
//! ```
//!
//! An opportunity is reported only when `net_profit_percent ≥ min_profit_percent`;
//! the direction buys on the cheaper side. All arithmetic is `Decimal`.
//!
//! ## Integration Points
//!
//! - **Input Sources**: [`PriceQuotation`]s built from `AmmPool::spot_price` plus the pool fee
//! - **Configuration**: `DetectorSettings` (minimum profit, fallback-price policy)
//! - **Error Handling**: [`DetectorError`]; a failed or invalid price is never an opportunity

use amm::{AmmPool, MathError, PriceSource, ScaledAmount, SpotPrice};
use config::DetectorSettings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Structured error types for arbitrage detection failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("Invalid {side} price: {price} (must be positive)")]
    InvalidPrice { side: PoolSide, price: Decimal },

    #[error("Invalid {side} fee rate: {fee_rate} (must be below 1.0)")]
    InvalidFeeRate { side: PoolSide, fee_rate: ScaledAmount },

    #[error("Pricing failed for {side} pool: {source}")]
    Pricing {
        side: PoolSide,
        #[source]
        source: MathError,
    },

    #[error("Stable price came from the balance-ratio fallback and fallback prices are rejected")]
    FallbackRejected,

    #[error("Decimal precision overflow in calculation: {context}")]
    PrecisionOverflow { context: &'static str },
}

/// Which pool a quotation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSide {
    Weighted,
    Stable,
}

impl fmt::Display for PoolSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolSide::Weighted => write!(f, "weighted"),
            PoolSide::Stable => write!(f, "stable"),
        }
    }
}

/// Spot price and fee of one pool for the pair under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuotation {
    pub price: Decimal,
    /// Fraction of SCALE (3_000_000 = 0.3%)
    pub fee_rate: ScaledAmount,
    pub source: PriceSource,
}

impl PriceQuotation {
    pub fn new(price: Decimal, fee_rate: ScaledAmount, source: PriceSource) -> Self {
        Self {
            price,
            fee_rate,
            source,
        }
    }

    pub fn from_spot(spot: &SpotPrice, fee_rate: ScaledAmount) -> Self {
        Self::new(spot.price, fee_rate, spot.source)
    }

    /// Fee as a percentage (0.3 for 0.3%)
    pub fn fee_percent(&self) -> Result<Decimal, DetectorError> {
        let fraction = self
            .fee_rate
            .to_decimal()
            .map_err(|_| DetectorError::PrecisionOverflow { context: "fee rate" })?;
        fraction
            .checked_mul(dec!(100))
            .ok_or(DetectorError::PrecisionOverflow { context: "fee percent" })
    }

    fn validate(&self, side: PoolSide) -> Result<(), DetectorError> {
        if self.price <= Decimal::ZERO {
            return Err(DetectorError::InvalidPrice {
                side,
                price: self.price,
            });
        }
        if self.fee_rate >= ScaledAmount::ONE {
            return Err(DetectorError::InvalidFeeRate {
                side,
                fee_rate: self.fee_rate,
            });
        }
        Ok(())
    }
}

/// Which pool to buy from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrageDirection {
    BuyWeightedSellStable,
    BuyStableSellWeighted,
}

impl fmt::Display for ArbitrageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArbitrageDirection::BuyWeightedSellStable => write!(f, "buy weighted, sell stable"),
            ArbitrageDirection::BuyStableSellWeighted => write!(f, "buy stable, sell weighted"),
        }
    }
}

/// Detected arbitrage opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    pub weighted_price: Decimal,
    pub stable_price: Decimal,
    pub price_diff_percent: Decimal,
    pub total_fees_percent: Decimal,
    pub net_profit_percent: Decimal,
    pub direction: ArbitrageDirection,
    pub profitable: bool,
    /// Whether the stable price was solved or fell back to the balance ratio
    pub stable_price_source: PriceSource,
}

/// Compare two quotations and report the opportunity, if any
///
/// Returns `Ok(None)` when the net profit is below `min_profit_percent`,
/// including when the raw spread alone would clear it.
pub fn detect_arbitrage(
    weighted: &PriceQuotation,
    stable: &PriceQuotation,
    min_profit_percent: Decimal,
) -> Result<Option<ArbitrageOpportunity>, DetectorError> {
    weighted.validate(PoolSide::Weighted)?;
    stable.validate(PoolSide::Stable)?;

    let cheaper = weighted.price.min(stable.price);
    let price_diff_percent = (weighted.price - stable.price)
        .abs()
        .checked_div(cheaper)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or(DetectorError::PrecisionOverflow {
            context: "price difference",
        })?;

    let total_fees_percent = weighted
        .fee_percent()?
        .checked_add(stable.fee_percent()?)
        .ok_or(DetectorError::PrecisionOverflow { context: "total fees" })?;
    let net_profit_percent = price_diff_percent - total_fees_percent;

    if net_profit_percent < min_profit_percent {
        debug!(
            %price_diff_percent,
            %total_fees_percent,
            %net_profit_percent,
            %min_profit_percent,
            "Spread does not clear fees and minimum profit"
        );
        return Ok(None);
    }

    let direction = if weighted.price < stable.price {
        ArbitrageDirection::BuyWeightedSellStable
    } else {
        ArbitrageDirection::BuyStableSellWeighted
    };

    Ok(Some(ArbitrageOpportunity {
        weighted_price: weighted.price,
        stable_price: stable.price,
        price_diff_percent,
        total_fees_percent,
        net_profit_percent,
        direction,
        profitable: true,
        stable_price_source: stable.source,
    }))
}

/// Token indices of the compared pair inside each pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairIndices {
    pub token_in: usize,
    pub token_out: usize,
}

/// Detects arbitrage opportunities between a weighted and a stable pool
#[derive(Debug, Clone)]
pub struct OpportunityDetector {
    settings: DetectorSettings,
}

impl OpportunityDetector {
    pub fn new(settings: DetectorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Spot price and fee of `pool` for the pair
    pub fn quote<P: AmmPool>(
        &self,
        side: PoolSide,
        pool: &P,
        pair: PairIndices,
    ) -> Result<PriceQuotation, DetectorError> {
        debug!(?side, tokens = pool.balances().len(), "Pricing pool");
        let spot = pool
            .spot_price(pair.token_in, pair.token_out)
            .map_err(|source| DetectorError::Pricing { side, source })?;
        Ok(PriceQuotation::from_spot(&spot, pool.swap_fee()))
    }

    /// Price both pools and run [`detect_arbitrage`] on the result
    pub fn evaluate<W: AmmPool, S: AmmPool>(
        &self,
        weighted: &W,
        weighted_pair: PairIndices,
        stable: &S,
        stable_pair: PairIndices,
    ) -> Result<Option<ArbitrageOpportunity>, DetectorError> {
        crate::log_search!(
            "Evaluating {:?} pool against {:?} pool",
            weighted.pool_type(),
            stable.pool_type()
        );

        let weighted_quote = self.quote(PoolSide::Weighted, weighted, weighted_pair)?;
        let stable_quote = self.quote(PoolSide::Stable, stable, stable_pair)?;

        if stable_quote.source == PriceSource::NaiveRatio {
            if self.settings.reject_fallback_prices {
                return Err(DetectorError::FallbackRejected);
            }
            crate::log_degraded!(
                "Stable price {} is a balance-ratio fallback, comparison may be misleading",
                stable_quote.price
            );
        }

        crate::log_metrics!(
            "Weighted price {} (fee {}), stable price {} (fee {})",
            weighted_quote.price,
            weighted_quote.fee_rate,
            stable_quote.price,
            stable_quote.fee_rate
        );

        let opportunity =
            detect_arbitrage(&weighted_quote, &stable_quote, self.settings.min_profit_percent)?;

        if let Some(opp) = &opportunity {
            crate::log_profit!(
                "Opportunity: {} net {}% (spread {}%, fees {}%)",
                opp.direction,
                opp.net_profit_percent.round_dp(4),
                opp.price_diff_percent.round_dp(4),
                opp.total_fees_percent
            );
        }
        Ok(opportunity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: Decimal, fee_rate: u128) -> PriceQuotation {
        PriceQuotation::new(price, ScaledAmount(fee_rate), PriceSource::ClosedForm)
    }

    #[test]
    fn test_reference_opportunity() {
        let weighted = quote(dec!(0.95), 3_000_000);
        let stable = PriceQuotation::new(dec!(1.00), ScaledAmount(3_000_000), PriceSource::Solved);

        let opp = detect_arbitrage(&weighted, &stable, dec!(0.1))
            .unwrap()
            .expect("spread clears fees");

        assert!(opp.profitable);
        assert_eq!(opp.direction, ArbitrageDirection::BuyWeightedSellStable);
        assert_eq!(opp.total_fees_percent, dec!(0.6));
        assert_eq!(opp.net_profit_percent.round_dp(3), dec!(4.663));
        assert_eq!(opp.stable_price_source, PriceSource::Solved);
    }

    #[test]
    fn test_direction_follows_cheaper_side() {
        let weighted = quote(dec!(1.10), 1_000_000);
        let stable = quote(dec!(1.00), 1_000_000);
        let opp = detect_arbitrage(&weighted, &stable, dec!(0.1))
            .unwrap()
            .unwrap();
        assert_eq!(opp.direction, ArbitrageDirection::BuyStableSellWeighted);
        assert_eq!(opp.price_diff_percent, dec!(10));
    }

    #[test]
    fn test_fees_can_erase_spread() {
        // 0.5% spread clears the 0.1% minimum on its own but not after 0.6% of fees
        let weighted = quote(dec!(1.000), 3_000_000);
        let stable = quote(dec!(1.005), 3_000_000);
        assert_eq!(detect_arbitrage(&weighted, &stable, dec!(0.1)).unwrap(), None);
    }

    #[test]
    fn test_exact_threshold_is_reported() {
        let weighted = quote(dec!(1.00), 0);
        let stable = quote(dec!(1.01), 0);
        let opp = detect_arbitrage(&weighted, &stable, dec!(1)).unwrap();
        assert!(opp.is_some());
    }

    #[test]
    fn test_non_positive_price_is_error() {
        let good = quote(dec!(1), 3_000_000);
        let zero = quote(Decimal::ZERO, 3_000_000);
        let negative = quote(dec!(-0.5), 3_000_000);

        assert!(matches!(
            detect_arbitrage(&zero, &good, dec!(0.1)),
            Err(DetectorError::InvalidPrice {
                side: PoolSide::Weighted,
                ..
            })
        ));
        assert!(matches!(
            detect_arbitrage(&good, &negative, dec!(0.1)),
            Err(DetectorError::InvalidPrice {
                side: PoolSide::Stable,
                ..
            })
        ));
    }

    #[test]
    fn test_full_fee_rate_rejected() {
        let good = quote(dec!(1), 3_000_000);
        let broken = quote(dec!(1.2), 1_000_000_000);
        assert!(matches!(
            detect_arbitrage(&good, &broken, dec!(0.1)),
            Err(DetectorError::InvalidFeeRate { .. })
        ));
    }

    #[test]
    fn test_unpriceable_pool_blocks_opportunity() {
        use amm::{AmpFactor, StablePoolState, WeightedPoolState};

        // Drained input side: the weighted spot price divides by zero
        let weighted = WeightedPoolState::new(
            vec![ScaledAmount::ZERO, ScaledAmount::from_units(1_000)],
            vec![ScaledAmount(500_000_000), ScaledAmount(500_000_000)],
            ScaledAmount(3_000_000),
        )
        .unwrap();
        let stable = StablePoolState::new(
            vec![ScaledAmount::from_units(5_000), ScaledAmount::from_units(5_000)],
            AmpFactor::from_whole(200).unwrap(),
            ScaledAmount(400_000),
        )
        .unwrap();
        let pair = PairIndices {
            token_in: 0,
            token_out: 1,
        };

        let detector = OpportunityDetector::new(DetectorSettings::default());
        assert_eq!(
            detector.evaluate(&weighted, pair, &stable, pair),
            Err(DetectorError::Pricing {
                side: PoolSide::Weighted,
                source: MathError::DivideByZero,
            })
        );
    }

    #[test]
    fn test_fee_percent_conversion() {
        assert_eq!(quote(dec!(1), 3_000_000).fee_percent().unwrap(), dec!(0.3));
        assert_eq!(quote(dec!(1), 400_000).fee_percent().unwrap(), dec!(0.04));
    }
}

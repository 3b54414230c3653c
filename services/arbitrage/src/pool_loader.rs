//! Pool snapshot loading
//!
//! A snapshot is a JSON file describing one weighted and one StableSwap pool
//! in native token units, plus the pair to compare:
//!
//! ```json
//! {
//!   "pair": { "token_in": "USDC", "token_out": "USDT" },
//!   "weighted_pool": {
//!     "swap_fee": "0.003",
//!     "tokens": [
//!       { "symbol": "USDC", "decimals": 6, "balance": 1000000000000, "weight": "0.5" },
//!       { "symbol": "USDT", "decimals": 6, "balance": 950000000000, "weight": "0.5" }
//!     ]
//!   },
//!   "stable_pool": {
//!     "amp": 200,
//!     "swap_fee": "0.0004",
//!     "tokens": [
//!       { "symbol": "USDC", "decimals": 6, "balance": 5000000000000 },
//!       { "symbol": "USDT", "decimals": 6, "balance": 5000000000000 }
//!     ]
//!   }
//! }
//! ```
//!
//! Balances are converted to scaled units through `TokenScaling`; decimal
//! strings (weights, fees) are truncated to nine decimals.

use crate::detector::PairIndices;
use amm::{AmpFactor, ScaledAmount, StablePoolState, StableSwapSolver, WeightedPoolState};
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;
use types::TokenScaling;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolSnapshot {
    pub pair: PairJson,
    pub weighted_pool: WeightedPoolJson,
    pub stable_pool: StablePoolJson,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PairJson {
    pub token_in: String,
    pub token_out: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenJson {
    pub symbol: String,
    pub decimals: u8,
    /// Native units
    pub balance: u64,
    /// Normalized weight; weighted pools only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeightedPoolJson {
    pub swap_fee: Decimal,
    pub tokens: Vec<TokenJson>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StablePoolJson {
    /// Whole amplification, before AMP_PRECISION
    pub amp: u64,
    pub swap_fee: Decimal,
    pub tokens: Vec<TokenJson>,
}

/// Validated pools ready for the detector
#[derive(Debug, Clone)]
pub struct LoadedPools {
    pub token_in: String,
    pub token_out: String,
    pub weighted: WeightedPoolState,
    pub weighted_pair: PairIndices,
    pub stable: StablePoolState,
    pub stable_pair: PairIndices,
}

/// Load a snapshot file
pub fn load_snapshot(path: &Path) -> Result<PoolSnapshot> {
    crate::log_pool!("Loading pool snapshot from {:?}", path);

    let json_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pool snapshot {:?}", path))?;

    PoolSnapshot::from_json_str(&json_content)
}

impl PoolSnapshot {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse pool snapshot JSON")
    }

    /// Convert native units to scaled pool states, using `solver` for the stable pool
    pub fn into_pools(&self, solver: StableSwapSolver) -> Result<LoadedPools> {
        let weighted_balances = scale_balances(&self.weighted_pool.tokens)?;
        let weights = self
            .weighted_pool
            .tokens
            .iter()
            .map(|token| {
                let weight = token.weight.with_context(|| {
                    format!("Weighted pool token {} has no weight", token.symbol)
                })?;
                to_scaled(weight, "weight")
            })
            .collect::<Result<Vec<_>>>()?;
        let weighted_fee = to_scaled(self.weighted_pool.swap_fee, "weighted swap_fee")?;

        let weighted = WeightedPoolState::new(weighted_balances, weights, weighted_fee)
            .context("Invalid weighted pool")?;
        let weighted_invariant = weighted
            .invariant()
            .context("Weighted pool has no usable liquidity")?;
        let weighted_pair = self.resolve_pair(&self.weighted_pool.tokens, "weighted")?;

        let amp = AmpFactor::from_whole(self.stable_pool.amp).context("Invalid stable pool amp")?;
        let stable_fee = to_scaled(self.stable_pool.swap_fee, "stable swap_fee")?;
        let stable_balances = scale_balances(&self.stable_pool.tokens)?;
        let stable = StablePoolState::new(stable_balances, amp, stable_fee)
            .context("Invalid stable pool")?
            .with_solver(solver);
        // A solver failure here is left to the spot-price fallback
        match stable.invariant() {
            Ok(d) if d.is_zero() => bail!("Stable pool has no liquidity"),
            Ok(d) => debug!(invariant = %d, "Stable invariant solved"),
            Err(e) => debug!(error = %e, "Stable invariant unavailable at load"),
        }
        let stable_pair = self.resolve_pair(&self.stable_pool.tokens, "stable")?;

        debug!(
            weighted_tokens = weighted.balances.len(),
            stable_tokens = stable.balances.len(),
            amp = amp.raw_value(),
            weighted_invariant = %weighted_invariant,
            "Snapshot converted to scaled pools"
        );

        Ok(LoadedPools {
            token_in: self.pair.token_in.clone(),
            token_out: self.pair.token_out.clone(),
            weighted,
            weighted_pair,
            stable,
            stable_pair,
        })
    }

    fn resolve_pair(&self, tokens: &[TokenJson], pool: &str) -> Result<PairIndices> {
        let find = |symbol: &str| {
            tokens
                .iter()
                .position(|token| token.symbol == symbol)
                .with_context(|| format!("Token {} not found in {} pool", symbol, pool))
        };
        let token_in = find(&self.pair.token_in)?;
        let token_out = find(&self.pair.token_out)?;
        if token_in == token_out {
            bail!("Pair must name two different tokens, got {} twice", self.pair.token_in);
        }
        Ok(PairIndices {
            token_in,
            token_out,
        })
    }
}

fn scale_balances(tokens: &[TokenJson]) -> Result<Vec<ScaledAmount>> {
    tokens
        .iter()
        .map(|token| {
            let scaling = TokenScaling::from_decimals(token.decimals)
                .with_context(|| format!("Unsupported decimals for {}", token.symbol))?;
            scaling
                .scale_up(u128::from(token.balance))
                .with_context(|| format!("Balance of {} does not fit", token.symbol))
        })
        .collect()
}

fn to_scaled(value: Decimal, field: &str) -> Result<ScaledAmount> {
    ScaledAmount::from_decimal(value).with_context(|| format!("Invalid {}: {}", field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amm::AmmPool;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "pair": { "token_in": "USDC", "token_out": "USDT" },
        "weighted_pool": {
            "swap_fee": "0.003",
            "tokens": [
                { "symbol": "USDC", "decimals": 6, "balance": 1000000000000, "weight": "0.5" },
                { "symbol": "USDT", "decimals": 6, "balance": 950000000000, "weight": "0.5" }
            ]
        },
        "stable_pool": {
            "amp": 200,
            "swap_fee": "0.0004",
            "tokens": [
                { "symbol": "DAI", "decimals": 18, "balance": 1000000000000000000 },
                { "symbol": "USDT", "decimals": 6, "balance": 5000000000000 },
                { "symbol": "USDC", "decimals": 6, "balance": 5000000000000 }
            ]
        }
    }"#;

    #[test]
    fn test_sample_snapshot_converts() {
        let snapshot = PoolSnapshot::from_json_str(SAMPLE).unwrap();
        let pools = snapshot.into_pools(StableSwapSolver::default()).unwrap();

        assert_eq!(pools.weighted.balances[0], ScaledAmount::from_units(1_000_000));
        assert_eq!(pools.weighted.weights[1], ScaledAmount(500_000_000));
        assert_eq!(pools.weighted.swap_fee(), ScaledAmount(3_000_000));
        assert_eq!(pools.weighted_pair, PairIndices { token_in: 0, token_out: 1 });

        // Stable pool lists the pair in a different order
        assert_eq!(pools.stable_pair, PairIndices { token_in: 2, token_out: 1 });
        assert_eq!(pools.stable.balances[0], ScaledAmount::from_units(1));
        assert_eq!(pools.stable.amp.raw_value(), 200_000);
        assert_eq!(pools.stable.swap_fee, ScaledAmount(400_000));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.pair.token_out, "USDT");
    }

    #[test]
    fn test_unknown_pair_token_rejected() {
        let mut snapshot = PoolSnapshot::from_json_str(SAMPLE).unwrap();
        snapshot.pair.token_out = "WETH".to_string();
        let err = snapshot.into_pools(StableSwapSolver::default()).unwrap_err();
        assert!(err.to_string().contains("WETH"));
    }

    #[test]
    fn test_missing_weight_rejected() {
        let mut snapshot = PoolSnapshot::from_json_str(SAMPLE).unwrap();
        snapshot.weighted_pool.tokens[1].weight = None;
        assert!(snapshot.into_pools(StableSwapSolver::default()).is_err());
    }

    #[test]
    fn test_drained_weighted_pool_rejected() {
        let mut snapshot = PoolSnapshot::from_json_str(SAMPLE).unwrap();
        snapshot.weighted_pool.tokens[0].balance = 0;
        let err = snapshot.into_pools(StableSwapSolver::default()).unwrap_err();
        assert!(err.to_string().contains("no usable liquidity"));
    }

    #[test]
    fn test_empty_stable_pool_rejected() {
        let mut snapshot = PoolSnapshot::from_json_str(SAMPLE).unwrap();
        for token in &mut snapshot.stable_pool.tokens {
            token.balance = 0;
        }
        let err = snapshot.into_pools(StableSwapSolver::default()).unwrap_err();
        assert_eq!(err.to_string(), "Stable pool has no liquidity");
    }

    #[test]
    fn test_amp_out_of_range_rejected() {
        let mut snapshot = PoolSnapshot::from_json_str(SAMPLE).unwrap();
        snapshot.stable_pool.amp = 0;
        assert!(snapshot.into_pools(StableSwapSolver::default()).is_err());
    }
}

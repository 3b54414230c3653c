//! # Tandem Arbitrage Client
//!
//! ## Purpose
//!
//! Off-chain consumer of the pool math: loads a weighted and a StableSwap pool
//! from a snapshot, prices the same pair in both, and reports whether the
//! spread is worth trading after fees. It never mutates pool state.
//!
//! ## Architecture Role
//!
//! ```text
//! snapshot.json → [pool_loader] → AmmPool::spot_price ×2 → [detector] → log / exit
//!                      ↓                    ↓                    ↓
//!               TokenScaling         StableSwap solver      DetectorSettings
//! ```

#[macro_use]
pub mod logging;

pub mod detector;
pub mod pool_loader;

pub use detector::{
    detect_arbitrage, ArbitrageDirection, ArbitrageOpportunity, DetectorError,
    OpportunityDetector, PairIndices, PoolSide, PriceQuotation,
};
pub use pool_loader::{load_snapshot, LoadedPools, PoolSnapshot};

use amm::{SolverLimits, StableSwapSolver};
use anyhow::Result;
use config::{EngineConfig, SolverSettings};
use std::path::Path;

/// StableSwap solver with the configured iteration budgets
pub fn solver_from_settings(settings: &SolverSettings) -> StableSwapSolver {
    StableSwapSolver::new(
        SolverLimits {
            max_iterations: settings.max_invariant_iterations,
            tolerance: u128::from(settings.invariant_tolerance),
        },
        SolverLimits {
            max_iterations: settings.max_balance_iterations,
            tolerance: u128::from(settings.balance_tolerance),
        },
    )
}

/// Load a snapshot and run the detector over it
pub fn evaluate_snapshot(
    config: &EngineConfig,
    snapshot_path: &Path,
) -> Result<Option<ArbitrageOpportunity>> {
    let snapshot = load_snapshot(snapshot_path)?;
    let pools = snapshot.into_pools(solver_from_settings(&config.solver))?;
    log_pool!(
        "Comparing {} → {} across weighted and stable pools",
        pools.token_in,
        pools.token_out
    );

    let detector = OpportunityDetector::new(config.detector);
    let opportunity = detector.evaluate(
        &pools.weighted,
        pools.weighted_pair,
        &pools.stable,
        pools.stable_pair,
    )?;
    Ok(opportunity)
}

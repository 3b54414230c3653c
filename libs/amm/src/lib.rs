//! # Tandem AMM Library - Weighted and StableSwap Pool Mathematics
//!
//! ## Purpose
//!
//! Pricing core for two pool families sharing one fixed-point convention:
//! Balancer-style weighted pools (closed-form prices) and Curve-style
//! StableSwap pools (prices and quotes through bounded Newton-Raphson solvers).
//! Every function is pure and synchronous, so the same code serves settlement
//! logic and the off-chain arbitrage client.
//!
//! ## Integration Points
//!
//! - **Input Sources**: pool balances, weights, amplification and fee, already
//!   converted to [`ScaledAmount`] via `tandem_types::TokenScaling`
//! - **Output Destinations**: swap quotes for settlement, [`SpotPrice`] values for
//!   the arbitrage detector
//! - **Precision**: 9-decimal scaled integers, 256-bit intermediates, `Decimal`
//!   only in the reporting form of a price
//! - **Validation**: index, amplification, weight and fee checks return
//!   [`MathError`] instead of panicking
//!
//! ## Performance Profile
//!
//! - **Invariant solve**: at most 256 Newton iterations, typically under ten
//! - **Balance solve**: at most 64 iterations
//! - **Allocation**: one balance vector per StableSwap quote
//!
//! ## Example
//!
//! ```rust
//! use tandem_amm::{stable_math, AmpFactor, ScaledAmount};
//!
//! let amp = AmpFactor::from_whole(100).unwrap();
//! let balances = [ScaledAmount::from_units(1_000), ScaledAmount::from_units(1_000)];
//!
//! let out = stable_math::calc_out_given_in(amp, &balances, 0, 1, ScaledAmount::ONE).unwrap();
//! assert!(out < ScaledAmount::ONE);
//! ```

pub mod pool_traits;
pub mod spot_price;
pub mod stable_math;
pub mod weighted_math;

pub use pool_traits::{apply_swap_fee, enforce_min_out, AmmPool, PoolType};
pub use spot_price::{stable_spot_price, PriceSource, SpotPrice, REFERENCE_SWAP_AMOUNT};
pub use stable_math::{
    AmpFactor, SolverLimits, StablePoolState, StableSwapSolver, SwapQuote, AMP_PRECISION,
};
pub use weighted_math::{WeightedMath, WeightedPoolState};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
pub use types::{MathError, Rounding, ScaledAmount, Solver};

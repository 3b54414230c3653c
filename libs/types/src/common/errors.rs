//! Error types for fixed-point arithmetic and pool math
//!
//! Every numeric failure in the engine maps onto one [`MathError`] variant.
//! The first three variants are the numeric taxonomy (divide-by-zero,
//! overflow, non-convergence); the rest reject malformed pool parameters
//! before any iteration starts. All of them are terminal for the call that
//! produced them: a deterministic computation retried with the same inputs
//! fails the same way.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifies which Newton-Raphson solver failed to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Solver {
    /// StableSwap invariant `D` given balances
    Invariant,
    /// StableSwap balance of one token given `D` and the other balances
    BalanceGivenInvariant,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invariant => write!(f, "invariant solver"),
            Self::BalanceGivenInvariant => write!(f, "balance solver"),
        }
    }
}

/// Errors that can occur during fixed-point and pool arithmetic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    /// A divisor was zero (degenerate pool state)
    #[error("Division by zero in fixed-point arithmetic")]
    DivideByZero,

    /// An intermediate exceeded the representable range
    #[error("Overflow: intermediate value exceeds the working integer width")]
    Overflow,

    /// Newton-Raphson did not reach tolerance within its iteration cap
    #[error("{solver} did not converge within {iterations} iterations")]
    ConvergenceFailure { solver: Solver, iterations: u32 },

    /// Amount or balance vector rejected before computation
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: &'static str },

    /// Token index outside the balance vector
    #[error("Token index {index} out of bounds for pool of {len} tokens")]
    TokenIndexOutOfBounds { index: usize, len: usize },

    /// Swap requested from a token into itself
    #[error("Token index {index} used as both input and output")]
    IdenticalTokenIndex { index: usize },

    /// Amplification factor outside the supported range
    #[error("Amplification {value} is not in allowed range [{min}, {max}]")]
    AmpOutOfRange { value: u64, min: u64, max: u64 },

    /// Swap fee at or above 100%
    #[error("Invalid swap fee {fee}: must be below {max}")]
    InvalidSwapFee { fee: u128, max: u128 },

    /// Weighted pool weights malformed
    #[error("Invalid weights: {reason}")]
    InvalidWeights { reason: &'static str },

    /// Quoted output below the caller's minimum
    #[error("Slippage exceeded: amount out {amount_out} below minimum {min_amount_out}")]
    SlippageExceeded { amount_out: u128, min_amount_out: u128 },
}

impl MathError {
    /// True for the three numeric failures (as opposed to rejected inputs)
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::DivideByZero | Self::Overflow | Self::ConvergenceFailure { .. }
        )
    }
}

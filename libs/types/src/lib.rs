//! # Tandem Numeric Types Library
//!
//! Scaled-integer representation and rounding-aware primitives shared by the
//! weighted and StableSwap pool models.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: All amounts, weights and fees stored as integers scaled by 10^9
//! - **Rounding as a Parameter**: every multiply/divide/power has a down and an up form
//! - **Loud Failure**: 256-bit intermediates, checked narrowing, typed [`MathError`]
//! - **Type Safety**: [`ScaledAmount`] cannot be mixed with raw token units or the amp scale
//! - **Clear Boundaries**: `Decimal`/`f64` only at reporting edges
//!
//! ## Quick Start
//!
//! ```rust
//! use tandem_types::{Rounding, ScaledAmount};
//!
//! let balance = ScaledAmount::from_units(400);
//! let fee = ScaledAmount::from_decimal_str("0.003").unwrap();
//!
//! // What the user receives rounds down, what they pay rounds up
//! let kept = balance.mul_down(fee.complement()).unwrap();
//! let charged = balance.mul(fee, Rounding::Up).unwrap();
//! assert_eq!(kept.checked_add(charged).unwrap(), balance);
//! ```
//!
//! ## Integration Points
//!
//! - **AMM Math** (`tandem-amm`): weighted and StableSwap formulas, Newton-Raphson solvers
//! - **Arbitrage Service**: price reporting via `to_decimal`, fee-rate percentages
//! - **Snapshot Loading**: [`precision::TokenScaling`] converts native token units

pub mod common;

// Token decimal conversion
pub mod precision;

pub use common::errors::{MathError, Solver};
pub use common::fixed_point::{Rounding, ScaledAmount, SCALE, SCALE_DECIMALS};
pub use common::wide::U256;
pub use precision::TokenScaling;

//! Token Decimal Scaling
//!
//! Pool math runs on 9-decimal [`ScaledAmount`]s while token balances arrive in
//! each mint's native precision. [`TokenScaling`] is the single conversion
//! point between the two.
//!
//! ## Precision Requirements by Token
//!
//! - **6-decimal stablecoins** (USDC, USDT): scaled up by 10^3
//! - **9-decimal tokens** (SOL-style): identity
//! - **18-decimal tokens** (WETH, DAI): scaled down by 10^9, sub-nano dust truncated
//!
//! ## Critical Rules
//!
//! 1. **Round against the user**: scaling down for payout truncates
//! 2. **Explicit Conversions**: raw and scaled amounts never share a type
//! 3. **Checked**: a conversion that does not fit fails with `Overflow`
//!
//! ## Example Usage
//!
//! ```rust
//! use tandem_types::precision::TokenScaling;
//!
//! let usdc = TokenScaling::from_decimals(6).unwrap();
//! let scaled = usdc.scale_up(5_000_000).unwrap(); // 5.0 USDC
//! assert_eq!(scaled.raw_value(), 5_000_000_000);
//! assert_eq!(usdc.scale_down(scaled).unwrap(), 5_000_000);
//! ```

use crate::common::errors::MathError;
use crate::common::fixed_point::{ScaledAmount, SCALE_DECIMALS};
use serde::{Deserialize, Serialize};

/// Largest native precision accepted for a token mint
pub const MAX_TOKEN_DECIMALS: u8 = 30;

/// Conversion between a token's native units and 9-decimal scaled units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenScaling {
    /// Native decimals of the token
    pub decimals: u8,
    /// `10^|decimals − 9|`
    factor: u128,
    /// True when native precision is coarser than the scaled precision
    scaling_up: bool,
}

impl TokenScaling {
    pub fn from_decimals(decimals: u8) -> Result<Self, MathError> {
        if decimals > MAX_TOKEN_DECIMALS {
            return Err(MathError::InvalidAmount {
                reason: "token decimals exceed supported precision",
            });
        }
        let target = SCALE_DECIMALS as u8;
        let (distance, scaling_up) = if decimals <= target {
            (target - decimals, true)
        } else {
            (decimals - target, false)
        };
        let factor = 10u128
            .checked_pow(distance as u32)
            .ok_or(MathError::Overflow)?;
        Ok(Self {
            decimals,
            factor,
            scaling_up,
        })
    }

    /// Native units → scaled units (dust below 1e-9 is dropped)
    pub fn scale_up(&self, raw_amount: u128) -> Result<ScaledAmount, MathError> {
        if self.scaling_up {
            raw_amount
                .checked_mul(self.factor)
                .map(ScaledAmount::from_raw)
                .ok_or(MathError::Overflow)
        } else {
            Ok(ScaledAmount::from_raw(raw_amount / self.factor))
        }
    }

    /// Scaled units → native units, truncating toward zero
    pub fn scale_down(&self, scaled: ScaledAmount) -> Result<u128, MathError> {
        if self.scaling_up {
            Ok(scaled.raw_value() / self.factor)
        } else {
            scaled
                .raw_value()
                .checked_mul(self.factor)
                .ok_or(MathError::Overflow)
        }
    }

    pub fn is_identity(&self) -> bool {
        self.factor == 1
    }
}

//! Engine defaults
//!
//! Values used when a configuration file omits a setting. The solver limits
//! mirror the StableSwap solver's built-in budgets.

/// Configuration file locations
pub mod paths {
    /// Base configuration file, relative to the working directory
    pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";

    /// Directory holding `<environment>.toml` overlays
    pub const ENVIRONMENTS_DIR: &str = "config/environments";

    /// Prefix of environment variable overrides (`TANDEM_DETECTOR__MIN_PROFIT_PERCENT`)
    pub const ENV_PREFIX: &str = "TANDEM";

    /// Separator between nested keys in environment variable names
    pub const ENV_SEPARATOR: &str = "__";
}

/// Logging defaults
pub mod logging {
    pub const LOG_LEVEL: &str = "info";
}

/// StableSwap solver defaults
pub mod solver {
    pub const MAX_INVARIANT_ITERATIONS: u32 = 256;

    /// Scaled units
    pub const INVARIANT_TOLERANCE: u64 = 100;

    pub const MAX_BALANCE_ITERATIONS: u32 = 64;

    /// Scaled units
    pub const BALANCE_TOLERANCE: u64 = 1;
}

/// Arbitrage detector defaults
pub mod detector {
    use rust_decimal::Decimal;

    /// Minimum net profit, in percent, for an opportunity to be reported (0.1)
    pub const MIN_PROFIT_PERCENT: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

    pub const REJECT_FALLBACK_PRICES: bool = false;
}

//! # Tandem Engine Configuration
//!
//! Layered configuration for the price engine and the arbitrage client,
//! with the defaults every layer falls back to.
//!
//! ## Features
//!
//! - **Layering**: base TOML file, optional `config/environments/<env>.toml`
//!   overlay, then `TANDEM_` environment variables (`__` between nested keys)
//! - **Solver Budgets**: iteration caps and tolerances for the StableSwap solvers
//! - **Detector Thresholds**: minimum net profit and fallback-price policy
//!
//! ## Usage
//!
//! ```rust
//! use tandem_config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//! [detector]
//! min_profit_percent = "0.5"
//! "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.detector.min_profit_percent.to_string(), "0.5");
//! assert_eq!(config.solver.max_invariant_iterations, 256);
//! ```

pub mod service;
pub mod service_config;

// Re-export commonly used types
pub use service_config::{
    load_config, DetectorSettings, EngineConfig, GlobalConfig, LogFormat, SolverSettings,
};

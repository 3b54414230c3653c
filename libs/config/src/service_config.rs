//! Engine Configuration Module
//!
//! Provides configuration loading for the price engine and its client.
//! Supports loading from TOML files with environment-specific overrides.

use crate::service::{detector, logging, paths, solver};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main engine configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct EngineConfig {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,

    /// StableSwap solver iteration limits
    #[serde(default)]
    pub solver: SolverSettings,

    /// Arbitrage detector thresholds
    #[serde(default)]
    pub detector: DetectorSettings,
}

/// Global configuration settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `tandem_amm=debug`
    pub log_level: String,
    pub log_format: LogFormat,
    /// Pool snapshot used when none is given on the command line
    pub snapshot_path: Option<PathBuf>,
}

/// Log line format
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Newton-Raphson budgets for the StableSwap solvers
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SolverSettings {
    pub max_invariant_iterations: u32,
    pub invariant_tolerance: u64,
    pub max_balance_iterations: u32,
    pub balance_tolerance: u64,
}

/// Arbitrage detector thresholds
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct DetectorSettings {
    /// Net profit (percent) below which nothing is reported
    pub min_profit_percent: Decimal,
    /// Refuse to compare against a stable price taken from the balance-ratio fallback
    pub reject_fallback_prices: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: logging::LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            snapshot_path: None,
        }
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_invariant_iterations: solver::MAX_INVARIANT_ITERATIONS,
            invariant_tolerance: solver::INVARIANT_TOLERANCE,
            max_balance_iterations: solver::MAX_BALANCE_ITERATIONS,
            balance_tolerance: solver::BALANCE_TOLERANCE,
        }
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_profit_percent: detector::MIN_PROFIT_PERCENT,
            reject_fallback_prices: detector::REJECT_FALLBACK_PRICES,
        }
    }
}

impl EngineConfig {
    /// Load configuration from files with environment overrides
    ///
    /// An explicit `base_path` must exist; the default path is optional so the
    /// engine runs on built-in defaults when no file is present.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let (base, required) = match base_path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(paths::DEFAULT_CONFIG_PATH), false),
        };
        debug!("Loading engine config: {:?} (required: {})", base, required);

        let mut builder =
            Config::builder().add_source(File::from(base.as_path()).required(required));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = PathBuf::from(paths::ENVIRONMENTS_DIR).join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (TANDEM_ prefix)
        builder = builder.add_source(
            Environment::with_prefix(paths::ENV_PREFIX)
                .prefix_separator("_")
                .separator(paths::ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut engine: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        engine.expand_env_vars()?;
        engine.validate()?;
        Ok(engine)
    }

    /// Parse a TOML document directly, without file or environment layering
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut engine: Self =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        engine.expand_env_vars()?;
        engine.validate()?;
        Ok(engine)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Expand environment variables in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(path) = &self.global.snapshot_path {
            let raw = path.to_string_lossy();
            let expanded = shellexpand::env(&raw).context("Failed to expand snapshot path")?;
            self.global.snapshot_path = Some(PathBuf::from(expanded.as_ref()));
        }
        Ok(())
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.global.log_level.trim().is_empty() {
            bail!("global.log_level must not be empty");
        }
        if self.solver.max_invariant_iterations == 0 {
            bail!("solver.max_invariant_iterations must be positive");
        }
        if self.solver.max_balance_iterations == 0 {
            bail!("solver.max_balance_iterations must be positive");
        }
        if self.detector.min_profit_percent.is_sign_negative() {
            bail!(
                "detector.min_profit_percent must not be negative, got {}",
                self.detector.min_profit_percent
            );
        }
        Ok(())
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(environment: Option<&str>) -> Result<EngineConfig> {
    EngineConfig::load(None, environment)
}

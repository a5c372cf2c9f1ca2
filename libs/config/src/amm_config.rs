//! AMM Engine Configuration Module
//!
//! Provides configuration loading for the quote engine and its consumers.
//! Supports loading from TOML files with `ALGOFI_` environment overrides.

use crate::pool_types::{Network, PoolType};
use crate::protocol::{compute, fees, PARAMETER_SCALE_FACTOR};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Main engine configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AmmConfig {
    /// Network the pools live on
    pub network: Network,

    /// Swap fee per pool tier
    pub fees: FeeTierConfig,

    /// Execution budget used to price stableswap iterations
    pub compute: ComputeBudgetConfig,

    /// Slippage defaults handed to transaction builders
    pub slippage: SlippageConfig,
}

/// Swap fee per pool tier, scaled by [`PARAMETER_SCALE_FACTOR`]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeeTierConfig {
    pub constant_product_25bp: u64,
    pub constant_product_30bp: u64,
    pub constant_product_75bp: u64,
    pub constant_product_100bp: u64,
    pub nanoswap: u64,
}

/// Opcode budget model for the extra fee a stableswap call needs
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ComputeBudgetConfig {
    pub min_txn_fee: u64,
    pub opcode_budget_per_call: u64,
    pub opcode_cost_per_iteration: u64,
}

/// Slippage defaults, scaled by [`PARAMETER_SCALE_FACTOR`]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SlippageConfig {
    pub default_max_slippage: u64,
}

impl Default for FeeTierConfig {
    fn default() -> Self {
        Self {
            constant_product_25bp: 2_500,
            constant_product_30bp: 3_000,
            constant_product_75bp: 7_500,
            constant_product_100bp: 10_000,
            nanoswap: 1_000,
        }
    }
}

impl Default for ComputeBudgetConfig {
    fn default() -> Self {
        Self {
            min_txn_fee: fees::MIN_TXN_FEE,
            opcode_budget_per_call: compute::OPCODE_BUDGET_PER_CALL,
            opcode_cost_per_iteration: compute::STABLESWAP_OPCODE_COST_PER_ITERATION,
        }
    }
}

impl Default for SlippageConfig {
    fn default() -> Self {
        Self {
            default_max_slippage: 10_000, // 1%
        }
    }
}

impl FeeTierConfig {
    /// Swap fee charged by pools of the given tier
    pub fn swap_fee(&self, pool_type: PoolType) -> u64 {
        match pool_type {
            PoolType::ConstantProduct25BpFee => self.constant_product_25bp,
            PoolType::ConstantProduct30BpFee => self.constant_product_30bp,
            PoolType::ConstantProduct75BpFee => self.constant_product_75bp,
            PoolType::ConstantProduct100BpFee => self.constant_product_100bp,
            PoolType::Nanoswap => self.nanoswap,
        }
    }

    fn entries(&self) -> [(&'static str, u64); 5] {
        [
            ("constant_product_25bp", self.constant_product_25bp),
            ("constant_product_30bp", self.constant_product_30bp),
            ("constant_product_75bp", self.constant_product_75bp),
            ("constant_product_100bp", self.constant_product_100bp),
            ("nanoswap", self.nanoswap),
        ]
    }
}

impl AmmConfig {
    /// Load configuration from a TOML file with environment overrides
    ///
    /// A missing file is not an error when `path` is `None`; the defaults
    /// plus any `ALGOFI_` variables are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                info!("Loading AMM config: {:?}", path);
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                let default_path = Path::new("config/amm.toml");
                if default_path.exists() {
                    info!("Loading AMM config: {:?}", default_path);
                    builder = builder.add_source(File::from(default_path));
                } else {
                    debug!("No AMM config file found, using defaults");
                }
            }
        }

        // Override with environment variables, e.g. ALGOFI_FEES__NANOSWAP=2000
        builder = builder.add_source(
            Environment::with_prefix("ALGOFI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AmmConfig = builder
            .build()
            .context("Failed to build AMM configuration")?
            .try_deserialize()
            .context("Failed to deserialize AMM configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AmmConfig = Config::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()
            .context("Failed to build AMM configuration")?
            .try_deserialize()
            .context("Failed to deserialize AMM configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize AMM configuration")
    }

    /// Reject parameters the on-chain contracts could never hold
    pub fn validate(&self) -> Result<()> {
        for (tier, fee) in self.fees.entries() {
            if fee >= PARAMETER_SCALE_FACTOR {
                warn!("Rejecting swap fee {} for tier {}", fee, tier);
                bail!(
                    "Swap fee for {} must be below {}, got {}",
                    tier,
                    PARAMETER_SCALE_FACTOR,
                    fee
                );
            }
        }

        if self.slippage.default_max_slippage >= PARAMETER_SCALE_FACTOR {
            bail!(
                "Default max slippage must be below {}, got {}",
                PARAMETER_SCALE_FACTOR,
                self.slippage.default_max_slippage
            );
        }

        if self.compute.opcode_budget_per_call == 0 {
            bail!("Opcode budget per call must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_base_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("amm.toml");

        let config_content = r#"
network = "testnet"

[fees]
constant_product_30bp = 3500
nanoswap = 500

[compute]
min_txn_fee = 2000

[slippage]
default_max_slippage = 5000
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = AmmConfig::load(Some(&config_path)).unwrap();

        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.fees.swap_fee(PoolType::ConstantProduct30BpFee), 3_500);
        assert_eq!(config.fees.swap_fee(PoolType::Nanoswap), 500);
        // Unset keys keep their defaults
        assert_eq!(config.fees.swap_fee(PoolType::ConstantProduct25BpFee), 2_500);
        assert_eq!(config.compute.min_txn_fee, 2_000);
        assert_eq!(config.compute.opcode_budget_per_call, 700);
        assert_eq!(config.slippage.default_max_slippage, 5_000);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AmmConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_rejects_fee_at_scale() {
        let err = AmmConfig::from_toml_str("[fees]\nnanoswap = 1000000\n").unwrap_err();
        assert!(err.to_string().contains("nanoswap"));
    }

    #[test]
    fn test_rejects_zero_opcode_budget() {
        assert!(AmmConfig::from_toml_str("[compute]\nopcode_budget_per_call = 0\n").is_err());
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let rendered = AmmConfig::default().to_toml_string().unwrap();
        let parsed = AmmConfig::from_toml_str(&rendered).unwrap();
        assert_eq!(parsed, AmmConfig::default());
    }
}

//! # Algofi AMM Configuration
//!
//! Constants, pool tiers and tunable settings shared by the AMM quote
//! engine and the transaction-building layer that consumes its quotes.
//!
//! ## Features
//!
//! - **Protocol Constants**: parameter scale factor, minimum fee, opcode budgets
//! - **Pool Tiers**: [`PoolType`] and [`Network`] identifiers
//! - **Engine Configuration**: [`AmmConfig`] loaded from TOML with `ALGOFI_` env overrides
//!
//! ## Usage
//!
//! ```rust
//! use algofi_config::{protocol, AmmConfig, PoolType};
//!
//! let config = AmmConfig::default();
//! let fee = config.fees.swap_fee(PoolType::ConstantProduct25BpFee);
//! assert_eq!(fee, 2_500);
//! assert!(fee < protocol::PARAMETER_SCALE_FACTOR);
//! ```

pub mod amm_config;
pub mod pool_types;
pub mod protocol;

// Re-export commonly used types
pub use amm_config::{AmmConfig, ComputeBudgetConfig, FeeTierConfig, SlippageConfig};
pub use pool_types::{Network, PoolType};
pub use protocol::*;

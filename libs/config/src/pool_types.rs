//! Pool tiers and networks
//!
//! Each deployed pool contract belongs to exactly one tier for its lifetime;
//! the tier fixes the curve (constant product or stableswap) and the fee.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Algorand network the pools are deployed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

/// Deployed pool contract tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    ConstantProduct25BpFee,
    ConstantProduct30BpFee,
    ConstantProduct75BpFee,
    ConstantProduct100BpFee,
    /// Stableswap pool
    Nanoswap,
}

impl PoolType {
    /// Nominal fee tier in basis points
    pub const fn fee_bps(self) -> u32 {
        match self {
            PoolType::ConstantProduct25BpFee => 25,
            PoolType::ConstantProduct30BpFee => 30,
            PoolType::ConstantProduct75BpFee => 75,
            PoolType::ConstantProduct100BpFee => 100,
            PoolType::Nanoswap => 10,
        }
    }

    pub const fn is_stableswap(self) -> bool {
        matches!(self, PoolType::Nanoswap)
    }

    /// Tiers that exist on the given network
    pub fn available_on(network: Network) -> &'static [PoolType] {
        match network {
            Network::Mainnet => &[
                PoolType::ConstantProduct25BpFee,
                PoolType::ConstantProduct75BpFee,
                PoolType::Nanoswap,
            ],
            Network::Testnet => &[
                PoolType::ConstantProduct30BpFee,
                PoolType::ConstantProduct100BpFee,
                PoolType::Nanoswap,
            ],
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolType::Nanoswap => write!(f, "nanoswap"),
            other => write!(f, "constant-product-{}bp", other.fee_bps()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_per_network() {
        let mainnet = PoolType::available_on(Network::Mainnet);
        assert!(mainnet.contains(&PoolType::ConstantProduct25BpFee));
        assert!(!mainnet.contains(&PoolType::ConstantProduct30BpFee));

        let testnet = PoolType::available_on(Network::Testnet);
        assert!(testnet.contains(&PoolType::ConstantProduct100BpFee));
        assert!(testnet.iter().any(|t| t.is_stableswap()));
    }

    #[test]
    fn test_display() {
        assert_eq!(PoolType::ConstantProduct75BpFee.to_string(), "constant-product-75bp");
        assert_eq!(PoolType::Nanoswap.to_string(), "nanoswap");
    }
}

//! Slippage bounds derived from a quote
//!
//! The quote is exact for the snapshot it was computed on; these bounds are
//! what a caller attaches to the transaction so it still executes (or fails
//! cleanly) if the pool moves before it lands.

use crate::balance_delta::BalanceDelta;
use crate::snapshot::PoolSnapshot;
use algofi_config::{SlippageConfig, PARAMETER_SCALE_FACTOR};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Maximum tolerated slippage, scaled by `PARAMETER_SCALE_FACTOR` (10_000 = 1%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlippageTolerance(u64);

impl SlippageTolerance {
    /// Values above 100% are capped at 100%
    pub const fn new(scaled: u64) -> Self {
        if scaled > PARAMETER_SCALE_FACTOR {
            Self(PARAMETER_SCALE_FACTOR)
        } else {
            Self(scaled)
        }
    }

    pub fn from_config(config: &SlippageConfig) -> Self {
        Self::new(config.default_max_slippage)
    }

    /// Scaled value as passed to the pool's `maximum_slippage` argument
    pub const fn scaled(self) -> u64 {
        self.0
    }

    /// Smallest acceptable output: `floor(quoted * (1 - slippage))`
    pub fn min_amount_out(self, quoted_out: u64) -> u64 {
        let scale = u128::from(PARAMETER_SCALE_FACTOR);
        let kept = u128::from(quoted_out) * (scale - u128::from(self.0)) / scale;
        // kept <= quoted_out
        kept as u64
    }

    /// Largest acceptable input: `ceil(quoted * (1 + slippage))`, saturating
    pub fn max_amount_in(self, quoted_in: u64) -> u64 {
        let scale = u128::from(PARAMETER_SCALE_FACTOR);
        let allowed = (u128::from(quoted_in) * (scale + u128::from(self.0))).div_ceil(scale);
        u64::try_from(allowed).unwrap_or(u64::MAX)
    }

    /// Minimum the caller should accept for the asset a swap quote pays out
    pub fn min_amount_to_receive(self, delta: &BalanceDelta) -> u64 {
        let out = BalanceDelta::paid_out(delta.asset1_delta)
            .max(BalanceDelta::paid_out(delta.asset2_delta));
        self.min_amount_out(out)
    }

    /// Whether a pair deposit is within tolerance of the pool's ratio
    ///
    /// Checks `|a1 * b2 - a2 * b1| * scale <= slippage * a2 * b1`, the same
    /// relative deviation the pool contract enforces before pooling.
    pub fn deposit_within_tolerance(
        self,
        snapshot: &PoolSnapshot,
        asset1_amount: u64,
        asset2_amount: u64,
    ) -> bool {
        let b1 = U256::from(snapshot.asset1_balance());
        let b2 = U256::from(snapshot.asset2_balance());
        let a1 = U256::from(asset1_amount);
        let a2 = U256::from(asset2_amount);

        if snapshot.is_empty() {
            // First deposit sets the ratio
            return true;
        }

        let lhs = a1 * b2;
        let rhs = a2 * b1;
        let deviation = if lhs > rhs { lhs - rhs } else { rhs - lhs };
        deviation * U256::from(PARAMETER_SCALE_FACTOR) <= U256::from(self.0) * rhs
    }
}

impl Default for SlippageTolerance {
    fn default() -> Self {
        Self::from_config(&SlippageConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::PoolKind;

    fn pool() -> PoolSnapshot {
        PoolSnapshot::builder(PoolKind::ConstantProduct { fee_bps: 30 }, 1, 2)
            .balances(1_000_000, 2_000_000)
            .lp_circulation(1_000_000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_bounds() {
        let one_percent = SlippageTolerance::new(10_000);
        assert_eq!(one_percent.min_amount_out(19_753), 19_555);
        assert_eq!(one_percent.max_amount_in(9_999), 10_099);
        assert_eq!(SlippageTolerance::new(0).min_amount_out(500), 500);
        assert_eq!(SlippageTolerance::new(5_000_000).scaled(), PARAMETER_SCALE_FACTOR);
    }

    #[test]
    fn test_min_amount_to_receive_uses_payout_side() {
        let snapshot = pool();
        let delta = BalanceDelta::new(&snapshot, -10_000, 19_753, 0, 0).unwrap();
        assert_eq!(SlippageTolerance::new(10_000).min_amount_to_receive(&delta), 19_555);
    }

    #[test]
    fn test_deposit_ratio_check() {
        let snapshot = pool();
        let tolerance = SlippageTolerance::new(10_000);
        assert!(tolerance.deposit_within_tolerance(&snapshot, 10_000, 20_000));
        assert!(tolerance.deposit_within_tolerance(&snapshot, 10_100, 20_000));
        assert!(!tolerance.deposit_within_tolerance(&snapshot, 10_300, 20_000));
    }

    #[test]
    fn test_default_matches_config() {
        assert_eq!(SlippageTolerance::default().scaled(), 10_000);
    }
}

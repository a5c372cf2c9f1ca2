//! Immutable point-in-time view of one pool's on-chain state
//!
//! A snapshot is built once from a chain read and never mutated; a fresh
//! read produces a fresh snapshot. Construction is the only place the
//! canonical asset ordering and the fee bounds are checked.

use crate::amplification::AmplificationSchedule;
use crate::balance_delta::BalanceDelta;
use crate::error::{QuoteError, Result};
use algofi_config::{fees, FeeTierConfig, PoolType, PARAMETER_SCALE_FACTOR};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Curve a pool prices with; fixed for the pool's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolKind {
    /// `x * y = k` with the fee tier in basis points
    ConstantProduct { fee_bps: u32 },
    /// Two-coin StableSwap with a ramped amplification factor
    Stableswap { amplification: AmplificationSchedule },
}

impl PoolKind {
    /// Kind of the pools deployed under a given tier
    ///
    /// Stableswap tiers need the amplification ramp read from the pool.
    pub fn from_pool_type(
        pool_type: PoolType,
        amplification: Option<AmplificationSchedule>,
    ) -> Result<Self> {
        if pool_type.is_stableswap() {
            let amplification = amplification.ok_or_else(|| {
                QuoteError::invalid_config(format!(
                    "{} pool requires an amplification schedule",
                    pool_type
                ))
            })?;
            Ok(PoolKind::Stableswap { amplification })
        } else {
            Ok(PoolKind::ConstantProduct {
                fee_bps: pool_type.fee_bps(),
            })
        }
    }

    pub fn is_stableswap(&self) -> bool {
        matches!(self, PoolKind::Stableswap { .. })
    }
}

/// One side of a two-asset pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolSide {
    Asset1,
    Asset2,
}

impl PoolSide {
    /// Coin index used by the stableswap solver
    pub const fn index(self) -> usize {
        match self {
            PoolSide::Asset1 => 0,
            PoolSide::Asset2 => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            PoolSide::Asset1 => PoolSide::Asset2,
            PoolSide::Asset2 => PoolSide::Asset1,
        }
    }
}

/// Reserves and parameters of one pool at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PoolSnapshotFields")]
pub struct PoolSnapshot {
    pool_kind: PoolKind,
    asset1_id: u64,
    asset2_id: u64,
    asset1_balance: u64,
    asset2_balance: u64,
    lp_circulation: u64,
    swap_fee: u64,
    flash_loan_fee: u64,
    max_flash_loan_ratio: u64,
    current_time: u64,
}

/// Unvalidated field set; deserialization goes through [`PoolSnapshot::try_from`]
#[derive(Debug, Clone, Deserialize)]
struct PoolSnapshotFields {
    pool_kind: PoolKind,
    asset1_id: u64,
    asset2_id: u64,
    asset1_balance: u64,
    asset2_balance: u64,
    lp_circulation: u64,
    swap_fee: u64,
    #[serde(default = "default_flash_loan_fee")]
    flash_loan_fee: u64,
    #[serde(default = "default_max_flash_loan_ratio")]
    max_flash_loan_ratio: u64,
    #[serde(default)]
    current_time: u64,
}

fn default_flash_loan_fee() -> u64 {
    fees::DEFAULT_FLASH_LOAN_FEE
}

fn default_max_flash_loan_ratio() -> u64 {
    fees::DEFAULT_MAX_FLASH_LOAN_RATIO
}

impl TryFrom<PoolSnapshotFields> for PoolSnapshot {
    type Error = QuoteError;

    fn try_from(fields: PoolSnapshotFields) -> Result<Self> {
        let snapshot = PoolSnapshot {
            pool_kind: fields.pool_kind,
            asset1_id: fields.asset1_id,
            asset2_id: fields.asset2_id,
            asset1_balance: fields.asset1_balance,
            asset2_balance: fields.asset2_balance,
            lp_circulation: fields.lp_circulation,
            swap_fee: fields.swap_fee,
            flash_loan_fee: fields.flash_loan_fee,
            max_flash_loan_ratio: fields.max_flash_loan_ratio,
            current_time: fields.current_time,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl PoolSnapshot {
    /// Start building a snapshot for the canonical pair `asset1_id < asset2_id`
    pub fn builder(pool_kind: PoolKind, asset1_id: u64, asset2_id: u64) -> PoolSnapshotBuilder {
        PoolSnapshotBuilder::new(pool_kind, asset1_id, asset2_id)
    }

    /// Start building a snapshot for a deployed pool tier, taking the swap fee
    /// from the tier table
    pub fn for_pool_type(
        pool_type: PoolType,
        amplification: Option<AmplificationSchedule>,
        fee_tiers: &FeeTierConfig,
        asset1_id: u64,
        asset2_id: u64,
    ) -> Result<PoolSnapshotBuilder> {
        let kind = PoolKind::from_pool_type(pool_type, amplification)?;
        Ok(PoolSnapshotBuilder::new(kind, asset1_id, asset2_id).swap_fee(fee_tiers.swap_fee(pool_type)))
    }

    fn validate(&self) -> Result<()> {
        if self.asset1_id >= self.asset2_id {
            warn!(
                "Rejecting pool with asset ids {} and {}",
                self.asset1_id, self.asset2_id
            );
            return Err(QuoteError::invalid_config(format!(
                "asset1_id {} must be less than asset2_id {}",
                self.asset1_id, self.asset2_id
            )));
        }
        if self.swap_fee >= PARAMETER_SCALE_FACTOR {
            return Err(QuoteError::invalid_config(format!(
                "swap fee {} must be below {}",
                self.swap_fee, PARAMETER_SCALE_FACTOR
            )));
        }
        if self.flash_loan_fee >= PARAMETER_SCALE_FACTOR {
            return Err(QuoteError::invalid_config(format!(
                "flash loan fee {} must be below {}",
                self.flash_loan_fee, PARAMETER_SCALE_FACTOR
            )));
        }
        if self.max_flash_loan_ratio > PARAMETER_SCALE_FACTOR {
            return Err(QuoteError::invalid_config(format!(
                "max flash loan ratio {} exceeds {}",
                self.max_flash_loan_ratio, PARAMETER_SCALE_FACTOR
            )));
        }
        Ok(())
    }

    pub fn pool_kind(&self) -> PoolKind {
        self.pool_kind
    }

    pub fn asset1_id(&self) -> u64 {
        self.asset1_id
    }

    pub fn asset2_id(&self) -> u64 {
        self.asset2_id
    }

    pub fn asset1_balance(&self) -> u64 {
        self.asset1_balance
    }

    pub fn asset2_balance(&self) -> u64 {
        self.asset2_balance
    }

    pub fn lp_circulation(&self) -> u64 {
        self.lp_circulation
    }

    /// Swap fee scaled by `PARAMETER_SCALE_FACTOR`
    pub fn swap_fee(&self) -> u64 {
        self.swap_fee
    }

    /// Flash loan fee scaled by `PARAMETER_SCALE_FACTOR`
    pub fn flash_loan_fee(&self) -> u64 {
        self.flash_loan_fee
    }

    /// Max share of a reserve one flash loan may take, scaled by `PARAMETER_SCALE_FACTOR`
    pub fn max_flash_loan_ratio(&self) -> u64 {
        self.max_flash_loan_ratio
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    pub fn is_empty(&self) -> bool {
        self.lp_circulation == 0
    }

    /// Effective amplification factor at `current_time`; `None` for constant product pools
    pub fn amplification_factor(&self) -> Option<u64> {
        match self.pool_kind {
            PoolKind::Stableswap { amplification } => Some(amplification.factor_at(self.current_time)),
            PoolKind::ConstantProduct { .. } => None,
        }
    }

    /// Which side of the pool `asset_id` is on
    pub fn side_of(&self, asset_id: u64) -> Result<PoolSide> {
        if asset_id == self.asset1_id {
            Ok(PoolSide::Asset1)
        } else if asset_id == self.asset2_id {
            Ok(PoolSide::Asset2)
        } else {
            Err(QuoteError::UnknownAsset { asset_id })
        }
    }

    pub fn balance(&self, side: PoolSide) -> u64 {
        match side {
            PoolSide::Asset1 => self.asset1_balance,
            PoolSide::Asset2 => self.asset2_balance,
        }
    }

    pub fn balances(&self) -> [u64; 2] {
        [self.asset1_balance, self.asset2_balance]
    }

    /// Price of `asset_id` in base units of the other asset
    pub fn price(&self, asset_id: u64) -> Result<Decimal> {
        let side = self.side_of(asset_id)?;
        let own = self.balance(side);
        let other = self.balance(side.other());
        Decimal::from(other)
            .checked_div(Decimal::from(own))
            .ok_or(QuoteError::DivisionByZero {
                context: "pool price against a drained reserve",
            })
    }

    /// Price of `asset_id` in whole units of the other asset
    ///
    /// Scales [`PoolSnapshot::price`] by `10^(own_decimals - other_decimals)`.
    pub fn price_with_decimals(
        &self,
        asset_id: u64,
        asset1_decimals: u32,
        asset2_decimals: u32,
    ) -> Result<Decimal> {
        let side = self.side_of(asset_id)?;
        let base = self.price(asset_id)?;
        let (own, other) = match side {
            PoolSide::Asset1 => (asset1_decimals, asset2_decimals),
            PoolSide::Asset2 => (asset2_decimals, asset1_decimals),
        };

        let scale = |exp: u32| {
            10u64
                .checked_pow(exp)
                .map(Decimal::from)
                .ok_or(QuoteError::Arithmetic {
                    context: "decimal scaling",
                })
        };

        if own >= other {
            base.checked_mul(scale(own - other)?)
                .ok_or(QuoteError::Arithmetic {
                    context: "decimal scaling",
                })
        } else {
            base.checked_div(scale(other - own)?)
                .ok_or(QuoteError::Arithmetic {
                    context: "decimal scaling",
                })
        }
    }

    /// Snapshot the pool would have after `delta` executed at this snapshot's state
    pub fn after(&self, delta: &BalanceDelta) -> Result<PoolSnapshot> {
        let apply = |balance: u64, change: i128, context: &'static str| {
            // Negative deltas are paid into the pool
            u64::try_from(i128::from(balance) - change).map_err(|_| QuoteError::Arithmetic { context })
        };
        let next = PoolSnapshot {
            asset1_balance: apply(self.asset1_balance, delta.asset1_delta, "asset1 balance")?,
            asset2_balance: apply(self.asset2_balance, delta.asset2_delta, "asset2 balance")?,
            lp_circulation: u64::try_from(i128::from(self.lp_circulation) + delta.lp_delta)
                .map_err(|_| QuoteError::Arithmetic {
                    context: "lp circulation",
                })?,
            ..self.clone()
        };
        Ok(next)
    }
}

/// Builder for [`PoolSnapshot`]
#[derive(Debug, Clone)]
pub struct PoolSnapshotBuilder {
    snapshot: PoolSnapshot,
}

impl PoolSnapshotBuilder {
    fn new(pool_kind: PoolKind, asset1_id: u64, asset2_id: u64) -> Self {
        let swap_fee = match pool_kind {
            PoolKind::ConstantProduct { fee_bps } => u64::from(fee_bps) * 100,
            PoolKind::Stableswap { .. } => FeeTierConfig::default().nanoswap,
        };
        Self {
            snapshot: PoolSnapshot {
                pool_kind,
                asset1_id,
                asset2_id,
                asset1_balance: 0,
                asset2_balance: 0,
                lp_circulation: 0,
                swap_fee,
                flash_loan_fee: fees::DEFAULT_FLASH_LOAN_FEE,
                max_flash_loan_ratio: fees::DEFAULT_MAX_FLASH_LOAN_RATIO,
                current_time: 0,
            },
        }
    }

    pub fn balances(mut self, asset1_balance: u64, asset2_balance: u64) -> Self {
        self.snapshot.asset1_balance = asset1_balance;
        self.snapshot.asset2_balance = asset2_balance;
        self
    }

    pub fn lp_circulation(mut self, lp_circulation: u64) -> Self {
        self.snapshot.lp_circulation = lp_circulation;
        self
    }

    /// Swap fee scaled by `PARAMETER_SCALE_FACTOR` (2_500 = 0.25%)
    pub fn swap_fee(mut self, swap_fee: u64) -> Self {
        self.snapshot.swap_fee = swap_fee;
        self
    }

    pub fn flash_loan_fee(mut self, flash_loan_fee: u64) -> Self {
        self.snapshot.flash_loan_fee = flash_loan_fee;
        self
    }

    pub fn max_flash_loan_ratio(mut self, max_flash_loan_ratio: u64) -> Self {
        self.snapshot.max_flash_loan_ratio = max_flash_loan_ratio;
        self
    }

    /// Chain time (seconds) the snapshot was read at
    pub fn current_time(mut self, current_time: u64) -> Self {
        self.snapshot.current_time = current_time;
        self
    }

    pub fn build(self) -> Result<PoolSnapshot> {
        self.snapshot.validate()?;
        Ok(self.snapshot)
    }
}

//! Signed outcome of a quoted pool operation
//!
//! Asset deltas use the pool contract's convention: negative is paid into
//! the pool by the caller, positive is paid out to the caller. Applying a
//! delta gives `new_balance = balance - delta`.

use crate::error::{QuoteError, Result};
use crate::snapshot::PoolSnapshot;
use algofi_config::ComputeBudgetConfig;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quote result shared by every operation and pool kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub asset1_delta: i128,
    pub asset2_delta: i128,
    /// LP tokens minted (positive) or burned (negative)
    pub lp_delta: i128,
    /// Sum of the final iteration indices of every solver run; zero for constant product
    pub iteration_count: u32,
    /// Absolute relative change in the asset1/asset2 ratio caused by the quote
    pub price_delta: Decimal,
    /// Asset1 left unpooled when a pair deposit is off the pool ratio
    #[serde(default)]
    pub asset1_residual: u64,
    /// Asset2 left unpooled when a pair deposit is off the pool ratio
    #[serde(default)]
    pub asset2_residual: u64,
}

impl BalanceDelta {
    /// Delta with `price_delta` measured against `snapshot`
    ///
    /// Swaps and pool quotes on a non-empty pool carry a price change;
    /// burns (`lp_delta < 0`) and bootstrap deposits report zero.
    ///
    /// A delta that would empty either reserve is `InsufficientLiquidity`,
    /// and a price change too large for `Decimal` is `Arithmetic`.
    pub fn new(
        snapshot: &PoolSnapshot,
        asset1_delta: i128,
        asset2_delta: i128,
        lp_delta: i128,
        iteration_count: u32,
    ) -> Result<Self> {
        let price_delta = if lp_delta >= 0 && !snapshot.is_empty() {
            pool_price_delta(snapshot, asset1_delta, asset2_delta)?
        } else {
            Decimal::ZERO
        };

        Ok(Self {
            asset1_delta,
            asset2_delta,
            lp_delta,
            iteration_count,
            price_delta,
            asset1_residual: 0,
            asset2_residual: 0,
        })
    }

    pub fn with_residual(mut self, asset1_residual: u64, asset2_residual: u64) -> Self {
        self.asset1_residual = asset1_residual;
        self.asset2_residual = asset2_residual;
        self
    }

    /// Amount the caller pays in for `asset_delta`, zero if the pool pays out
    pub fn paid_in(asset_delta: i128) -> u64 {
        if asset_delta < 0 {
            u64::try_from(asset_delta.unsigned_abs()).unwrap_or(u64::MAX)
        } else {
            0
        }
    }

    /// Amount the caller receives for `asset_delta`, zero if paid in
    pub fn paid_out(asset_delta: i128) -> u64 {
        if asset_delta > 0 {
            u64::try_from(asset_delta).unwrap_or(u64::MAX)
        } else {
            0
        }
    }

    /// Fee (microalgos) for the extra opcode budget the stableswap solver
    /// iterations need on chain
    ///
    /// `floor(iterations * cost_per_iteration / budget_per_call) * min_txn_fee`
    pub fn extra_compute_fee(&self, compute: &ComputeBudgetConfig) -> Result<u64> {
        if compute.opcode_budget_per_call == 0 {
            return Err(QuoteError::DivisionByZero {
                context: "opcode budget per call",
            });
        }
        let calls = u64::from(self.iteration_count) * compute.opcode_cost_per_iteration
            / compute.opcode_budget_per_call;
        calls
            .checked_mul(compute.min_txn_fee)
            .ok_or(QuoteError::Arithmetic {
                context: "extra compute fee",
            })
    }
}

/// Largest scale a `Decimal` carries
const MAX_DECIMAL_SCALE: u32 = 28;

/// `|(b1 / b2) / (b1' / b2') - 1|` where the primes are post-quote balances
///
/// Evaluated as `|b1 * b2' - b2 * b1'| / (b2 * b1')` in `U256` with a
/// single conversion of the quotient.
fn pool_price_delta(
    snapshot: &PoolSnapshot,
    asset1_delta: i128,
    asset2_delta: i128,
) -> Result<Decimal> {
    let b1 = snapshot.asset1_balance();
    let b2 = snapshot.asset2_balance();
    if b1 == 0 || b2 == 0 {
        return Err(QuoteError::DivisionByZero {
            context: "pool price",
        });
    }
    let n1 = post_balance(b1, asset1_delta)?;
    let n2 = post_balance(b2, asset2_delta)?;

    let before = U256::from(b1) * U256::from(n2);
    let after = U256::from(b2) * U256::from(n1);
    let change = if before > after {
        before - after
    } else {
        after - before
    };
    ratio_to_decimal(change, after)
}

/// Balance after applying `delta`; must stay positive
fn post_balance(balance: u64, delta: i128) -> Result<u128> {
    let remaining = i128::from(balance).checked_sub(delta).ok_or(QuoteError::Arithmetic {
        context: "post-quote balance",
    })?;
    match u128::try_from(remaining) {
        Ok(remaining) if remaining > 0 => Ok(remaining),
        _ => Err(QuoteError::InsufficientLiquidity {
            requested: u64::try_from(delta.unsigned_abs()).unwrap_or(u64::MAX),
            available: balance,
        }),
    }
}

/// `numerator / denominator` at the finest scale whose mantissa fits 96 bits
fn ratio_to_decimal(numerator: U256, denominator: U256) -> Result<Decimal> {
    let mantissa_limit = U256::one() << 96;
    for scale in (0..=MAX_DECIMAL_SCALE).rev() {
        let Some(scaled) = numerator.checked_mul(U256::exp10(scale as usize)) else {
            continue;
        };
        let mantissa = scaled / denominator;
        if mantissa < mantissa_limit {
            return Decimal::try_from_i128_with_scale(mantissa.low_u128() as i128, scale)
                .map(|value| value.normalize())
                .map_err(|_| QuoteError::Arithmetic {
                    context: "price delta",
                });
        }
    }
    Err(QuoteError::Arithmetic {
        context: "price delta",
    })
}

//! Quote engine: pool, burn, swap and flash loan quotes against one snapshot
//!
//! Every quote is a pure function of the snapshot and its arguments. The
//! engine never touches chain state and never retries; a failed quote is
//! reported through [`QuoteError`] and nothing else.

use crate::balance_delta::BalanceDelta;
use crate::constant_product::ConstantProductMath;
use crate::error::{QuoteError, Result};
use crate::fees::{amount_less_fee, gross_up_for_fee};
use crate::pool_traits::with_curve;
use crate::snapshot::{PoolSide, PoolSnapshot};
use algofi_config::PARAMETER_SCALE_FACTOR;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assets offered to a pool quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolDeposit {
    /// One asset; the counter amount is matched at the pool ratio
    Single { asset_id: u64, amount: u64 },
    /// Both assets; the side in excess of the pool ratio is left as residual
    Pair { asset1_amount: u64, asset2_amount: u64 },
}

/// Repayment owed for a flash loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashLoanQuote {
    pub asset_id: u64,
    pub amount: u64,
    pub fee: u64,
    /// `amount + fee + 1`, repaid in the same group
    pub repayment: u64,
}

/// Stateless quoting over a borrowed snapshot
#[derive(Debug, Clone, Copy)]
pub struct QuoteEngine<'a> {
    snapshot: &'a PoolSnapshot,
}

impl<'a> QuoteEngine<'a> {
    pub fn new(snapshot: &'a PoolSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &'a PoolSnapshot {
        self.snapshot
    }

    /// Quote a liquidity deposit
    ///
    /// An empty pool can only be bootstrapped with [`PoolDeposit::Pair`];
    /// LP issued is then `sqrt(a1 * a2)` for constant product pools and `D`
    /// for stableswap pools.
    pub fn quote_pool(&self, deposit: PoolDeposit) -> Result<BalanceDelta> {
        let snapshot = self.snapshot;
        debug!("Quoting pool {:?} on {:?}", deposit, snapshot.pool_kind());

        if snapshot.is_empty() {
            let PoolDeposit::Pair {
                asset1_amount,
                asset2_amount,
            } = deposit
            else {
                return Err(QuoteError::EmptyPool);
            };
            let (lp, iterations) =
                with_curve(snapshot, |curve| curve.bootstrap_lp(asset1_amount, asset2_amount))?;
            return BalanceDelta::new(
                snapshot,
                -i128::from(asset1_amount),
                -i128::from(asset2_amount),
                signed(lp, "LP issued")?,
                iterations,
            );
        }

        let (asset1_amount, asset2_amount, residual) = self.match_deposit(deposit)?;
        let (lp, iterations) =
            with_curve(snapshot, |curve| curve.deposit_lp(snapshot, asset1_amount, asset2_amount))?;

        Ok(BalanceDelta::new(
            snapshot,
            -signed(asset1_amount, "pooled asset1")?,
            -signed(asset2_amount, "pooled asset2")?,
            signed(lp, "LP issued")?,
            iterations,
        )?
        .with_residual(residual[0], residual[1]))
    }

    /// Quote burning `lp_amount` LP tokens for a proportional share of both reserves
    pub fn quote_burn(&self, lp_amount: u64) -> Result<BalanceDelta> {
        let snapshot = self.snapshot;
        debug!("Quoting burn of {} LP", lp_amount);
        self.require_liquidity()?;
        if lp_amount > snapshot.lp_circulation() {
            return Err(QuoteError::InsufficientLiquidity {
                requested: lp_amount,
                available: snapshot.lp_circulation(),
            });
        }

        let lp_circulation = snapshot.lp_circulation();
        let asset1 =
            ConstantProductMath::burn_share(lp_amount, snapshot.asset1_balance(), lp_circulation)?;
        let asset2 =
            ConstantProductMath::burn_share(lp_amount, snapshot.asset2_balance(), lp_circulation)?;

        BalanceDelta::new(
            snapshot,
            i128::from(asset1),
            i128::from(asset2),
            -i128::from(lp_amount),
            0,
        )
    }

    /// Quote swapping exactly `amount_in` of `asset_in_id` for the other asset
    ///
    /// A swap that would pay out the entire opposite reserve is
    /// `InsufficientLiquidity`.
    pub fn quote_swap_exact_for(&self, asset_in_id: u64, amount_in: u64) -> Result<BalanceDelta> {
        let snapshot = self.snapshot;
        debug!("Quoting swap of exactly {} of asset {}", amount_in, asset_in_id);
        self.require_liquidity()?;
        let input_side = snapshot.side_of(asset_in_id)?;

        let input_less_fee = amount_less_fee(amount_in, snapshot.swap_fee());
        let (output, iterations) =
            with_curve(snapshot, |curve| curve.swap_output(snapshot, input_side, input_less_fee))?;

        let paid_in = -i128::from(amount_in);
        let paid_out = signed(output, "swap output")?;
        self.swap_delta(input_side, paid_in, paid_out, iterations)
    }

    /// Quote the input needed to receive exactly `amount_out` of `asset_out_id`
    ///
    /// The contract subtracts one from the required input, so tiny outputs
    /// can need no input at all. Such a quote would be rejected on chain and
    /// is reported as `AmountTooSmall` instead.
    pub fn quote_swap_for_exact(&self, asset_out_id: u64, amount_out: u64) -> Result<BalanceDelta> {
        let snapshot = self.snapshot;
        debug!("Quoting swap for exactly {} of asset {}", amount_out, asset_out_id);
        self.require_liquidity()?;
        let output_side = snapshot.side_of(asset_out_id)?;
        let available = snapshot.balance(output_side);
        if amount_out >= available {
            return Err(QuoteError::InsufficientLiquidity {
                requested: amount_out,
                available,
            });
        }

        let (input_less_fee, iterations) = with_curve(snapshot, |curve| {
            curve.swap_input_less_fee(snapshot, output_side, amount_out)
        })?;
        let amount_in = gross_up_for_fee(input_less_fee, snapshot.swap_fee())?;
        if amount_in == 0 {
            return Err(QuoteError::AmountTooSmall { amount: amount_out });
        }

        let paid_in = -signed(amount_in, "swap input")?;
        let paid_out = i128::from(amount_out);
        self.swap_delta(output_side.other(), paid_in, paid_out, iterations)
    }

    /// Quote the repayment of a flash loan of `amount` of `asset_id`
    ///
    /// The manager caps a single loan at `max_flash_loan_ratio` of the reserve.
    pub fn quote_flash_loan(&self, asset_id: u64, amount: u64) -> Result<FlashLoanQuote> {
        let snapshot = self.snapshot;
        self.require_liquidity()?;
        let side = snapshot.side_of(asset_id)?;

        let scale = u128::from(PARAMETER_SCALE_FACTOR);
        let limit = u128::from(snapshot.balance(side)) * u128::from(snapshot.max_flash_loan_ratio())
            / scale;
        // limit <= balance since the ratio is at most the scale
        let limit = limit as u64;
        if amount > limit {
            return Err(QuoteError::InsufficientLiquidity {
                requested: amount,
                available: limit,
            });
        }

        let fee = u128::from(amount) * u128::from(snapshot.flash_loan_fee()) / scale;
        let fee = fee as u64;
        let repayment = amount
            .checked_add(fee)
            .and_then(|v| v.checked_add(1))
            .ok_or(QuoteError::Arithmetic {
                context: "flash loan repayment",
            })?;
        debug!(
            "Flash loan of {} asset {} repays {}",
            amount, asset_id, repayment
        );

        Ok(FlashLoanQuote {
            asset_id,
            amount,
            fee,
            repayment,
        })
    }

    fn require_liquidity(&self) -> Result<()> {
        if self.snapshot.is_empty() {
            return Err(QuoteError::EmptyPool);
        }
        Ok(())
    }

    /// Amounts actually pooled plus the per-asset residual
    fn match_deposit(&self, deposit: PoolDeposit) -> Result<(u128, u128, [u64; 2])> {
        let snapshot = self.snapshot;
        let b1 = snapshot.asset1_balance();
        let b2 = snapshot.asset2_balance();

        match deposit {
            PoolDeposit::Single { asset_id, amount } => {
                match snapshot.side_of(asset_id)? {
                    PoolSide::Asset1 => {
                        let matched = ConstantProductMath::matching_deposit(amount, b1, b2)?;
                        Ok((u128::from(amount), matched, [0, 0]))
                    }
                    PoolSide::Asset2 => {
                        let matched = ConstantProductMath::matching_deposit(amount, b2, b1)?;
                        Ok((matched, u128::from(amount), [0, 0]))
                    }
                }
            }
            PoolDeposit::Pair {
                asset1_amount,
                asset2_amount,
            } => {
                let needed2 = ConstantProductMath::matching_deposit(asset1_amount, b1, b2)?;
                if needed2 <= u128::from(asset2_amount) {
                    // needed2 <= asset2_amount fits in u64
                    let residual2 = asset2_amount - needed2 as u64;
                    Ok((u128::from(asset1_amount), needed2, [0, residual2]))
                } else {
                    let needed1 = ConstantProductMath::matching_deposit(asset2_amount, b2, b1)?;
                    // needed2 > asset2_amount implies needed1 <= asset1_amount
                    let residual1 = u128::from(asset1_amount).saturating_sub(needed1) as u64;
                    let pooled1 = needed1.min(u128::from(asset1_amount));
                    Ok((pooled1, u128::from(asset2_amount), [residual1, 0]))
                }
            }
        }
    }

    fn swap_delta(
        &self,
        input_side: PoolSide,
        paid_in: i128,
        paid_out: i128,
        iterations: u32,
    ) -> Result<BalanceDelta> {
        let (asset1_delta, asset2_delta) = match input_side {
            PoolSide::Asset1 => (paid_in, paid_out),
            PoolSide::Asset2 => (paid_out, paid_in),
        };
        BalanceDelta::new(self.snapshot, asset1_delta, asset2_delta, 0, iterations)
    }
}

fn signed(amount: u128, context: &'static str) -> Result<i128> {
    i128::try_from(amount).map_err(|_| QuoteError::Arithmetic { context })
}

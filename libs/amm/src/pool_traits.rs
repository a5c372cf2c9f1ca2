//! Curve trait definitions for a unified pricing interface
//!
//! The quote engine does the fee handling, side lookup and sign convention
//! once; each curve only answers the four pricing questions below.

use crate::constant_product::ConstantProductMath;
use crate::error::{QuoteError, Result};
use crate::snapshot::{PoolKind, PoolSide, PoolSnapshot};
use crate::stableswap::{SolverResult, StableswapMath};
use primitive_types::U256;

/// Pricing primitives of one invariant family
///
/// Every method returns `(amount, iterations)`; curves without an iterative
/// solver report zero iterations.
pub trait PoolCurve {
    /// LP tokens minted by the first deposit into an empty pool
    fn bootstrap_lp(&self, asset1_amount: u64, asset2_amount: u64) -> Result<SolverResult>;

    /// LP tokens minted by a deposit already matched to the pool ratio
    fn deposit_lp(
        &self,
        snapshot: &PoolSnapshot,
        asset1_amount: u128,
        asset2_amount: u128,
    ) -> Result<SolverResult>;

    /// Output of the other asset for an input whose fee is already removed
    fn swap_output(
        &self,
        snapshot: &PoolSnapshot,
        input_side: PoolSide,
        input_less_fee: u64,
    ) -> Result<SolverResult>;

    /// Input, before fee gross-up, that buys exactly `output` of `output_side`
    fn swap_input_less_fee(
        &self,
        snapshot: &PoolSnapshot,
        output_side: PoolSide,
        output: u64,
    ) -> Result<SolverResult>;
}

/// `x * y = k` pricing
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantProductCurve;

impl PoolCurve for ConstantProductCurve {
    fn bootstrap_lp(&self, asset1_amount: u64, asset2_amount: u64) -> Result<SolverResult> {
        let lp = ConstantProductMath::empty_pool_lp_issued(asset1_amount, asset2_amount);
        Ok((u128::from(lp), 0))
    }

    fn deposit_lp(
        &self,
        snapshot: &PoolSnapshot,
        asset1_amount: u128,
        _asset2_amount: u128,
    ) -> Result<SolverResult> {
        let lp = ConstantProductMath::lp_issued(
            asset1_amount,
            snapshot.asset1_balance(),
            snapshot.lp_circulation(),
        )?;
        Ok((lp, 0))
    }

    fn swap_output(
        &self,
        snapshot: &PoolSnapshot,
        input_side: PoolSide,
        input_less_fee: u64,
    ) -> Result<SolverResult> {
        let output = ConstantProductMath::output_for_exact_input(
            input_less_fee,
            snapshot.balance(input_side),
            snapshot.balance(input_side.other()),
        )?;
        Ok((u128::from(output), 0))
    }

    fn swap_input_less_fee(
        &self,
        snapshot: &PoolSnapshot,
        output_side: PoolSide,
        output: u64,
    ) -> Result<SolverResult> {
        let input = ConstantProductMath::input_less_fee_for_exact_output(
            output,
            snapshot.balance(output_side.other()),
            snapshot.balance(output_side),
        )?;
        Ok((input, 0))
    }
}

/// StableSwap pricing at a fixed effective amplification factor
#[derive(Debug, Clone, Copy)]
pub struct StableswapCurve {
    amplification: u64,
}

impl StableswapCurve {
    /// `amplification` is the effective factor, scaled by `A_PRECISION`
    pub fn new(amplification: u64) -> Self {
        Self { amplification }
    }

    fn balances(snapshot: &PoolSnapshot) -> [u128; 2] {
        snapshot.balances().map(u128::from)
    }
}

impl PoolCurve for StableswapCurve {
    fn bootstrap_lp(&self, asset1_amount: u64, asset2_amount: u64) -> Result<SolverResult> {
        StableswapMath::get_d(
            [u128::from(asset1_amount), u128::from(asset2_amount)],
            self.amplification,
        )
    }

    fn deposit_lp(
        &self,
        snapshot: &PoolSnapshot,
        asset1_amount: u128,
        asset2_amount: u128,
    ) -> Result<SolverResult> {
        let balances = Self::balances(snapshot);
        let (d0, first) = StableswapMath::get_d(balances, self.amplification)?;
        let (d1, second) = StableswapMath::get_d(
            [balances[0] + asset1_amount, balances[1] + asset2_amount],
            self.amplification,
        )?;
        if d0 == 0 {
            return Err(QuoteError::DivisionByZero {
                context: "LP issuance against a zero invariant",
            });
        }

        // lp_circulation * (D1 - D0) / D0
        let growth = d1.checked_sub(d0).ok_or(QuoteError::Arithmetic {
            context: "stableswap invariant decreased on deposit",
        })?;
        let lp = U256::from(snapshot.lp_circulation()) * U256::from(growth) / U256::from(d0);
        if lp > U256::from(u128::MAX) {
            return Err(QuoteError::Arithmetic {
                context: "stableswap LP issuance",
            });
        }
        Ok((lp.low_u128(), first + second))
    }

    fn swap_output(
        &self,
        snapshot: &PoolSnapshot,
        input_side: PoolSide,
        input_less_fee: u64,
    ) -> Result<SolverResult> {
        let balances = Self::balances(snapshot);
        let i = input_side.index();
        let j = input_side.other().index();

        let (d, d_iterations) = StableswapMath::get_d(balances, self.amplification)?;
        let x = balances[i] + u128::from(input_less_fee);
        let (y, y_iterations) = StableswapMath::get_y(i, j, x, balances, d, self.amplification)?;

        if y == 0 {
            let available = snapshot.balance(input_side.other());
            return Err(QuoteError::InsufficientLiquidity {
                requested: available,
                available,
            });
        }
        // A zero input can land y one unit above the reserve; pay nothing then
        Ok((balances[j].saturating_sub(y), d_iterations + y_iterations))
    }

    fn swap_input_less_fee(
        &self,
        snapshot: &PoolSnapshot,
        output_side: PoolSide,
        output: u64,
    ) -> Result<SolverResult> {
        let available = snapshot.balance(output_side);
        if output >= available {
            return Err(QuoteError::InsufficientLiquidity {
                requested: output,
                available,
            });
        }

        let balances = Self::balances(snapshot);
        // The output coin's new balance is known; solve for the input coin
        let i = output_side.index();
        let j = output_side.other().index();

        let (d, d_iterations) = StableswapMath::get_d(balances, self.amplification)?;
        let x = balances[i] - u128::from(output);
        let (y, y_iterations) = StableswapMath::get_y(i, j, x, balances, d, self.amplification)?;

        Ok((y.saturating_sub(balances[j]), d_iterations + y_iterations))
    }
}

/// Run `f` against the curve matching the snapshot's pool kind
pub fn with_curve<T>(snapshot: &PoolSnapshot, f: impl FnOnce(&dyn PoolCurve) -> T) -> T {
    match snapshot.pool_kind() {
        PoolKind::ConstantProduct { .. } => f(&ConstantProductCurve),
        PoolKind::Stableswap { amplification } => {
            f(&StableswapCurve::new(amplification.factor_at(snapshot.current_time())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amplification::AmplificationSchedule;
    use crate::stableswap::A_PRECISION;

    #[test]
    fn test_constant_product_ignores_second_amount() {
        let snapshot = PoolSnapshot::builder(PoolKind::ConstantProduct { fee_bps: 30 }, 1, 2)
            .balances(1_000, 4_000)
            .lp_circulation(2_000)
            .build()
            .unwrap();
        let (lp, iterations) = ConstantProductCurve.deposit_lp(&snapshot, 100, 400).unwrap();
        assert_eq!(lp, 200);
        assert_eq!(iterations, 0);
    }

    #[test]
    fn test_stableswap_swap_close_to_par() {
        let snapshot = PoolSnapshot::builder(
            PoolKind::Stableswap {
                amplification: AmplificationSchedule::constant(100 * A_PRECISION),
            },
            312_769,
            31_566_704,
        )
        .balances(1_000_000_000, 1_000_000_000)
        .lp_circulation(2_000_000_000)
        .build()
        .unwrap();
        let curve = StableswapCurve::new(100 * A_PRECISION);
        let (out, _) = curve.swap_output(&snapshot, PoolSide::Asset1, 1_000_000).unwrap();
        assert!(out <= 1_000_000);
        assert!(out > 999_000);

        let (input, _) = curve
            .swap_input_less_fee(&snapshot, PoolSide::Asset2, 1_000_000)
            .unwrap();
        assert!(input >= 1_000_000);
        assert!(input < 1_001_000);
    }

    #[test]
    fn test_stableswap_output_exceeding_reserve() {
        let snapshot = PoolSnapshot::builder(
            PoolKind::Stableswap {
                amplification: AmplificationSchedule::constant(100 * A_PRECISION),
            },
            1,
            2,
        )
        .balances(500, 500)
        .lp_circulation(1_000)
        .build()
        .unwrap();
        let err = StableswapCurve::new(100 * A_PRECISION)
            .swap_input_less_fee(&snapshot, PoolSide::Asset2, 500)
            .unwrap_err();
        assert_eq!(
            err,
            QuoteError::InsufficientLiquidity {
                requested: 500,
                available: 500
            }
        );
    }
}

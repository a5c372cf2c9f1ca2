//! Constant product (x*y=k) pool math with exact integer calculations
//!
//! Every formula floors exactly as the pool contract does, so a quote is
//! the amount the contract will compute for the same reserves.

use crate::error::{QuoteError, Result};

/// Constant product AMM math functions
pub struct ConstantProductMath;

impl ConstantProductMath {
    /// LP tokens issued when bootstrapping an empty pool
    ///
    /// `floor(sqrt(asset1_amount * asset2_amount))`. When the product would not
    /// fit in 64 bits the contract takes `floor(sqrt(a1)) * floor(sqrt(a2))`
    /// instead, and so do we: the result can be slightly lower than the exact
    /// root but it is what gets minted.
    pub fn empty_pool_lp_issued(asset1_amount: u64, asset2_amount: u64) -> u64 {
        let product = u128::from(asset1_amount) * u128::from(asset2_amount);
        if product > u128::from(u64::MAX) {
            integer_sqrt(u128::from(asset1_amount)) as u64
                * integer_sqrt(u128::from(asset2_amount)) as u64
        } else {
            integer_sqrt(product) as u64
        }
    }

    /// Counter-side amount matching a deposit at the current reserve ratio
    pub fn matching_deposit(amount: u64, reserve_same: u64, reserve_other: u64) -> Result<u128> {
        if reserve_same == 0 {
            return Err(QuoteError::DivisionByZero {
                context: "matching deposit against a drained reserve",
            });
        }
        Ok(u128::from(amount) * u128::from(reserve_other) / u128::from(reserve_same))
    }

    /// LP tokens issued for a proportional deposit into a non-empty pool
    pub fn lp_issued(asset1_amount: u128, asset1_balance: u64, lp_circulation: u64) -> Result<u128> {
        if asset1_balance == 0 {
            return Err(QuoteError::DivisionByZero {
                context: "LP issuance against a drained reserve",
            });
        }
        asset1_amount
            .checked_mul(u128::from(lp_circulation))
            .map(|v| v / u128::from(asset1_balance))
            .ok_or(QuoteError::Arithmetic {
                context: "LP issuance",
            })
    }

    /// Share of one reserve redeemed by burning `lp_amount`
    pub fn burn_share(lp_amount: u64, balance: u64, lp_circulation: u64) -> Result<u64> {
        if lp_circulation == 0 {
            return Err(QuoteError::EmptyPool);
        }
        let share = u128::from(lp_amount) * u128::from(balance) / u128::from(lp_circulation);
        // lp_amount <= lp_circulation keeps the share within the reserve
        u64::try_from(share).map_err(|_| QuoteError::Arithmetic {
            context: "burn share",
        })
    }

    /// Output for an exact input that has already had its fee removed
    ///
    /// `floor(balance_out * input_less_fee / (balance_in + input_less_fee))`
    pub fn output_for_exact_input(
        input_less_fee: u64,
        balance_in: u64,
        balance_out: u64,
    ) -> Result<u64> {
        let denominator = u128::from(balance_in) + u128::from(input_less_fee);
        if denominator == 0 {
            return Err(QuoteError::DivisionByZero {
                context: "constant product swap with empty reserves",
            });
        }
        let output = u128::from(balance_out) * u128::from(input_less_fee) / denominator;
        // output < balance_out
        Ok(output as u64)
    }

    /// Input (before fee gross-up) required for an exact output
    ///
    /// `floor(balance_in * output / (balance_out - output)) - 1`, clamped at
    /// zero. Outputs small enough that the quotient is 0 or 1 need no input
    /// at all by this formula; [`crate::QuoteEngine::quote_swap_for_exact`]
    /// rejects those as `AmountTooSmall`.
    pub fn input_less_fee_for_exact_output(
        output: u64,
        balance_in: u64,
        balance_out: u64,
    ) -> Result<u128> {
        if output >= balance_out {
            return Err(QuoteError::InsufficientLiquidity {
                requested: output,
                available: balance_out,
            });
        }
        let quotient = u128::from(balance_in) * u128::from(output) / u128::from(balance_out - output);
        Ok(quotient.saturating_sub(1))
    }
}

/// Floor of the square root using Newton's method
///
/// Starts at a power of two above the root and decreases monotonically, so
/// the first non-decreasing step marks the floor.
pub fn integer_sqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }

    let bits = 128 - value.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    let mut next_x = (x + value / x) / 2;
    while next_x < x {
        x = next_x;
        next_x = (x + value / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_sqrt_accuracy() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(15), 3);
        assert_eq!(integer_sqrt(16), 4);
        assert_eq!(integer_sqrt(17), 4);
        assert_eq!(integer_sqrt(u128::from(u64::MAX)), u128::from(u32::MAX));
        assert_eq!(integer_sqrt(u128::MAX), u128::from(u64::MAX));
    }

    #[test]
    fn test_empty_pool_lp() {
        assert_eq!(ConstantProductMath::empty_pool_lp_issued(1_000_000, 4_000_000), 2_000_000);
        // 2 * 3 = 6, sqrt floors to 2
        assert_eq!(ConstantProductMath::empty_pool_lp_issued(2, 3), 2);
    }

    #[test]
    fn test_empty_pool_lp_overflow_branch() {
        let a1 = 10_000_000_000_000u64;
        let a2 = 3_000_000_000_000u64;
        // a1 * a2 exceeds u64, so the roots are taken separately
        let expected = integer_sqrt(a1 as u128) as u64 * integer_sqrt(a2 as u128) as u64;
        assert_eq!(ConstantProductMath::empty_pool_lp_issued(a1, a2), expected);
        assert_eq!(expected, 3_162_277 * 1_732_050);
    }

    #[test]
    fn test_output_for_exact_input() {
        let output =
            ConstantProductMath::output_for_exact_input(9_975, 1_000_000, 2_000_000).unwrap();
        assert_eq!(output, 19_753);
    }

    #[test]
    fn test_input_for_exact_output() {
        // floor(1_000_000 * 19_753 / 1_980_247) - 1 = 9_975 - 1
        let input =
            ConstantProductMath::input_less_fee_for_exact_output(19_753, 1_000_000, 2_000_000)
                .unwrap();
        assert_eq!(input, 9_974);
    }

    #[test]
    fn test_exact_output_exceeding_reserve() {
        let err = ConstantProductMath::input_less_fee_for_exact_output(2_000_000, 1_000_000, 2_000_000)
            .unwrap_err();
        assert_eq!(
            err,
            QuoteError::InsufficientLiquidity {
                requested: 2_000_000,
                available: 2_000_000
            }
        );
    }

    #[test]
    fn test_burn_share() {
        assert_eq!(ConstantProductMath::burn_share(500_000, 2_000_000, 1_000_000).unwrap(), 1_000_000);
        assert_eq!(ConstantProductMath::burn_share(1, 2, 3).unwrap(), 0);
    }
}

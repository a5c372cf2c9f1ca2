//! Swap fee application
//!
//! Fees are integers scaled by `PARAMETER_SCALE_FACTOR` and are always taken
//! from the input side. Rounding goes in the pool's favor in both directions.

use crate::error::{QuoteError, Result};
use algofi_config::PARAMETER_SCALE_FACTOR;

/// Input amount left after the fee: `amount - ceil(amount * fee / scale)`
pub fn amount_less_fee(amount: u64, swap_fee: u64) -> u64 {
    let scale = u128::from(PARAMETER_SCALE_FACTOR);
    let fee = (u128::from(amount) * u128::from(swap_fee)).div_ceil(scale);
    // fee <= amount whenever swap_fee <= scale
    amount.saturating_sub(u64::try_from(fee).unwrap_or(u64::MAX))
}

/// Gross input needed so that `amount_less_fee` remains after the fee:
/// `ceil(amount_less_fee / (1 - fee))`
pub fn gross_up_for_fee(amount_less_fee: u128, swap_fee: u64) -> Result<u128> {
    let scale = u128::from(PARAMETER_SCALE_FACTOR);
    let retained = scale
        .checked_sub(u128::from(swap_fee))
        .filter(|r| *r > 0)
        .ok_or(QuoteError::DivisionByZero {
            context: "fee gross-up with a 100% swap fee",
        })?;

    amount_less_fee
        .checked_mul(scale)
        .map(|scaled| scaled.div_ceil(retained))
        .ok_or(QuoteError::Arithmetic {
            context: "fee gross-up",
        })
}

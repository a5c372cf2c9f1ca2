//! On-chain protocol constants
//!
//! Fixed-point scales and execution budgets the pool contracts use. Every
//! fractional parameter read from chain state (fees, slippage, flash loan
//! ratios) is an integer scaled by [`PARAMETER_SCALE_FACTOR`].

/// Scale for fractional pool parameters (1_000_000 = 100%)
pub const PARAMETER_SCALE_FACTOR: u64 = 1_000_000;

/// Transaction fee constants (microalgos)
pub mod fees {
    /// Minimum fee of a single transaction
    pub const MIN_TXN_FEE: u64 = 1_000;

    /// Flash loan fee applied when the manager does not report one (0.1%)
    pub const DEFAULT_FLASH_LOAN_FEE: u64 = 1_000;

    /// Max share of a reserve a flash loan may take when unset (100%)
    pub const DEFAULT_MAX_FLASH_LOAN_RATIO: u64 = super::PARAMETER_SCALE_FACTOR;
}

/// AVM execution budget constants
pub mod compute {
    /// Opcode budget granted to each application call
    pub const OPCODE_BUDGET_PER_CALL: u64 = 700;

    /// Opcode cost of one stableswap Newton iteration on chain
    pub const STABLESWAP_OPCODE_COST_PER_ITERATION: u64 = 400;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_defaults_within_scale() {
        assert!(fees::DEFAULT_FLASH_LOAN_FEE < PARAMETER_SCALE_FACTOR);
        assert_eq!(fees::DEFAULT_MAX_FLASH_LOAN_RATIO, PARAMETER_SCALE_FACTOR);
        // One iteration fits a single call's budget
        assert!(compute::STABLESWAP_OPCODE_COST_PER_ITERATION < compute::OPCODE_BUDGET_PER_CALL);
    }
}

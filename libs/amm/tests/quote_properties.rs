//! Quote Property Tests
//!
//! Invariants that must hold for any reserves and amounts, independent of
//! the concrete scenarios in `quote_scenarios.rs`.

mod common;

use algofi_amm::{PoolDeposit, QuoteEngine, StableswapMath};
use common::*;
use proptest::prelude::*;

prop_compose! {
    /// Non-empty constant product pool with reserves in a realistic range
    fn arb_constant_product_pool()(
        asset1_balance in 1_000u64..1_000_000_000_000,
        asset2_balance in 1_000u64..1_000_000_000_000,
        lp_circulation in 1_000u64..1_000_000_000_000,
    ) -> (u64, u64, u64) {
        (asset1_balance, asset2_balance, lp_circulation)
    }
}

prop_compose! {
    /// Stableswap balances within 10x of each other
    fn arb_stable_balances()(
        base in 1_000_000u64..1_000_000_000_000,
        skew_bps in 1_000u64..100_000,
    ) -> [u128; 2] {
        let other = u128::from(base) * u128::from(skew_bps) / 10_000;
        [u128::from(base), other]
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The constant product never decreases net of fees
    #[test]
    fn prop_constant_product_conserved(
        (b1, b2, lc) in arb_constant_product_pool(),
        amount_in in 1u64..1_000_000_000_000,
        reverse in any::<bool>(),
    ) {
        let pool = constant_product_pool(b1, b2, lc);
        let (asset_in, balance_in, balance_out) = if reverse {
            (USDC, b2, b1)
        } else {
            (ALGO, b1, b2)
        };

        let delta = QuoteEngine::new(&pool).quote_swap_exact_for(asset_in, amount_in).unwrap();
        let (paid_in, paid_out) = if reverse {
            (-delta.asset2_delta, delta.asset1_delta)
        } else {
            (-delta.asset1_delta, delta.asset2_delta)
        };
        prop_assert_eq!(paid_in, i128::from(amount_in));
        prop_assert!(paid_out >= 0);
        prop_assert!(paid_out < i128::from(balance_out));

        let input_less_fee = algofi_amm::fees::amount_less_fee(amount_in, pool.swap_fee());
        let before = u128::from(balance_in) * u128::from(balance_out);
        let after = (u128::from(balance_in) + u128::from(input_less_fee))
            * (u128::from(balance_out) - paid_out as u128);
        prop_assert!(after >= before);
    }

    /// Component-wise larger balances never give a smaller invariant
    #[test]
    fn prop_invariant_monotonic(
        balances in arb_stable_balances(),
        extra1 in 1_000u64..1_000_000_000,
        extra2 in 1_000u64..1_000_000_000,
    ) {
        let (d0, _) = StableswapMath::get_d(balances, STABLE_A).unwrap();
        let grown = [balances[0] + u128::from(extra1), balances[1] + u128::from(extra2)];
        let (d1, _) = StableswapMath::get_d(grown, STABLE_A).unwrap();
        prop_assert!(d1 >= d0);
    }

    /// Pooling at the prevailing ratio and burning the issued LP returns the deposit
    #[test]
    fn prop_proportional_pool_round_trip(
        b1 in 1_000u64..1_000_000_000,
        ratio in 1u64..1_000,
        a1 in 1u64..1_000_000_000,
    ) {
        // lp_circulation equal to asset1 keeps issuance exact
        let b2 = b1 * ratio;
        let a2 = a1 * ratio;
        let pool = constant_product_pool(b1, b2, b1);
        let engine = QuoteEngine::new(&pool);

        let deposit = engine
            .quote_pool(PoolDeposit::Pair { asset1_amount: a1, asset2_amount: a2 })
            .unwrap();
        prop_assert_eq!(deposit.asset1_delta, -i128::from(a1));
        prop_assert_eq!(deposit.asset2_delta, -i128::from(a2));
        prop_assert_eq!(deposit.price_delta, algofi_amm::Decimal::ZERO);

        let grown = pool.after(&deposit).unwrap();
        let burn = QuoteEngine::new(&grown).quote_burn(deposit.lp_delta as u64).unwrap();
        prop_assert!((burn.asset1_delta - i128::from(a1)).abs() <= 1);
        prop_assert!((burn.asset2_delta - i128::from(a2)).abs() <= 1);
    }
}

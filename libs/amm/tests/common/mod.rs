//! Shared pool fixtures for integration tests

#![allow(dead_code)]

use algofi_amm::{AmplificationSchedule, PoolKind, PoolSnapshot, A_PRECISION};

pub const ALGO: u64 = 1;
pub const USDC: u64 = 31_566_704;
pub const STBL: u64 = 465_865_291;

pub const STABLE_A: u64 = 100 * A_PRECISION;

/// Constant product pool at a 25bp fee tier
pub fn constant_product_pool(asset1_balance: u64, asset2_balance: u64, lp_circulation: u64) -> PoolSnapshot {
    PoolSnapshot::builder(PoolKind::ConstantProduct { fee_bps: 25 }, ALGO, USDC)
        .balances(asset1_balance, asset2_balance)
        .lp_circulation(lp_circulation)
        .swap_fee(2_500)
        .build()
        .expect("valid constant product pool")
}

/// Stableswap pool with a completed ramp at `STABLE_A`
pub fn stableswap_pool(asset1_balance: u64, asset2_balance: u64, lp_circulation: u64) -> PoolSnapshot {
    PoolSnapshot::builder(
        PoolKind::Stableswap {
            amplification: AmplificationSchedule::constant(STABLE_A),
        },
        USDC,
        STBL,
    )
    .balances(asset1_balance, asset2_balance)
    .lp_circulation(lp_circulation)
    .build()
    .expect("valid stableswap pool")
}

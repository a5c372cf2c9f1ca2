//! # Algofi AMM Library - Exact Pool Quote Engine
//!
//! ## Purpose
//!
//! Pricing and invariant engine for two-asset liquidity pools. Given an
//! immutable snapshot of a pool's reserves and parameters, it quotes the
//! exact balance changes of depositing liquidity, burning LP tokens, and
//! swapping in either direction, for both constant product (`x * y = k`)
//! pools and two-coin StableSwap pools. Results match the pool contracts'
//! integer arithmetic to the base unit.
//!
//! ## Integration Points
//!
//! - **Input Sources**: [`PoolSnapshot`] built from a chain read by the caller
//! - **Output Destinations**: Transaction builders consuming [`BalanceDelta`]
//! - **Pool Kinds**: Constant product fee tiers and NanoSwap stableswap pools
//! - **Configuration**: Fee tiers, compute budget and slippage from `algofi-config`
//! - **Validation**: Canonical asset ordering and fee bounds at snapshot construction
//!
//! ## Architecture Role
//!
//! The engine is a pure function of its snapshot: no I/O, no shared state,
//! no retries. Curve specifics sit behind [`PoolCurve`]; fee handling,
//! sign convention and liquidity checks live once in [`QuoteEngine`].
//!
//! ## Precision
//!
//! - **Reserves**: `u64` base units as held on chain
//! - **Intermediates**: `u128` for constant product, 256-bit for the stableswap solvers
//! - **Rounding**: Floor division everywhere the contract floors; fees round in the pool's favor
//! - **Price Delta**: [`Decimal`] ratio, the only non-integer output
//! - **No floating point** on any code path

pub mod amplification;
pub mod balance_delta;
pub mod constant_product;
pub mod error;
pub mod fees;
pub mod pool_traits;
pub mod quote;
pub mod slippage;
pub mod snapshot;
pub mod stableswap;

pub use amplification::AmplificationSchedule;
pub use balance_delta::BalanceDelta;
pub use constant_product::ConstantProductMath;
pub use error::{QuoteError, Result, Solver};
pub use pool_traits::{ConstantProductCurve, PoolCurve, StableswapCurve};
pub use quote::{FlashLoanQuote, PoolDeposit, QuoteEngine};
pub use slippage::SlippageTolerance;
pub use snapshot::{PoolKind, PoolSide, PoolSnapshot, PoolSnapshotBuilder};
pub use stableswap::{StableswapMath, A_PRECISION, MAX_ITERATIONS};

/// Common types for quote consumers
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

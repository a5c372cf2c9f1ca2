//! Error types for pool snapshots and quote computation
//!
//! Every failure of the engine maps to one closed kind so callers can branch
//! on the category instead of matching message text. None of them are
//! retryable: the engine is a pure function of its snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Newton-Raphson routine that produced a [`QuoteError::NonConvergence`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Solver {
    /// Invariant `D` from two balances
    Invariant,
    /// Counter-asset balance `y` for a target `D`
    Balance,
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solver::Invariant => write!(f, "get_D"),
            Solver::Balance => write!(f, "get_y"),
        }
    }
}

/// Errors raised while building a snapshot or computing a quote
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// Asset ids out of canonical order, or pool parameters the contract cannot hold
    #[error("Invalid pool configuration: {reason}")]
    InvalidPoolConfiguration { reason: String },

    /// Quote requested against a pool with no LP tokens in circulation
    #[error("Pool is empty: no LP tokens in circulation")]
    EmptyPool,

    /// Requested amount exceeds what the pool holds
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    /// Quote rounds the amount the caller pays or receives down to zero
    #[error("Amount {amount} is too small: the pool rounds it to zero")]
    AmountTooSmall { amount: u64 },

    /// Newton iteration exhausted its cap without meeting the tolerance
    #[error("{solver} did not converge within {max_iterations} iterations")]
    NonConvergence { solver: Solver, max_iterations: u32 },

    /// Asset id is neither side of the pool
    #[error("Asset {asset_id} is not part of this pool")]
    UnknownAsset { asset_id: u64 },

    /// Checked arithmetic overflowed or underflowed
    #[error("Arithmetic overflow or underflow in {context}")]
    Arithmetic { context: &'static str },

    /// A reserve or denominator the formula divides by is zero
    #[error("Division by zero in {context}")]
    DivisionByZero { context: &'static str },
}

impl QuoteError {
    /// Retrying the same computation against the same snapshot cannot succeed
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Short message suitable for presenting to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            QuoteError::InvalidPoolConfiguration { .. } => "pool configuration is invalid",
            QuoteError::EmptyPool => "pool not ready",
            QuoteError::InsufficientLiquidity { .. } => "insufficient pool liquidity for that amount",
            QuoteError::AmountTooSmall { .. } => "amount too small - try a larger amount",
            QuoteError::UnknownAsset { .. } => "asset is not traded by this pool",
            QuoteError::NonConvergence { .. }
            | QuoteError::Arithmetic { .. }
            | QuoteError::DivisionByZero { .. } => "price calculation failed - try a smaller amount",
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        QuoteError::InvalidPoolConfiguration {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuoteError>;

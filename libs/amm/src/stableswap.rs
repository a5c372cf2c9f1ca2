//! StableSwap invariant math for two-coin pools
//!
//! Integer Newton-Raphson solvers for the Curve invariant `D` and for the
//! balance `y` of one coin given the other and a target `D`. All arithmetic
//! is floor division on 256-bit unsigned integers so results match the pool
//! contract bit for bit; there is no floating point anywhere in this module.

use crate::error::{QuoteError, Result, Solver};
use primitive_types::U256;
use tracing::{debug, warn};

/// Type alias for solver results: (value, index of the converging iteration)
pub type SolverResult = (u128, u32);

/// Fixed-point scale of the amplification factor
pub const A_PRECISION: u64 = 1_000_000;

/// Number of coins in every stableswap pool of the protocol
pub const N_COINS: usize = 2;

/// Hard cap on Newton iterations for both solvers
pub const MAX_ITERATIONS: u32 = 255;

/// StableSwap solvers
pub struct StableswapMath;

impl StableswapMath {
    /// Calculate the invariant `D` for two balances
    ///
    /// # Arguments
    /// * `balances` - Pool balances in base units
    /// * `amplification` - Effective amplification factor, scaled by [`A_PRECISION`]
    ///
    /// # Returns
    /// `(D, iteration_index)`; an empty pool returns `(0, 0)` without iterating
    pub fn get_d(balances: [u128; N_COINS], amplification: u64) -> Result<SolverResult> {
        Self::solve_d(balances, amplification, MAX_ITERATIONS)
    }

    fn solve_d(
        balances: [u128; N_COINS],
        amplification: u64,
        max_iterations: u32,
    ) -> Result<SolverResult> {
        let s = U256::from(balances[0]) + U256::from(balances[1]);
        if s.is_zero() {
            return Ok((0, 0));
        }
        if balances.iter().any(|&x| x == 0) {
            return Err(QuoteError::DivisionByZero {
                context: "stableswap invariant with a drained reserve",
            });
        }

        let n = U256::from(N_COINS);
        let a_precision = U256::from(A_PRECISION);
        let ann = U256::from(amplification) * n * n;

        let mut d = s;
        for iteration in 0..max_iterations {
            let mut d_p = d;
            for &x in &balances {
                d_p = mul(d_p, d, "stableswap D_P")? / (U256::from(x) * n);
            }
            let d_prev = d;

            let numerator = mul(ann * s / a_precision + d_p * n, d, "stableswap D numerator")?;
            let denominator = Self::invariant_denominator(ann, d, d_p)?;
            d = numerator / denominator;

            if abs_diff(d, d_prev) <= U256::one() {
                debug!("get_D converged at iteration {} with D={}", iteration, d);
                return Ok((to_u128(d, "stableswap invariant")?, iteration));
            }
        }

        warn!(
            "get_D failed to converge for balances {:?} with A={}",
            balances, amplification
        );
        Err(QuoteError::NonConvergence {
            solver: Solver::Invariant,
            max_iterations,
        })
    }

    /// Calculate the balance `y` of coin `j` that keeps the invariant at `d`
    /// when coin `i` is set to `x`
    ///
    /// # Arguments
    /// * `i` - Index of the coin whose new balance is known
    /// * `j` - Index of the coin being solved for (`i != j`)
    /// * `x` - New balance of coin `i`
    /// * `balances` - Current pool balances
    /// * `d` - Invariant to hold, from [`StableswapMath::get_d`]
    /// * `amplification` - Effective amplification factor, scaled by [`A_PRECISION`]
    ///
    /// # Returns
    /// `(y, iteration_index)`
    pub fn get_y(
        i: usize,
        j: usize,
        x: u128,
        balances: [u128; N_COINS],
        d: u128,
        amplification: u64,
    ) -> Result<SolverResult> {
        Self::solve_y(i, j, x, balances, d, amplification, MAX_ITERATIONS)
    }

    fn solve_y(
        i: usize,
        j: usize,
        x: u128,
        balances: [u128; N_COINS],
        d: u128,
        amplification: u64,
        max_iterations: u32,
    ) -> Result<SolverResult> {
        if i == j || i >= N_COINS || j >= N_COINS {
            return Err(QuoteError::invalid_config(format!(
                "invalid stableswap coin indices i={} j={}",
                i, j
            )));
        }

        let n = U256::from(N_COINS);
        let a_precision = U256::from(A_PRECISION);
        let ann = U256::from(amplification) * n * n;
        if ann.is_zero() {
            return Err(QuoteError::DivisionByZero {
                context: "stableswap balance with zero amplification",
            });
        }
        let d = U256::from(d);

        let mut c = d;
        let mut s = U256::zero();
        for (k, &balance) in balances.iter().enumerate() {
            let x_k = if k == i {
                U256::from(x)
            } else if k != j {
                U256::from(balance)
            } else {
                continue;
            };
            if x_k.is_zero() {
                return Err(QuoteError::DivisionByZero {
                    context: "stableswap balance with a drained reserve",
                });
            }
            s += x_k;
            c = mul(c, d, "stableswap c")? / (x_k * n);
        }
        c = mul(mul(c, d, "stableswap c")?, a_precision, "stableswap c")? / (ann * n);
        let b = s + d * a_precision / ann;

        let mut y = d;
        for iteration in 0..max_iterations {
            let y_prev = y;
            let numerator = mul(y, y, "stableswap y numerator")? + c;
            let denominator = (y * n + b)
                .checked_sub(d)
                .filter(|v| !v.is_zero())
                .ok_or(QuoteError::Arithmetic {
                    context: "stableswap y denominator",
                })?;
            y = numerator / denominator;

            if abs_diff(y, y_prev) <= U256::one() {
                debug!("get_y converged at iteration {} with y={}", iteration, y);
                return Ok((to_u128(y, "stableswap balance")?, iteration));
            }
        }

        warn!(
            "get_y failed to converge for x={} D={} with A={}",
            x, d, amplification
        );
        Err(QuoteError::NonConvergence {
            solver: Solver::Balance,
            max_iterations,
        })
    }

    /// `(Ann - A_PRECISION) * D / A_PRECISION + (N + 1) * D_P` under floor division,
    /// including the case where `Ann < A_PRECISION` makes the first term negative
    fn invariant_denominator(ann: U256, d: U256, d_p: U256) -> Result<U256> {
        let a_precision = U256::from(A_PRECISION);
        let product_term = U256::from(N_COINS + 1) * d_p;

        let denominator = if ann >= a_precision {
            mul(ann - a_precision, d, "stableswap D denominator")? / a_precision + product_term
        } else {
            // floor(-v / p) == -ceil(v / p)
            let v = mul(a_precision - ann, d, "stableswap D denominator")?;
            let negative = (v + a_precision - U256::one()) / a_precision;
            product_term
                .checked_sub(negative)
                .ok_or(QuoteError::Arithmetic {
                    context: "stableswap D denominator",
                })?
        };

        if denominator.is_zero() {
            return Err(QuoteError::DivisionByZero {
                context: "stableswap D denominator",
            });
        }
        Ok(denominator)
    }
}

fn mul(a: U256, b: U256, context: &'static str) -> Result<U256> {
    a.checked_mul(b).ok_or(QuoteError::Arithmetic { context })
}

fn abs_diff(a: U256, b: U256) -> U256 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

fn to_u128(value: U256, context: &'static str) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return Err(QuoteError::Arithmetic { context });
    }
    Ok(value.low_u128())
}

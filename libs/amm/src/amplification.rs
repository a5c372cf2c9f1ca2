//! Stableswap amplification ramp
//!
//! The pool admin moves `A` linearly from an initial to a future value over
//! a time window. The effective factor is a pure function of the ramp and
//! the snapshot's `current_time`.

use serde::{Deserialize, Serialize};

/// Linear ramp of the amplification factor, values scaled by `A_PRECISION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmplificationSchedule {
    pub initial_amplification_factor: u64,
    pub future_amplification_factor: u64,
    pub initial_amplification_factor_time: u64,
    pub future_amplification_factor_time: u64,
}

impl AmplificationSchedule {
    /// Schedule whose ramp has already completed at `factor`
    pub const fn constant(factor: u64) -> Self {
        Self {
            initial_amplification_factor: factor,
            future_amplification_factor: factor,
            initial_amplification_factor_time: 0,
            future_amplification_factor_time: 0,
        }
    }

    /// Effective amplification factor at time `t`
    ///
    /// Before `future_amplification_factor_time` the factor is
    /// `initial + (future - initial) * (t - t_initial) // (t_future - t_initial)`
    /// with floor division, so a downward ramp rounds toward the lower value.
    /// Times before the ramp start are clamped to the start.
    pub fn factor_at(&self, t: u64) -> u64 {
        let t_initial = self.initial_amplification_factor_time;
        let t_future = self.future_amplification_factor_time;

        if t >= t_future || t_future <= t_initial {
            return self.future_amplification_factor;
        }

        let elapsed = i128::from(t.saturating_sub(t_initial));
        let window = i128::from(t_future - t_initial);
        let initial = i128::from(self.initial_amplification_factor);
        let span = i128::from(self.future_amplification_factor) - initial;

        let factor = initial + (span * elapsed).div_euclid(window);
        // Interpolation stays between the two endpoints, both of which are u64
        u64::try_from(factor).unwrap_or(self.future_amplification_factor)
    }

    /// True while the factor is still moving at time `t`
    pub fn is_ramping(&self, t: u64) -> bool {
        t < self.future_amplification_factor_time
            && self.initial_amplification_factor != self.future_amplification_factor
    }
}

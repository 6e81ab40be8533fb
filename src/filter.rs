//! Scalar signal conditioning.
//!
//! Single-input filters that hold one output value and advance it with each
//! new sample. Both start from an output of zero.
//!
//! ```
//! use sigmakit::filter::{LowPass, RateLimiter, SignalFilter};
//!
//! let mut lp = LowPass::new(0.5_f64);
//! assert_eq!(lp.update(1.0, 0.0), 0.5);
//! assert_eq!(lp.update(1.0, 0.0), 0.75);
//!
//! // at most 2 units per second
//! let mut rl = RateLimiter::new(2.0_f64);
//! assert_eq!(rl.update(10.0, 0.5), 1.0);
//! assert_eq!(rl.output(), 1.0);
//! ```

use crate::math;
use crate::traits::FloatScalar;

/// A filter that turns a stream of samples into a stream of outputs.
pub trait SignalFilter<T> {
    /// Feed one sample taken `dt` seconds after the previous one.
    fn update(&mut self, sample: T, dt: T) -> T;

    /// Most recent output.
    fn output(&self) -> T;

    /// Overwrite the held output, e.g. to start from a first measurement.
    fn reset(&mut self, output: T);
}

/// First-order exponential smoother.
///
/// `output = factor·output + (1 − factor)·sample`. A factor of 0 passes
/// samples straight through; values close to 1 smooth heavily. The step is
/// fixed per sample, so `dt` is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass<T> {
    factor: T,
    output: T,
}

impl<T: FloatScalar> LowPass<T> {
    pub fn new(factor: T) -> Self {
        Self {
            factor,
            output: T::zero(),
        }
    }

    #[inline]
    pub fn factor(&self) -> T {
        self.factor
    }

    pub fn set_factor(&mut self, factor: T) {
        self.factor = factor;
    }
}

impl<T: FloatScalar> SignalFilter<T> for LowPass<T> {
    fn update(&mut self, sample: T, _dt: T) -> T {
        self.output = self.output * self.factor + (T::one() - self.factor) * sample;
        self.output
    }

    #[inline]
    fn output(&self) -> T {
        self.output
    }

    fn reset(&mut self, output: T) {
        self.output = output;
    }
}

/// Slew-rate limiter.
///
/// The output follows the sample but moves by at most `rate·dt` per update.
/// With `dt == 0` the bound is `rate` itself, i.e. `rate` is read as a
/// per-update step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiter<T> {
    rate: T,
    output: T,
}

impl<T: FloatScalar> RateLimiter<T> {
    pub fn new(rate: T) -> Self {
        Self {
            rate,
            output: T::zero(),
        }
    }

    #[inline]
    pub fn rate(&self) -> T {
        self.rate
    }

    pub fn set_rate(&mut self, rate: T) {
        self.rate = rate;
    }
}

impl<T: FloatScalar> SignalFilter<T> for RateLimiter<T> {
    fn update(&mut self, sample: T, dt: T) -> T {
        let step = if dt == T::zero() {
            self.rate
        } else {
            self.rate * dt
        };
        self.output = self.output + math::constrained(sample - self.output, -step, step);
        self.output
    }

    #[inline]
    fn output(&self) -> T {
        self.output
    }

    fn reset(&mut self, output: T) {
        self.output = output;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_pass_first_step_and_convergence() {
        let mut lp = LowPass::new(0.8_f64);
        assert_eq!(lp.output(), 0.0);
        let y = lp.update(5.0, 0.01);
        assert!((y - 1.0).abs() < 1e-12);

        for _ in 0..200 {
            lp.update(5.0, 0.01);
        }
        assert!((lp.output() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn low_pass_ignores_dt() {
        let mut a = LowPass::new(0.3_f64);
        let mut b = LowPass::new(0.3_f64);
        for k in 0..10 {
            let s = k as f64;
            assert_eq!(a.update(s, 0.0), b.update(s, 1.5));
        }
    }

    #[test]
    fn low_pass_zero_factor_passes_through() {
        let mut lp = LowPass::new(0.0_f32);
        assert_eq!(lp.update(3.5, 0.1), 3.5);
        assert_eq!(lp.update(-1.0, 0.1), -1.0);
    }

    #[test]
    fn low_pass_reset_seeds_output() {
        let mut lp = LowPass::new(0.5_f64);
        lp.reset(4.0);
        assert_eq!(lp.update(4.0, 0.0), 4.0);
        lp.set_factor(0.25);
        assert_eq!(lp.factor(), 0.25);
        assert_eq!(lp.update(0.0, 0.0), 1.0);
    }

    #[test]
    fn rate_limiter_scales_step_by_dt() {
        let mut rl = RateLimiter::new(10.0_f64);
        assert_eq!(rl.update(100.0, 0.1), 1.0);
        assert_eq!(rl.update(100.0, 0.1), 2.0);
        assert_eq!(rl.update(-100.0, 0.05), 1.5);
    }

    #[test]
    fn rate_limiter_zero_dt_uses_rate_as_step() {
        let mut rl = RateLimiter::new(0.5_f64);
        assert_eq!(rl.update(2.0, 0.0), 0.5);
        assert_eq!(rl.update(2.0, 0.0), 1.0);
        assert_eq!(rl.update(-2.0, 0.0), 0.5);
    }

    #[test]
    fn rate_limiter_reaches_target_without_overshoot() {
        let mut rl = RateLimiter::new(3.0_f64);
        let mut prev = rl.output();
        for _ in 0..20 {
            let y = rl.update(1.0, 0.1);
            assert!(y <= 1.0);
            assert!(y - prev <= 0.3 + 1e-12);
            prev = y;
        }
        assert_eq!(rl.output(), 1.0);

        // small moves inside the bound land exactly
        assert_eq!(rl.update(1.1, 0.1), 1.1);
    }

    #[test]
    fn filters_share_one_interface() {
        fn run<F: SignalFilter<f64>>(f: &mut F, samples: &[f64]) -> f64 {
            for &s in samples {
                f.update(s, 0.0);
            }
            f.output()
        }
        let mut lp = LowPass::new(0.0);
        let mut rl = RateLimiter::new(1.0);
        rl.set_rate(2.0);
        assert_eq!(rl.rate(), 2.0);
        assert_eq!(run(&mut lp, &[1.0, 2.0, 3.0]), 3.0);
        assert_eq!(run(&mut rl, &[1.0, 5.0, 5.0]), 5.0);
    }
}

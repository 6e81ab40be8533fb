use crate::traits::FloatScalar;

use super::{check_states, wrong_len, EstimateError, Estimator};

/// Complementary filter with proportional-integral error feedback.
///
/// The filter integrates a control input (typically a rate sensor) through a
/// process function and corrects it with the residual between the state and
/// an absolute measurement. The correction is split in two parts of `l`
/// elements each: an instantaneous term, consumed by the next `predict`, and
/// an integral term that keeps accumulating (a bias estimate).
///
/// `N` is the state capacity and `L` the control-input capacity.
///
/// ```
/// use sigmakit::estimate::{Cf, Estimator};
///
/// // angle from a gyro with a constant 0.1 rad/s bias, corrected by an
/// // inclinometer reading 0
/// let mut cf = Cf::<f64, 1, 1>::new(&[0.0], 1).unwrap();
/// for _ in 0..2000 {
///     cf.predict(|dt, u, x, next| next[0] = x[0] + dt * u[0], 0.01, &[0.1], &[0.5])
///         .unwrap();
///     cf.update(|x, z, e| e[0] = z[0] - x[0], 0.01, &[0.0], &[0.02]).unwrap();
/// }
/// assert!(cf.state()[0].abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct Cf<T: FloatScalar, const N: usize, const L: usize> {
    n: usize,
    l: usize,
    x: [T; N],
    /// `[instantaneous, integral]`
    error: [[T; L]; 2],
}

impl<T: FloatScalar, const N: usize, const L: usize> Cf<T, N, L> {
    /// Create a filter around `x0` correcting `l` control channels.
    pub fn new(x0: &[T], l: usize) -> Result<Self, EstimateError> {
        let n = x0.len();
        check_states(n, N, n)?;
        if l == 0 || l > L {
            log::debug!("cf: error length {l} outside 1..={L}");
            return Err(EstimateError::CapacityExceeded);
        }
        let mut x = [T::zero(); N];
        x[..n].copy_from_slice(x0);
        Ok(Self {
            n,
            l,
            x,
            error: [[T::zero(); L]; 2],
        })
    }

    /// Number of corrected control channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.l
    }

    /// Instantaneous error, cleared by every `predict`.
    pub fn error(&self) -> &[T] {
        &self.error[0][..self.l]
    }

    /// Accumulated (integral) error.
    pub fn integral(&self) -> &[T] {
        &self.error[1][..self.l]
    }

    /// Clear both error terms.
    pub fn reset(&mut self) {
        self.error = [[T::zero(); L]; 2];
    }

    /// Predict step.
    ///
    /// The control input is corrected as `u + e + ki∘e_int` (the caller's
    /// `u` is not modified) and `f(dt, u_corrected, x, next)` produces the
    /// next state. `next` starts as a copy of `x`, so components `f` leaves
    /// alone keep their value. The instantaneous error is then cleared.
    pub fn predict(
        &mut self,
        mut f: impl FnMut(T, &[T], &[T], &mut [T]),
        dt: T,
        u: &[T],
        ki: &[T],
    ) -> Result<(), EstimateError> {
        let (n, l) = (self.n, self.l);
        check_dt(dt)?;
        if u.len() != l || ki.len() != l {
            return Err(wrong_len("cf predict"));
        }
        log::trace!("cf predict: dt = {dt:?}");

        let [inst, int] = &mut self.error;
        let mut uc = [T::zero(); L];
        for i in 0..l {
            uc[i] = u[i] + inst[i] + ki[i] * int[i];
        }

        let mut next = self.x;
        f(dt, &uc[..l], &self.x[..n], &mut next[..n]);
        self.x = next;
        inst[..l].fill(T::zero());
        Ok(())
    }

    /// Update step.
    ///
    /// `h(x, z, e)` writes the `l`-element residual between the state and
    /// the measurement `z`. Then `e_inst += kp∘e / dt` and `e_int += e`.
    pub fn update(
        &mut self,
        mut h: impl FnMut(&[T], &[T], &mut [T]),
        dt: T,
        z: &[T],
        kp: &[T],
    ) -> Result<(), EstimateError> {
        let (n, l) = (self.n, self.l);
        check_dt(dt)?;
        if kp.len() != l {
            return Err(wrong_len("cf update"));
        }
        log::trace!("cf update: {} measurements", z.len());

        let mut e = [T::zero(); L];
        h(&self.x[..n], z, &mut e[..l]);

        let [inst, int] = &mut self.error;
        for i in 0..l {
            inst[i] = inst[i] + kp[i] * e[i] / dt;
            int[i] = int[i] + e[i];
        }
        Ok(())
    }
}

fn check_dt<T: FloatScalar>(dt: T) -> Result<(), EstimateError> {
    if dt > T::zero() {
        Ok(())
    } else {
        log::debug!("cf: rejected time step {dt:?}");
        Err(EstimateError::InvalidTimeStep)
    }
}

impl<T: FloatScalar, const N: usize, const L: usize> Estimator<T> for Cf<T, N, L> {
    #[inline]
    fn n_states(&self) -> usize {
        self.n
    }

    #[inline]
    fn state(&self) -> &[T] {
        &self.x[..self.n]
    }

    #[inline]
    fn state_mut(&mut self) -> &mut [T] {
        &mut self.x[..self.n]
    }
}

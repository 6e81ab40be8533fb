use crate::linalg::{cholesky, divide};
use crate::matrix::{multiply, multiply_transposed};
use crate::traits::{FloatScalar, MatrixRef};
use crate::{MatrixView, MatrixViewMut};

use super::sigma::{self, Moments, SigmaBuf, SigmaParams, Weights};
use super::{check_measurements, check_states, wrong_len, EstimateError, Estimator};

/// Unscented Kalman Filter with Merwe-scaled sigma points.
///
/// `N` is the state capacity and `M` the measurement capacity; the state
/// length `n` is taken from the initial state. All buffers (covariance,
/// `2n + 1` sigma points, their deviations, weights) live inline.
///
/// Each step stages its results and commits them only on success, so a
/// failed `predict` or `update` leaves the last good estimate in place.
///
/// ```
/// use sigmakit::estimate::{Estimator, Ukf};
/// use sigmakit::MatrixView;
///
/// let mut ukf = Ukf::<f64, 2, 1>::new(&[0.0, 0.0]).unwrap();
/// let r = MatrixView::new(1, 1, &[0.0]).unwrap();
///
/// // a noiseless direct measurement of the first state pins it
/// ukf.update(|x, z| z[0] = x[0], &[1.5], &r).unwrap();
/// assert!((ukf.state()[0] - 1.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Ukf<T: FloatScalar, const N: usize, const M: usize> {
    n: usize,
    x: [T; N],
    p: [[T; N]; N],
    sigma: SigmaBuf<T, N, N>,
    dev: SigmaBuf<T, N, N>,
    weights: Weights<T, N>,
    updated: bool,
}

impl<T: FloatScalar, const N: usize, const M: usize> Ukf<T, N, M> {
    /// Create a filter around `x0` with identity covariance and the default
    /// parameters `alpha = 0.001`, `beta = 2`, `kappa = 0`.
    pub fn new(x0: &[T]) -> Result<Self, EstimateError> {
        Self::with_params(x0, SigmaParams::default())
    }

    /// Create a filter with custom sigma-point scaling.
    ///
    /// Fails with [`EstimateError::CapacityExceeded`] when `x0` is empty,
    /// longer than `N`, or too long for `2n + 1` sigma columns, and with
    /// [`EstimateError::InvalidParameters`] when `n + lambda <= 0`.
    pub fn with_params(x0: &[T], params: SigmaParams<T>) -> Result<Self, EstimateError> {
        let n = x0.len();
        check_states(n, N, 2 * n + 1)?;
        let weights = Weights::new(n, params)?;

        let mut x = [T::zero(); N];
        x[..n].copy_from_slice(x0);
        let mut p = [[T::zero(); N]; N];
        MatrixViewMut::fitted(n, n, p.as_flattened_mut()).eye()?;

        log::debug!("ukf: {n} states, lambda = {:?}", weights.lambda);
        Ok(Self {
            n,
            x,
            p,
            sigma: sigma::zeroed(),
            dev: sigma::zeroed(),
            weights,
            updated: true,
        })
    }

    /// Replace the covariance. `p` must be `n × n`; its positive
    /// definiteness is checked at the next sigma-point generation.
    pub fn set_covariance(&mut self, p: &impl MatrixRef<T>) -> Result<(), EstimateError> {
        let n = self.n;
        if p.nrows() != n || p.ncols() != n {
            return Err(wrong_len("ukf set_covariance"));
        }
        self.p.as_flattened_mut()[..n * n].copy_from_slice(p.as_slice());
        self.updated = true;
        Ok(())
    }

    /// Current covariance, `n × n`.
    pub fn covariance(&self) -> MatrixView<'_, T> {
        MatrixView::fitted(self.n, self.n, self.p.as_flattened())
    }

    /// Current sigma points, `n × (2n + 1)`: propagated points after a
    /// `predict`, the last generated set otherwise.
    pub fn sigma_points(&self) -> MatrixView<'_, T> {
        MatrixView::fitted(self.n, 2 * self.n + 1, self.sigma.as_flattened().as_flattened())
    }

    /// Sigma-point scaling in use.
    pub fn params(&self) -> SigmaParams<T> {
        self.weights.params
    }

    /// Spread factor `c = sqrt(n + lambda)`.
    pub fn spread(&self) -> T {
        self.weights.c
    }

    /// Sigma points `[x, x + c·chol(P), x − c·chol(P)]` into `out`.
    fn sigmas(&self, out: &mut MatrixViewMut<'_, T>) -> Result<(), EstimateError> {
        let n = self.n;
        let mut a = [[T::zero(); N]; N];
        let mut a = MatrixViewMut::fitted(n, n, a.as_flattened_mut());
        cholesky(&self.covariance(), &mut a).map_err(|_| {
            log::warn!("ukf: covariance lost positive definiteness");
            EstimateError::CovarianceNotPD
        })?;
        sigma::spread(&self.x[..n], &mut a, self.weights.c, out)?;
        Ok(())
    }

    /// Predict step.
    ///
    /// `f` maps one state (`n` elements) to the next; `noise` is the `n × n`
    /// process noise covariance (`None` for none). Sigma points are drawn
    /// around the current estimate, propagated, and recombined into the new
    /// mean and covariance. The propagated points are kept for the next
    /// `update`.
    pub fn predict(
        &mut self,
        f: impl FnMut(&[T], &mut [T]),
        noise: Option<&MatrixView<'_, T>>,
    ) -> Result<(), EstimateError> {
        let n = self.n;
        let s = 2 * n + 1;
        if noise.is_some_and(|q| q.nrows() != n || q.ncols() != n) {
            return Err(wrong_len("ukf predict"));
        }
        log::trace!("ukf predict");

        let mut xs = sigma::zeroed::<T, N, N>();
        let mut xs = MatrixViewMut::fitted(n, s, xs.as_flattened_mut().as_flattened_mut());
        self.sigmas(&mut xs)?;

        let mut mean = [T::zero(); N];
        let mut cov = [[T::zero(); N]; N];
        let mut points = sigma::zeroed::<T, N, N>();
        let mut dev = sigma::zeroed::<T, N, N>();
        let mut out = Moments {
            mean: &mut mean[..n],
            cov: MatrixViewMut::fitted(n, n, cov.as_flattened_mut()),
            points: MatrixViewMut::fitted(n, s, points.as_flattened_mut().as_flattened_mut()),
            dev: MatrixViewMut::fitted(n, s, dev.as_flattened_mut().as_flattened_mut()),
        };
        sigma::unscented_transform(f, &xs, &self.weights, noise, &mut out)?;

        self.x = mean;
        self.p = cov;
        self.sigma = points;
        self.dev = dev;
        self.updated = false;
        Ok(())
    }

    /// Update step.
    ///
    /// `h` maps a state to a predicted measurement of `z.len()` elements;
    /// `noise` is the `m × m` measurement noise covariance. If the last step
    /// was an update (or nothing ran yet) sigma points are regenerated around
    /// the current estimate first. The gain `K = Pxz·inv(Pzz)` is formed with
    /// [`divide`](crate::linalg::divide), never an explicit inverse.
    pub fn update(
        &mut self,
        h: impl FnMut(&[T], &mut [T]),
        z: &[T],
        noise: &impl MatrixRef<T>,
    ) -> Result<(), EstimateError> {
        let n = self.n;
        let s = 2 * n + 1;
        let m = z.len();
        check_measurements(m, M, m)?;
        if noise.nrows() != m || noise.ncols() != m {
            return Err(wrong_len("ukf update"));
        }
        log::trace!("ukf update: {m} measurements");

        let mut xs_buf = self.sigma;
        let mut xd_buf = self.dev;
        let mut xs = MatrixViewMut::fitted(n, s, xs_buf.as_flattened_mut().as_flattened_mut());
        let mut xd = MatrixViewMut::fitted(n, s, xd_buf.as_flattened_mut().as_flattened_mut());
        if self.updated {
            self.sigmas(&mut xs)?;
            sigma::deviations(&xs, &self.x[..n], &mut xd)?;
        }

        // predicted measurement and its covariance
        let mut z_mean = [T::zero(); M];
        let mut pzz = [[T::zero(); M]; M];
        let mut z_points = sigma::zeroed::<T, M, N>();
        let mut z_dev = sigma::zeroed::<T, M, N>();
        let mut out = Moments {
            mean: &mut z_mean[..m],
            cov: MatrixViewMut::fitted(m, m, pzz.as_flattened_mut()),
            points: MatrixViewMut::fitted(m, s, z_points.as_flattened_mut().as_flattened_mut()),
            dev: MatrixViewMut::fitted(m, s, z_dev.as_flattened_mut().as_flattened_mut()),
        };
        sigma::unscented_transform(h, &xs, &self.weights, None, &mut out)?;
        out.cov.add_block(noise, 0, 0)?;

        // Pxz = Xs·diag(wc)·Zsᵀ
        let mut pxz = [[T::zero(); M]; N];
        let mut pxz = MatrixViewMut::fitted(n, m, pxz.as_flattened_mut());
        sigma::weighted_product(&xd, self.weights.wc(), &out.dev, &mut pxz)?;

        // K = Pxz / Pzz
        let mut k = [[T::zero(); M]; N];
        let mut k = MatrixViewMut::fitted(n, m, k.as_flattened_mut());
        divide(&pxz, &mut out.cov, &mut k).map_err(|e| {
            log::warn!("ukf: innovation covariance rejected ({e})");
            EstimateError::from(e)
        })?;

        // x + K·(z − ẑ)
        let mut innovation = [T::zero(); M];
        for ((v, &zi), &zh) in innovation.iter_mut().zip(z).zip(out.mean.iter()) {
            *v = zi - zh;
        }
        let mut dx = [T::zero(); N];
        multiply(
            &k,
            &MatrixView::column(&innovation[..m])?,
            &mut MatrixViewMut::column(&mut dx[..n])?,
        )?;
        let mut x = self.x;
        for (xi, &d) in x[..n].iter_mut().zip(&dx[..n]) {
            *xi = *xi + d;
        }

        // P − K·Pxzᵀ
        let mut p = self.p;
        let mut pv = MatrixViewMut::fitted(n, n, p.as_flattened_mut());
        let mut kp = [[T::zero(); N]; N];
        let mut kp = MatrixViewMut::fitted(n, n, kp.as_flattened_mut());
        multiply_transposed(&k, &pxz, &mut kp)?;
        pv.sub_block(&kp.as_view(), 0, 0)?;

        self.x = x;
        self.p = p;
        self.sigma = xs_buf;
        self.dev = xd_buf;
        self.updated = true;
        Ok(())
    }
}

impl<T: FloatScalar, const N: usize, const M: usize> Estimator<T> for Ukf<T, N, M> {
    #[inline]
    fn n_states(&self) -> usize {
        self.n
    }

    #[inline]
    fn state(&self) -> &[T] {
        &self.x[..self.n]
    }

    /// Editing the state invalidates the sigma points kept from `predict`;
    /// the next `update` draws fresh ones around the edited mean.
    #[inline]
    fn state_mut(&mut self) -> &mut [T] {
        self.updated = true;
        &mut self.x[..self.n]
    }
}

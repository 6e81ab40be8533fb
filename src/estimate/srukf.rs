use crate::linalg::{cholesky, cholesky_semidefinite, cholesky_update, divide_factored, Sign};
use crate::matrix::{col_into, multiply, multiply_transposed};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::{MatrixView, MatrixViewMut};

use super::sigma::{self, SigmaBuf, SigmaParams, Weights};
use super::{check_measurements, check_states, wrong_len, EstimateError, Estimator};

/// Square-root Unscented Kalman Filter.
///
/// Same contract as [`Ukf`](super::Ukf), but the covariance is kept as its
/// lower Cholesky factor `S` (`P = S·Sᵀ`) and never refactored. Sigma points
/// come straight from `S`; after propagation the new factor is rebuilt by QR
/// of the weighted deviations stacked with the noise factor, followed by a
/// rank-1 update or downdate with the central point. A measurement update
/// downdates `S` by the columns of `K·Sz`.
///
/// Noise arguments are covariances, as for the UKF. They are factored
/// internally and may be positive semidefinite: a rank-deficient process
/// noise or a zero measurement noise is accepted.
///
/// ```
/// use sigmakit::estimate::{Estimator, SrUkf};
/// use sigmakit::MatrixView;
///
/// let mut f = SrUkf::<f64, 2, 1>::new(&[0.0, 1.0]).unwrap();
/// let q = [0.01, 0.0, 0.0, 0.01];
/// let q = MatrixView::new(2, 2, &q).unwrap();
/// let r = MatrixView::new(1, 1, &[0.5]).unwrap();
///
/// f.predict(|x, next| { next[0] = x[0] + 0.1 * x[1]; next[1] = x[1]; }, Some(&q))
///     .unwrap();
/// f.update(|x, z| z[0] = x[0], &[0.12], &r).unwrap();
///
/// // the factor stays lower triangular
/// assert_eq!(f.factor()[(0, 1)], 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct SrUkf<T: FloatScalar, const N: usize, const M: usize> {
    n: usize,
    x: [T; N],
    s: [[T; N]; N],
    sigma: SigmaBuf<T, N, N>,
    dev: SigmaBuf<T, N, N>,
    weights: Weights<T, N>,
    updated: bool,
}

impl<T: FloatScalar, const N: usize, const M: usize> SrUkf<T, N, M> {
    /// Create a filter around `x0` with identity covariance and default
    /// Merwe parameters.
    pub fn new(x0: &[T]) -> Result<Self, EstimateError> {
        Self::with_params(x0, SigmaParams::default())
    }

    /// Create a filter with custom sigma-point scaling.
    pub fn with_params(x0: &[T], params: SigmaParams<T>) -> Result<Self, EstimateError> {
        let n = x0.len();
        check_states(n, N, 2 * n + 1)?;
        let weights = Weights::new(n, params)?;

        let mut x = [T::zero(); N];
        x[..n].copy_from_slice(x0);
        let mut s = [[T::zero(); N]; N];
        MatrixViewMut::fitted(n, n, s.as_flattened_mut()).eye()?;

        log::debug!("srukf: {n} states, lambda = {:?}", weights.lambda);
        Ok(Self {
            n,
            x,
            s,
            sigma: sigma::zeroed(),
            dev: sigma::zeroed(),
            weights,
            updated: true,
        })
    }

    /// Replace the covariance; it is factored immediately.
    ///
    /// Returns [`EstimateError::CovarianceNotPD`] and keeps the old factor
    /// when `p` is not positive definite.
    pub fn set_covariance(&mut self, p: &impl MatrixRef<T>) -> Result<(), EstimateError> {
        let n = self.n;
        if p.nrows() != n || p.ncols() != n {
            return Err(wrong_len("srukf set_covariance"));
        }
        let mut s = [[T::zero(); N]; N];
        cholesky(p, &mut MatrixViewMut::fitted(n, n, s.as_flattened_mut()))
            .map_err(|_| EstimateError::CovarianceNotPD)?;
        self.s = s;
        self.updated = true;
        Ok(())
    }

    /// Lower Cholesky factor `S` of the covariance, `n × n`.
    pub fn factor(&self) -> MatrixView<'_, T> {
        MatrixView::fitted(self.n, self.n, self.s.as_flattened())
    }

    /// Reconstruct `P = S·Sᵀ` into `out` (`n × n`).
    pub fn covariance(&self, out: &mut impl MatrixMut<T>) -> Result<(), EstimateError> {
        let s = self.factor();
        multiply_transposed(&s, &s, out)?;
        Ok(())
    }

    /// Sigma-point scaling in use.
    pub fn params(&self) -> SigmaParams<T> {
        self.weights.params
    }

    fn sigmas(&self, out: &mut MatrixViewMut<'_, T>) -> Result<(), EstimateError> {
        let n = self.n;
        let mut a = self.s;
        let mut a = MatrixViewMut::fitted(n, n, a.as_flattened_mut());
        sigma::spread(&self.x[..n], &mut a, self.weights.c, out)?;
        Ok(())
    }

    /// Predict step; see [`Ukf::predict`](super::Ukf::predict).
    pub fn predict(
        &mut self,
        f: impl FnMut(&[T], &mut [T]),
        noise: Option<&MatrixView<'_, T>>,
    ) -> Result<(), EstimateError> {
        let n = self.n;
        let s = 2 * n + 1;
        if noise.is_some_and(|q| q.nrows() != n || q.ncols() != n) {
            return Err(wrong_len("srukf predict"));
        }
        log::trace!("srukf predict");

        let mut qbuf = [[T::zero(); N]; N];
        let qf = match noise {
            Some(q) => {
                let mut v = MatrixViewMut::fitted(n, n, qbuf.as_flattened_mut());
                cholesky_semidefinite(q, &mut v).map_err(|_| {
                    log::warn!("srukf: process noise is not positive semidefinite");
                    EstimateError::CovarianceNotPD
                })?;
                Some(v)
            }
            None => None,
        };

        let mut xs = sigma::zeroed::<T, N, N>();
        let mut xs = MatrixViewMut::fitted(n, s, xs.as_flattened_mut().as_flattened_mut());
        self.sigmas(&mut xs)?;

        let mut mean = [T::zero(); N];
        let mut points = sigma::zeroed::<T, N, N>();
        let mut dev = sigma::zeroed::<T, N, N>();
        let mut pv = MatrixViewMut::fitted(n, s, points.as_flattened_mut().as_flattened_mut());
        let mut dv = MatrixViewMut::fitted(n, s, dev.as_flattened_mut().as_flattened_mut());
        sigma::propagate(f, &xs, self.weights.wm(), &mut pv, &mut mean[..n])?;
        sigma::deviations(&pv, &mean[..n], &mut dv)?;

        let mut stage = [[[T::zero(); N]; N]; 2];
        let mut square = [[[T::zero(); N]; N]; 2];
        let mut s_new = [[T::zero(); N]; N];
        sigma::factor_deviations(
            &dv,
            self.weights.wc(),
            qf.as_ref(),
            stage.as_flattened_mut().as_flattened_mut(),
            square.as_flattened_mut().as_flattened_mut(),
            &mut MatrixViewMut::fitted(n, n, s_new.as_flattened_mut()),
        )?;

        self.x = mean;
        self.s = s_new;
        self.sigma = points;
        self.dev = dev;
        self.updated = false;
        Ok(())
    }

    /// Update step; see [`Ukf::update`](super::Ukf::update).
    ///
    /// The gain is `K = Pxz·inv(Sz·Szᵀ)`, solved against the measurement
    /// factor `Sz` by substitution.
    pub fn update(
        &mut self,
        h: impl FnMut(&[T], &mut [T]),
        z: &[T],
        noise: &impl MatrixRef<T>,
    ) -> Result<(), EstimateError> {
        let n = self.n;
        let s = 2 * n + 1;
        let m = z.len();
        check_measurements(m, M, 2 * m)?;
        if noise.nrows() != m || noise.ncols() != m {
            return Err(wrong_len("srukf update"));
        }
        log::trace!("srukf update: {m} measurements");

        let mut rbuf = [[T::zero(); M]; M];
        let mut rf = MatrixViewMut::fitted(m, m, rbuf.as_flattened_mut());
        cholesky_semidefinite(noise, &mut rf).map_err(|_| {
            log::warn!("srukf: measurement noise is not positive semidefinite");
            EstimateError::CovarianceNotPD
        })?;

        let mut xs_buf = self.sigma;
        let mut xd_buf = self.dev;
        let mut xs = MatrixViewMut::fitted(n, s, xs_buf.as_flattened_mut().as_flattened_mut());
        let mut xd = MatrixViewMut::fitted(n, s, xd_buf.as_flattened_mut().as_flattened_mut());
        if self.updated {
            self.sigmas(&mut xs)?;
            sigma::deviations(&xs, &self.x[..n], &mut xd)?;
        }

        let mut z_mean = [T::zero(); M];
        let mut z_points = sigma::zeroed::<T, M, N>();
        let mut z_dev = sigma::zeroed::<T, M, N>();
        let mut zp = MatrixViewMut::fitted(m, s, z_points.as_flattened_mut().as_flattened_mut());
        let mut zd = MatrixViewMut::fitted(m, s, z_dev.as_flattened_mut().as_flattened_mut());
        sigma::propagate(h, &xs, self.weights.wm(), &mut zp, &mut z_mean[..m])?;
        sigma::deviations(&zp, &z_mean[..m], &mut zd)?;

        // measurement factor Sz
        let mut stage = [[[T::zero(); M]; N]; 2];
        let mut square = [[[T::zero(); M]; M]; 2];
        let mut sz = [[T::zero(); M]; M];
        let mut sz = MatrixViewMut::fitted(m, m, sz.as_flattened_mut());
        sigma::factor_deviations(
            &zd,
            self.weights.wc(),
            Some(&rf),
            stage.as_flattened_mut().as_flattened_mut(),
            square.as_flattened_mut().as_flattened_mut(),
            &mut sz,
        )?;

        let mut pxz = [[T::zero(); M]; N];
        let mut pxz = MatrixViewMut::fitted(n, m, pxz.as_flattened_mut());
        sigma::weighted_product(&xd, self.weights.wc(), &zd, &mut pxz)?;

        let mut k = [[T::zero(); M]; N];
        let mut k = MatrixViewMut::fitted(n, m, k.as_flattened_mut());
        divide_factored(&pxz, &sz, &mut k)?;

        let mut innovation = [T::zero(); M];
        for ((v, &zi), &zh) in innovation.iter_mut().zip(z).zip(&z_mean[..m]) {
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

        // S·Sᵀ − (K·Sz)·(K·Sz)ᵀ, one column at a time
        let mut u = [[T::zero(); M]; N];
        let mut u = MatrixViewMut::fitted(n, m, u.as_flattened_mut());
        multiply(&k, &sz, &mut u)?;
        let mut s_new = self.s;
        if !downdate(&mut s_new, n, &u)? {
            // a (near) noiseless measurement leaves the covariance singular
            log::debug!("srukf: downdate reached a zero pivot, refactoring");
            let mut p = [[T::zero(); N]; N];
            let mut pv = MatrixViewMut::fitted(n, n, p.as_flattened_mut());
            multiply_transposed(&self.factor(), &self.factor(), &mut pv)?;
            let mut uu = [[T::zero(); N]; N];
            let mut uv = MatrixViewMut::fitted(n, n, uu.as_flattened_mut());
            multiply_transposed(&u, &u, &mut uv)?;
            pv.sub_block(&uv.as_view(), 0, 0)?;
            cholesky_semidefinite(&pv, &mut MatrixViewMut::fitted(n, n, s_new.as_flattened_mut()))
                .map_err(|_| {
                    log::warn!("srukf: updated covariance is not positive semidefinite");
                    EstimateError::CovarianceNotPD
                })?;
        }

        self.x = x;
        self.s = s_new;
        self.sigma = xs_buf;
        self.dev = xd_buf;
        self.updated = true;
        Ok(())
    }
}

impl<T: FloatScalar, const N: usize, const M: usize> Estimator<T> for SrUkf<T, N, M> {
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

/// Downdate `s` by every column of `u`. Returns `false` (with `s` partly
/// modified) when a pivot vanishes.
fn downdate<T: FloatScalar, const N: usize>(
    s: &mut [[T; N]; N],
    n: usize,
    u: &impl MatrixRef<T>,
) -> Result<bool, EstimateError> {
    let mut sv = MatrixViewMut::fitted(n, n, s.as_flattened_mut());
    let mut v = [T::zero(); N];
    for j in 0..u.ncols() {
        col_into(u, j, &mut v[..n])?;
        if cholesky_update(&mut sv, &mut v[..n], Sign::Minus).is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}

//! Scaled sigma points and the pieces of the unscented transform shared by
//! [`Ukf`](super::Ukf) and [`SrUkf`](super::SrUkf).

use crate::linalg::{cholesky_update, qr_triangularize, Sign};
use crate::matrix::{col_into, MatrixError, MAX_DIM};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::{MatrixView, MatrixViewMut};

use super::EstimateError;

/// Inline storage for a block of up to `3·R·C` elements, enough for an
/// `r × (2n + 1)` sigma matrix with `r ≤ R` and `n ≤ C`.
pub(crate) type SigmaBuf<T, const R: usize, const C: usize> = [[[T; C]; R]; 3];

#[inline]
pub(crate) fn zeroed<T: FloatScalar, const R: usize, const C: usize>() -> SigmaBuf<T, R, C> {
    [[[T::zero(); C]; R]; 3]
}

/// Scaling of the sigma-point spread.
///
/// - `alpha`: spread around the mean (typically 1e-4 to 1)
/// - `beta`: prior knowledge of the distribution (2 is optimal for Gaussians)
/// - `kappa`: secondary scaling (typically 0 or 3 − n)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaParams<T> {
    pub alpha: T,
    pub beta: T,
    pub kappa: T,
}

impl<T: FloatScalar> Default for SigmaParams<T> {
    fn default() -> Self {
        Self {
            alpha: T::lit(1e-3),
            beta: T::lit(2.0),
            kappa: T::zero(),
        }
    }
}

/// Mean and covariance weights for `2n + 1` points, derived once.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Weights<T, const N: usize> {
    pub(crate) params: SigmaParams<T>,
    pub(crate) lambda: T,
    /// `sqrt(n + lambda)`
    pub(crate) c: T,
    count: usize,
    wm: [[T; N]; 3],
    wc: [[T; N]; 3],
}

impl<T: FloatScalar, const N: usize> Weights<T, N> {
    pub(crate) fn new(n: usize, params: SigmaParams<T>) -> Result<Self, EstimateError> {
        let SigmaParams { alpha, beta, kappa } = params;
        let nf = T::from_dim(n);
        let lambda = alpha * alpha * (nf + kappa) - nf;
        let spread = nf + lambda;
        if spread <= T::zero() || spread.is_nan() {
            log::debug!("sigma weights: n + lambda = {spread:?} is not positive");
            return Err(EstimateError::InvalidParameters);
        }

        let count = 2 * n + 1;
        let mut wm = [[T::zero(); N]; 3];
        let mut wc = [[T::zero(); N]; 3];
        let wi = T::lit(0.5) / spread;
        for (m, c) in wm.as_flattened_mut()[..count]
            .iter_mut()
            .zip(&mut wc.as_flattened_mut()[..count])
        {
            *m = wi;
            *c = wi;
        }
        let w0 = lambda / spread;
        wm.as_flattened_mut()[0] = w0;
        wc.as_flattened_mut()[0] = w0 + (T::one() - alpha * alpha + beta);

        Ok(Self {
            params,
            lambda,
            c: spread.sqrt(),
            count,
            wm,
            wc,
        })
    }

    #[inline]
    pub(crate) fn wm(&self) -> &[T] {
        &self.wm.as_flattened()[..self.count]
    }

    #[inline]
    pub(crate) fn wc(&self) -> &[T] {
        &self.wc.as_flattened()[..self.count]
    }
}

/// `out = [x, x + c·a, x − c·a]`, scaling `a` in place.
///
/// `a` is an `n × n` square root of the covariance and `out` is
/// `n × (2n + 1)`.
pub(crate) fn spread<T: FloatScalar>(
    x: &[T],
    a: &mut MatrixViewMut<'_, T>,
    c: T,
    out: &mut MatrixViewMut<'_, T>,
) -> Result<(), MatrixError> {
    let n = x.len();
    a.scale(c);
    for k in 0..out.ncols() {
        out.set_col(k, x)?;
    }
    out.add_block(&a.as_view(), 0, 1)?;
    out.sub_block(&a.as_view(), 0, n + 1)?;
    Ok(())
}

/// Push every column of `sigma` through `f` into `points` and accumulate the
/// `wm`-weighted mean.
///
/// `f` receives one sigma point and must fill an output of `mean.len()`
/// elements, which starts zeroed.
pub(crate) fn propagate<T: FloatScalar>(
    mut f: impl FnMut(&[T], &mut [T]),
    sigma: &impl MatrixRef<T>,
    wm: &[T],
    points: &mut MatrixViewMut<'_, T>,
    mean: &mut [T],
) -> Result<(), MatrixError> {
    let (n, s, l) = (sigma.nrows(), sigma.ncols(), mean.len());
    if wm.len() != s || points.nrows() != l || points.ncols() != s {
        return Err(crate::matrix::mismatch("propagate"));
    }

    let mut input = [T::zero(); MAX_DIM];
    let mut output = [T::zero(); MAX_DIM];
    mean.fill(T::zero());
    for (k, &w) in wm.iter().enumerate() {
        col_into(sigma, k, &mut input[..n])?;
        output[..l].fill(T::zero());
        f(&input[..n], &mut output[..l]);
        points.set_col(k, &output[..l])?;
        for (m, &y) in mean.iter_mut().zip(&output[..l]) {
            *m = *m + w * y;
        }
    }
    Ok(())
}

/// `dev = points − mean` column by column.
pub(crate) fn deviations<T: FloatScalar>(
    points: &impl MatrixRef<T>,
    mean: &[T],
    dev: &mut MatrixViewMut<'_, T>,
) -> Result<(), MatrixError> {
    let mean = MatrixView::column(mean)?;
    dev.copy_from(points, 0, 0)?;
    for k in 0..points.ncols() {
        dev.sub_block(&mean, 0, k)?;
    }
    Ok(())
}

/// `out = a·diag(w)·bᵀ`, the weighted outer-product sum over sigma columns.
pub(crate) fn weighted_product<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    w: &[T],
    b: &impl MatrixRef<T>,
    out: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let s = w.len();
    if a.ncols() != s || b.ncols() != s || out.nrows() != a.nrows() || out.ncols() != b.nrows() {
        return Err(crate::matrix::mismatch("weighted_product"));
    }
    out.as_mut_slice().fill(T::zero());
    for (k, &wk) in w.iter().enumerate() {
        for i in 0..a.nrows() {
            let aw = *a.get(i, k) * wk;
            for j in 0..b.nrows() {
                let o = out.get_mut(i, j);
                *o = *o + aw * *b.get(j, k);
            }
        }
    }
    Ok(())
}

/// Outputs of one unscented transform.
pub(crate) struct Moments<'a, T> {
    pub(crate) mean: &'a mut [T],
    pub(crate) cov: MatrixViewMut<'a, T>,
    pub(crate) points: MatrixViewMut<'a, T>,
    pub(crate) dev: MatrixViewMut<'a, T>,
}

/// Transform `sigma` through `f`: weighted mean, transformed points, their
/// deviations, and `cov = dev·diag(wc)·devᵀ + noise`.
pub(crate) fn unscented_transform<T: FloatScalar, const N: usize>(
    f: impl FnMut(&[T], &mut [T]),
    sigma: &impl MatrixRef<T>,
    weights: &Weights<T, N>,
    noise: Option<&MatrixView<'_, T>>,
    out: &mut Moments<'_, T>,
) -> Result<(), MatrixError> {
    propagate(f, sigma, weights.wm(), &mut out.points, &mut *out.mean)?;
    deviations(&out.points, &*out.mean, &mut out.dev)?;
    weighted_product(&out.dev, weights.wc(), &out.dev, &mut out.cov)?;
    if let Some(q) = noise {
        out.cov.add_block(q, 0, 0)?;
    }
    Ok(())
}

/// Square-root form of the unscented covariance.
///
/// Writes into `s` (`l × l`) the lower factor of
/// `Σᵢ wc[i]·devᵢ·devᵢᵀ + noise·noiseᵀ`, where `noise` is itself a lower
/// factor. The equal-weight columns `1..` are stacked as rows together with
/// the noise factor and triangularized by QR (first the deviations into
/// `stage`, then the resulting `R` with the noise rows into `square`); the
/// central column follows as a rank-1 update or downdate by the sign of
/// `wc[0]`.
///
/// `stage` needs `(s − 1)·l` elements, `square` needs `2l·l`.
pub(crate) fn factor_deviations<T: FloatScalar>(
    dev: &impl MatrixRef<T>,
    wc: &[T],
    noise: Option<&impl MatrixRef<T>>,
    stage: &mut [T],
    square: &mut [T],
    s: &mut MatrixViewMut<'_, T>,
) -> Result<(), EstimateError> {
    let (l, cols) = (dev.nrows(), dev.ncols());
    if cols == 0 || wc.len() != cols || s.nrows() != l || s.ncols() != l {
        return Err(super::wrong_len("factor_deviations"));
    }
    let spread = cols - 1;

    let mut a = MatrixViewMut::new(spread, l, stage)?;
    if let Some(&wi) = wc.get(1) {
        let sw = wi.sqrt();
        for i in 0..spread {
            for j in 0..l {
                a[(i, j)] = sw * *dev.get(j, i + 1);
            }
        }
        qr_triangularize(&mut a)?;
    }

    let mut b = MatrixViewMut::new(2 * l, l, square)?;
    b.zero();
    for i in 0..spread.min(l) {
        for j in i..l {
            b[(i, j)] = a[(i, j)];
        }
    }
    if let Some(q) = noise {
        if q.nrows() != l || q.ncols() != l {
            return Err(super::wrong_len("factor_deviations"));
        }
        // row l + i of the stack is column i of the noise factor
        for i in 0..l {
            for j in 0..l {
                b[(l + i, j)] = *q.get(j, i);
            }
        }
    }
    qr_triangularize(&mut b)?;

    for i in 0..l {
        for j in 0..l {
            s[(i, j)] = if j <= i { b[(j, i)] } else { T::zero() };
        }
    }

    let w0 = wc[0];
    let root = w0.abs().sqrt();
    let mut v = [T::zero(); MAX_DIM];
    for (i, vi) in v[..l].iter_mut().enumerate() {
        *vi = root * *dev.get(i, 0);
    }
    cholesky_update(s, &mut v[..l], Sign::of(w0)).map_err(|_| {
        log::warn!("factor_deviations: central-point update lost positive definiteness");
        EstimateError::CovarianceNotPD
    })
}

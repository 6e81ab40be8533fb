use crate::matrix::{mismatch, MatrixError, MAX_DIM};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

/// Reflect column `col` of `a` (rows `col..m`) onto the axis and apply the
/// same reflection to every later column.
///
/// Uses `H = I - tau·v·vᵀ` with `v[0] = 1` stored in `v[..m - col]`. Returns
/// `tau`, which is zero when the sub-column is already zero (no reflection).
fn householder_step<T: FloatScalar>(a: &mut impl MatrixMut<T>, col: usize, v: &mut [T]) -> T {
    let m = a.nrows();
    let n = a.ncols();

    // Compute the squared norm of the sub-column a[col:m, col]
    let mut norm_sq = T::zero();
    for i in col..m {
        let x = *a.get(i, col);
        norm_sq = norm_sq + x * x;
    }
    if norm_sq == T::zero() {
        return T::zero();
    }

    let norm = norm_sq.sqrt();
    let x0 = *a.get(col, col);
    // sigma carries the sign of x0 so that v0 = x0 + sigma avoids cancellation
    let sigma = if x0 < T::zero() { -norm } else { norm };
    let v0 = x0 + sigma;
    let tau = v0 / sigma;

    v[0] = T::one();
    for i in (col + 1)..m {
        v[i - col] = *a.get(i, col) / v0;
    }

    // Apply H to trailing columns: A[col:m, j] -= tau * v * (vᵀ * A[col:m, j])
    for j in (col + 1)..n {
        let mut dot = T::zero();
        for i in col..m {
            dot = dot + v[i - col] * *a.get(i, j);
        }
        dot = dot * tau;
        for i in col..m {
            let old = *a.get(i, j);
            *a.get_mut(i, j) = old - dot * v[i - col];
        }
    }

    *a.get_mut(col, col) = -sigma;
    for i in (col + 1)..m {
        *a.get_mut(i, col) = T::zero();
    }
    tau
}

/// QR decomposition by Householder reflections: `a = q·r`.
///
/// `a` is `m × n` and left untouched; `q` must be `m × m` and receives the
/// orthogonal factor; `r` must be `m × n` and receives the upper-triangular
/// factor. Reflections are applied to `q` and `r` as they are formed, so the
/// only scratch is one reflector of at most `MAX_DIM` elements. A zero
/// sub-column is skipped, so rank-deficient input still factors.
///
/// ```
/// use sigmakit::{linalg, matrix, MatrixView, MatrixViewMut};
///
/// let a = MatrixView::new(3, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0]).unwrap();
/// let (mut qb, mut rb, mut back) = ([0.0; 9], [0.0; 6], [0.0; 6]);
/// let mut q = MatrixViewMut::new(3, 3, &mut qb).unwrap();
/// let mut r = MatrixViewMut::new(3, 2, &mut rb).unwrap();
/// linalg::qr(&a, &mut q, &mut r).unwrap();
///
/// let mut qr = MatrixViewMut::new(3, 2, &mut back).unwrap();
/// matrix::multiply(&q, &r, &mut qr).unwrap();
/// assert!(matrix::max_abs_diff(&qr, &a).unwrap() < 1e-12);
/// ```
pub fn qr<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    q: &mut impl MatrixMut<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let (m, n) = (a.nrows(), a.ncols());
    if q.nrows() != m || q.ncols() != m || r.nrows() != m || r.ncols() != n {
        return Err(mismatch("qr"));
    }

    r.as_mut_slice().copy_from_slice(a.as_slice());
    for i in 0..m {
        for j in 0..m {
            *q.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }

    let mut v = [T::zero(); MAX_DIM];
    for col in 0..m.min(n) {
        let tau = householder_step(r, col, &mut v);
        if tau == T::zero() {
            continue;
        }
        // Q = H1·H2·…: apply H from the right, row by row
        for i in 0..m {
            let mut dot = T::zero();
            for k in col..m {
                dot = dot + *q.get(i, k) * v[k - col];
            }
            dot = dot * tau;
            for k in col..m {
                let old = *q.get(i, k);
                *q.get_mut(i, k) = old - dot * v[k - col];
            }
        }
    }
    Ok(())
}

/// Triangularize `a` in place, keeping only `R`.
///
/// On return the top `min(m, n)` rows of `a` hold an upper-triangular `R`
/// with a non-negative diagonal and everything below is zero, so that
/// `Rᵀ·R = Aᵀ·A`. This is the form needed to rebuild a square-root
/// covariance factor from stacked, weighted deviations.
pub fn qr_triangularize<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), MatrixError> {
    let (m, n) = (a.nrows(), a.ncols());
    let mut v = [T::zero(); MAX_DIM];
    for col in 0..m.min(n) {
        householder_step(a, col, &mut v);
    }
    // Flipping a row of R is a column flip of Q and leaves Rᵀ·R unchanged.
    for i in 0..m.min(n) {
        if *a.get(i, i) < T::zero() {
            for j in i..n {
                let x = *a.get(i, j);
                *a.get_mut(i, j) = -x;
            }
        }
    }
    Ok(())
}

use crate::matrix::{mismatch, require_square, MatrixError};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

// ---------------------------------------------------------------------------
// Factorization
// ---------------------------------------------------------------------------

/// Left-looking factorization of the lower triangle.
///
/// Column `j` is reduced by every earlier column, checked, then scaled.
/// Only entries on or below the diagonal are read or written. On failure
/// returns the index of the offending column: columns before it hold `L`,
/// the diagonal of that column holds the reduced pivot, and columns after
/// it are untouched.
fn factor_lower<T: FloatScalar>(a: &mut impl MatrixMut<T>, n: usize) -> Result<(), usize> {
    for j in 0..n {
        for k in 0..j {
            let ljk = *a.get(j, k);
            for i in j..n {
                let v = *a.get(i, j) - *a.get(i, k) * ljk;
                *a.get_mut(i, j) = v;
            }
        }

        let diag = *a.get(j, j);
        if diag <= T::zero() {
            return Err(j);
        }
        let inv_ljj = T::one() / diag.sqrt();
        for i in j..n {
            let v = *a.get(i, j) * inv_ljj;
            *a.get_mut(i, j) = v;
        }
    }
    Ok(())
}

/// Undo [`factor_lower`] up to column `done` (exclusive), with column
/// `done` itself only reduced (the failure layout). The strict upper
/// triangle must still hold the original matrix.
fn restore_lower<T: FloatScalar>(a: &mut impl MatrixMut<T>, n: usize, done: usize) {
    for i in 0..n {
        if i <= done {
            let last = if i < done { i + 1 } else { i };
            let mut t = if i < done { T::zero() } else { *a.get(i, i) };
            for k in 0..last {
                let l = *a.get(i, k);
                t = t + l * l;
            }
            *a.get_mut(i, i) = t;
        }
        for j in 0..i {
            *a.get_mut(i, j) = *a.get(j, i);
        }
    }
}

fn clear_upper<T: FloatScalar>(a: &mut impl MatrixMut<T>, n: usize) {
    for i in 0..n {
        for j in (i + 1)..n {
            *a.get_mut(i, j) = T::zero();
        }
    }
}

/// Cholesky decomposition in place: `A = L·Lᵀ`.
///
/// On success the lower triangle of `a` (including the diagonal) holds `L`.
/// With `zero = true` the strict upper triangle is then cleared; with
/// `zero = false` it keeps the original matrix, which is what
/// [`cholesky_restore`] needs.
///
/// On a non-positive pivot returns [`MatrixError::NotPositiveDefinite`]. The
/// columns processed before the failing one keep their factor values and the
/// upper triangle is never cleared in that case.
///
/// ```
/// use sigmakit::{linalg, MatrixViewMut};
///
/// let mut buf = [4.0_f64, 2.0, 2.0, 3.0];
/// let mut a = MatrixViewMut::new(2, 2, &mut buf).unwrap();
/// linalg::cholesky_in_place(&mut a, true).unwrap();
/// assert_eq!(a[(0, 0)], 2.0);
/// assert_eq!(a[(1, 0)], 1.0);
/// assert_eq!(a[(0, 1)], 0.0);
/// ```
pub fn cholesky_in_place<T: FloatScalar>(
    a: &mut impl MatrixMut<T>,
    zero: bool,
) -> Result<(), MatrixError> {
    let n = require_square("cholesky_in_place", &*a)?;
    factor_lower(a, n).map_err(|j| {
        log::warn!("cholesky: non-positive pivot at column {j}");
        MatrixError::NotPositiveDefinite
    })?;
    if zero {
        clear_upper(a, n);
    }
    Ok(())
}

/// Cholesky decomposition into a separate output: `a = l·lᵀ`.
///
/// `l` receives the full lower factor with zeros above the diagonal. `a` is
/// read only.
pub fn cholesky<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    l: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = require_square("cholesky", a)?;
    if l.nrows() != n || l.ncols() != n {
        return Err(mismatch("cholesky"));
    }
    l.as_mut_slice().copy_from_slice(a.as_slice());
    factor_lower(l, n).map_err(|j| {
        log::warn!("cholesky: non-positive pivot at column {j}");
        MatrixError::NotPositiveDefinite
    })?;
    clear_upper(l, n);
    Ok(())
}

/// Cholesky factor of a positive-semidefinite `a`: `a = l·lᵀ`.
///
/// A pivot within `sqrt(ε)·max|aᵢᵢ|` of zero is taken as an exact zero and
/// its column of `l` is written as zeros, so rank-deficient inputs such as
/// `g·gᵀ` or an all-zero matrix factor. A pivot below that band returns
/// [`MatrixError::NotPositiveDefinite`]; `l` is then partially written.
///
/// ```
/// use sigmakit::{linalg, MatrixView, MatrixViewMut};
///
/// // rank 1: [1, 2]ᵀ·[1, 2]
/// let a = MatrixView::new(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]).unwrap();
/// let mut buf = [0.0; 4];
/// let mut l = MatrixViewMut::new(2, 2, &mut buf).unwrap();
/// linalg::cholesky_semidefinite(&a, &mut l).unwrap();
/// assert_eq!(buf, [1.0, 0.0, 2.0, 0.0]);
/// ```
pub fn cholesky_semidefinite<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    l: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = require_square("cholesky_semidefinite", a)?;
    if l.nrows() != n || l.ncols() != n {
        return Err(mismatch("cholesky_semidefinite"));
    }
    l.as_mut_slice().copy_from_slice(a.as_slice());

    let mut scale = T::zero();
    for i in 0..n {
        scale = scale.max(a.get(i, i).abs());
    }
    let tol = T::epsilon().sqrt() * scale;

    for j in 0..n {
        for k in 0..j {
            let ljk = *l.get(j, k);
            for i in j..n {
                let v = *l.get(i, j) - *l.get(i, k) * ljk;
                *l.get_mut(i, j) = v;
            }
        }

        let diag = *l.get(j, j);
        if diag > tol {
            let inv_ljj = T::one() / diag.sqrt();
            for i in j..n {
                let v = *l.get(i, j) * inv_ljj;
                *l.get_mut(i, j) = v;
            }
        } else if diag >= -tol {
            for i in j..n {
                *l.get_mut(i, j) = T::zero();
            }
        } else {
            log::warn!("cholesky_semidefinite: negative pivot at column {j}");
            return Err(MatrixError::NotPositiveDefinite);
        }
    }
    clear_upper(l, n);
    Ok(())
}

/// Rebuild the symmetric matrix from a factor produced by
/// [`cholesky_in_place`] with `zero = false`.
///
/// The diagonal is recomputed from `L` and the lower triangle is mirrored
/// back from the preserved upper triangle.
pub fn cholesky_restore<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), MatrixError> {
    let n = require_square("cholesky_restore", &*a)?;
    restore_lower(a, n, n);
    Ok(())
}

/// Rebuild `A = L·Lᵀ` from a factor whose upper triangle has been cleared
/// (or never held the original).
///
/// Rows are rebuilt from the bottom up so that each row of `L` is still
/// intact when it is needed.
pub fn cholesky_restore_full<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), MatrixError> {
    let n = require_square("cholesky_restore_full", &*a)?;
    // A(i,j) = Σ_{k ≤ j} L(i,k)·L(j,k) for j ≤ i. Entry (i,j) depends only on
    // rows i and j of L with j ≤ i, so going down-up and right-left inside a
    // row never reads an overwritten value.
    for i in (0..n).rev() {
        for j in (0..=i).rev() {
            let mut t = T::zero();
            for k in 0..=j {
                t = t + *a.get(i, k) * *a.get(j, k);
            }
            *a.get_mut(i, j) = t;
            *a.get_mut(j, i) = t;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Triangular solves
// ---------------------------------------------------------------------------

fn check_diag<T: FloatScalar>(op: &'static str, l: &impl MatrixRef<T>, n: usize) -> Result<(), MatrixError> {
    for i in 0..n {
        if *l.get(i, i) == T::zero() {
            log::warn!("{op}: zero on the diagonal at {i}");
            return Err(MatrixError::Singular);
        }
    }
    Ok(())
}

/// Solve `L·y = x` in place, where `L` is the lower triangle of `l`.
#[inline]
pub(crate) fn forward_substitute<T: FloatScalar>(l: &impl MatrixRef<T>, x: &mut [T]) {
    let n = x.len();
    for i in 0..n {
        let mut sum = x[i];
        for j in 0..i {
            sum = sum - *l.get(i, j) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Solve `Lᵀ·y = x` in place, where `L` is the lower triangle of `l`.
#[inline]
pub(crate) fn back_substitute_lt<T: FloatScalar>(l: &impl MatrixRef<T>, x: &mut [T]) {
    let n = x.len();
    for i in (0..n).rev() {
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum = sum - *l.get(j, i) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

// ---------------------------------------------------------------------------
// Inverses
// ---------------------------------------------------------------------------

/// Invert a lower-triangular matrix in place (lower triangle only).
///
/// The strict upper triangle is neither read nor written.
pub fn triangular_inverse_in_place<T: FloatScalar>(
    l: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = require_square("triangular_inverse_in_place", &*l)?;
    check_diag("triangular_inverse_in_place", &*l, n)?;
    // Column i of the inverse is built top-down; entries (k, i) with k < j are
    // already inverted while (j, k) with k > i still hold L.
    for i in 0..n {
        let inv = T::one() / *l.get(i, i);
        *l.get_mut(i, i) = inv;
        for j in (i + 1)..n {
            let mut t = T::zero();
            for k in i..j {
                t = t - *l.get(j, k) * *l.get(k, i);
            }
            let v = t / *l.get(j, j);
            *l.get_mut(j, i) = v;
        }
    }
    Ok(())
}

/// Inverse of the lower triangle of `l` into `r` (upper triangle of `r` is
/// zeroed).
pub fn triangular_inverse<T: FloatScalar>(
    l: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = require_square("triangular_inverse", l)?;
    if r.nrows() != n || r.ncols() != n {
        return Err(mismatch("triangular_inverse"));
    }
    check_diag("triangular_inverse", l, n)?;
    for x in r.as_mut_slice() {
        *x = T::zero();
    }
    for i in 0..n {
        *r.get_mut(i, i) = T::one() / *l.get(i, i);
        for j in (i + 1)..n {
            let mut t = T::zero();
            for k in i..j {
                t = t - *l.get(j, k) * *r.get(k, i);
            }
            *r.get_mut(j, i) = t / *l.get(j, j);
        }
    }
    Ok(())
}

/// Invert a symmetric positive-definite matrix in place.
///
/// Factor, invert the factor, then form `inv(L)ᵀ·inv(L)` in the lower
/// triangle and mirror it into the upper one. If the factorization fails the
/// matrix is restored to its original values.
///
/// ```
/// use sigmakit::{linalg, MatrixViewMut};
///
/// let mut buf = [4.0_f64, 2.0, 2.0, 3.0];
/// let mut a = MatrixViewMut::new(2, 2, &mut buf).unwrap();
/// linalg::inverse_in_place(&mut a).unwrap();
/// // inv([[4,2],[2,3]]) = [[3,-2],[-2,4]] / 8
/// assert!((a[(0, 0)] - 0.375).abs() < 1e-12);
/// assert!((a[(0, 1)] + 0.25).abs() < 1e-12);
/// ```
pub fn inverse_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), MatrixError> {
    let n = require_square("inverse_in_place", &*a)?;
    if let Err(j) = factor_lower(a, n) {
        log::warn!("inverse: non-positive pivot at column {j}");
        restore_lower(a, n, j);
        return Err(MatrixError::NotPositiveDefinite);
    }
    // positive pivots, so the triangular inverse cannot fail
    triangular_inverse_in_place(a)?;

    // inv(A)(i,j) = Σ_{k ≥ i} M(k,i)·M(k,j), j ≤ i, M = inv(L). Row i of M
    // is dead once row i of the result is written, and (i,i) is written last.
    for i in 0..n {
        for j in 0..=i {
            let mut t = T::zero();
            for k in i..n {
                t = t + *a.get(k, i) * *a.get(k, j);
            }
            *a.get_mut(i, j) = t;
        }
    }
    for i in 0..n {
        for j in (i + 1)..n {
            *a.get_mut(i, j) = *a.get(j, i);
        }
    }
    Ok(())
}

/// Inverse of a symmetric positive-definite `a` into `r`.
///
/// `a` is factored in place for the duration of the call and restored
/// before returning, on success and on failure alike.
pub fn inverse<T: FloatScalar>(
    a: &mut impl MatrixMut<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = require_square("inverse", &*a)?;
    if r.nrows() != n || r.ncols() != n {
        return Err(mismatch("inverse"));
    }
    if let Err(j) = factor_lower(a, n) {
        log::warn!("inverse: non-positive pivot at column {j}");
        restore_lower(a, n, j);
        return Err(MatrixError::NotPositiveDefinite);
    }
    let out = r.as_mut_slice();
    for c in 0..n {
        let row = &mut out[c * n..(c + 1) * n];
        for (i, x) in row.iter_mut().enumerate() {
            *x = if i == c { T::one() } else { T::zero() };
        }
        forward_substitute(&*a, row);
        back_substitute_lt(&*a, row);
    }
    restore_lower(a, n, n);
    Ok(())
}

// ---------------------------------------------------------------------------
// Right division
// ---------------------------------------------------------------------------

fn check_divide<T>(op: &'static str, a: &impl MatrixRef<T>, b: &impl MatrixRef<T>, r: &impl MatrixRef<T>) -> Result<usize, MatrixError> {
    let n = require_square(op, b)?;
    if a.ncols() != n || r.nrows() != a.nrows() || r.ncols() != n {
        return Err(mismatch(op));
    }
    Ok(n)
}

fn solve_rows<T: FloatScalar>(a: &impl MatrixRef<T>, l: &impl MatrixRef<T>, r: &mut impl MatrixMut<T>, n: usize) {
    if n == 0 {
        return;
    }
    r.as_mut_slice().copy_from_slice(a.as_slice());
    for row in r.as_mut_slice().chunks_exact_mut(n) {
        forward_substitute(l, row);
        back_substitute_lt(l, row);
    }
}

/// Right division `r = a·inv(b)` for symmetric positive-definite `b`.
///
/// Each row of `r` solves `b·xᵀ = aᵀ` by forward then backward substitution
/// against the Cholesky factor of `b`. `b` is factored in place and restored
/// before returning, on both paths; on failure `r` is not written.
///
/// ```
/// use sigmakit::{linalg, MatrixView, MatrixViewMut};
///
/// let a = MatrixView::new(1, 2, &[8.0_f64, 7.0]).unwrap();
/// let mut bbuf = [4.0, 2.0, 2.0, 3.0];
/// let mut b = MatrixViewMut::new(2, 2, &mut bbuf).unwrap();
/// let mut rbuf = [0.0; 2];
/// let mut r = MatrixViewMut::new(1, 2, &mut rbuf).unwrap();
/// linalg::divide(&a, &mut b, &mut r).unwrap();
/// assert!((rbuf[0] - 1.25).abs() < 1e-12);
/// assert!((rbuf[1] - 1.5).abs() < 1e-12);
/// // the divisor is handed back restored
/// assert!((bbuf[3] - 3.0).abs() < 1e-12);
/// ```
pub fn divide<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    b: &mut impl MatrixMut<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = check_divide("divide", a, &*b, &*r)?;
    if let Err(j) = factor_lower(b, n) {
        log::warn!("divide: divisor not positive definite (column {j})");
        restore_lower(b, n, j);
        return Err(MatrixError::NotPositiveDefinite);
    }
    solve_rows(a, &*b, r, n);
    restore_lower(b, n, n);
    Ok(())
}

/// Right division `r = a·inv(l·lᵀ)` with `l` already a lower Cholesky
/// factor. Only the lower triangle of `l` is read.
pub fn divide_factored<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    l: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = check_divide("divide_factored", a, l, &*r)?;
    check_diag("divide_factored", l, n)?;
    solve_rows(a, l, r, n);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{max_abs_diff, multiply, multiply_transposed};
    use crate::{MatrixView, MatrixViewMut};

    // A = L·Lᵀ with L rows [1], [2,2], [3,3,3], [4,4,4,4], [5,5,5,5,5]
    const A5: [f64; 25] = [
        1.0, 2.0, 3.0, 4.0, 5.0, //
        2.0, 8.0, 12.0, 16.0, 20.0, //
        3.0, 12.0, 27.0, 36.0, 45.0, //
        4.0, 16.0, 36.0, 64.0, 80.0, //
        5.0, 20.0, 45.0, 80.0, 125.0,
    ];

    fn l5(i: usize, j: usize) -> f64 {
        if j <= i {
            (i + 1) as f64
        } else {
            0.0
        }
    }

    #[test]
    fn factor_5x5_fixture() {
        let mut buf = A5;
        let mut a = MatrixViewMut::new(5, 5, &mut buf).unwrap();
        cholesky_in_place(&mut a, true).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert!((a[(i, j)] - l5(i, j)).abs() < 1e-12, "({i},{j})");
            }
        }
    }

    #[test]
    fn zero_false_keeps_upper_and_restores() {
        let mut buf = A5;
        let mut a = MatrixViewMut::new(5, 5, &mut buf).unwrap();
        cholesky_in_place(&mut a, false).unwrap();
        assert_eq!(a[(0, 4)], 5.0);
        assert_eq!(a[(3, 4)], 80.0);
        assert!((a[(4, 4)] - 5.0).abs() < 1e-12);
        cholesky_restore(&mut a).unwrap();
        let orig = MatrixView::new(5, 5, &A5).unwrap();
        assert!(max_abs_diff(&a, &orig).unwrap() < 1e-12);
    }

    #[test]
    fn restore_full_from_zeroed_factor() {
        let mut buf = A5;
        let mut a = MatrixViewMut::new(5, 5, &mut buf).unwrap();
        cholesky_in_place(&mut a, true).unwrap();
        cholesky_restore_full(&mut a).unwrap();
        let orig = MatrixView::new(5, 5, &A5).unwrap();
        assert!(max_abs_diff(&a, &orig).unwrap() < 1e-12);
    }

    #[test]
    fn out_of_place_reconstructs() {
        let a = MatrixView::new(5, 5, &A5).unwrap();
        let mut lbuf = [9.0; 25];
        let mut l = MatrixViewMut::new(5, 5, &mut lbuf).unwrap();
        cholesky(&a, &mut l).unwrap();
        assert_eq!(l[(0, 1)], 0.0);

        let mut llt = [0.0; 25];
        let mut p = MatrixViewMut::new(5, 5, &mut llt).unwrap();
        multiply_transposed(&l, &l, &mut p).unwrap();
        assert!(max_abs_diff(&p, &a).unwrap() < 1e-12);
    }

    #[test]
    fn not_positive_definite() {
        let mut buf = [1.0, 5.0, 5.0, 1.0];
        let mut a = MatrixViewMut::new(2, 2, &mut buf).unwrap();
        assert_eq!(
            cholesky_in_place(&mut a, true),
            Err(MatrixError::NotPositiveDefinite)
        );
        // upper triangle survives a failed factorization
        assert_eq!(a[(0, 1)], 5.0);
    }

    #[test]
    fn semidefinite_rank_one_and_zero() {
        // g·gᵀ with g = [0.005, 0.1], the white-noise-acceleration shape
        let g = [0.005, 0.1];
        let q = [g[0] * g[0], g[0] * g[1], g[1] * g[0], g[1] * g[1]];
        let a = MatrixView::new(2, 2, &q).unwrap();
        let mut lbuf = [0.0; 4];
        let mut l = MatrixViewMut::new(2, 2, &mut lbuf).unwrap();
        cholesky_semidefinite(&a, &mut l).unwrap();
        assert_eq!(l[(1, 1)], 0.0);
        let mut back = [0.0; 4];
        let mut b = MatrixViewMut::new(2, 2, &mut back).unwrap();
        multiply_transposed(&l, &l, &mut b).unwrap();
        assert!(max_abs_diff(&b, &a).unwrap() < 1e-15);

        let z = MatrixView::new(1, 1, &[0.0]).unwrap();
        let mut zb = [7.0];
        cholesky_semidefinite(&z, &mut MatrixViewMut::new(1, 1, &mut zb).unwrap()).unwrap();
        assert_eq!(zb, [0.0]);
    }

    #[test]
    fn semidefinite_matches_strict_on_spd_and_rejects_indefinite() {
        let a = MatrixView::new(5, 5, &A5).unwrap();
        let (mut strict, mut semi) = ([0.0; 25], [0.0; 25]);
        cholesky(&a, &mut MatrixViewMut::new(5, 5, &mut strict).unwrap()).unwrap();
        cholesky_semidefinite(&a, &mut MatrixViewMut::new(5, 5, &mut semi).unwrap()).unwrap();
        assert_eq!(strict, semi);

        let bad = MatrixView::new(2, 2, &[1.0, 0.0, 0.0, -1.0]).unwrap();
        let mut buf = [0.0; 4];
        assert_eq!(
            cholesky_semidefinite(&bad, &mut MatrixViewMut::new(2, 2, &mut buf).unwrap()),
            Err(MatrixError::NotPositiveDefinite)
        );
    }

    #[test]
    fn non_square_rejected() {
        let mut buf = [1.0; 6];
        let mut a = MatrixViewMut::new(2, 3, &mut buf).unwrap();
        assert_eq!(cholesky_in_place(&mut a, true), Err(MatrixError::NotSquare));
        assert_eq!(buf, [1.0; 6]);
    }

    #[test]
    fn inverse_5x5_fixture() {
        let mut buf = A5;
        let mut a = MatrixViewMut::new(5, 5, &mut buf).unwrap();
        inverse_in_place(&mut a).unwrap();

        let orig = MatrixView::new(5, 5, &A5).unwrap();
        let mut prod = [0.0; 25];
        let mut p = MatrixViewMut::new(5, 5, &mut prod).unwrap();
        multiply(&orig, &a, &mut p).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((p[(i, j)] - expected).abs() < 1e-9, "({i},{j})");
            }
        }
        // symmetric result
        for i in 0..5 {
            for j in 0..i {
                assert_eq!(a[(i, j)], a[(j, i)]);
            }
        }
    }

    #[test]
    fn inverse_out_of_place_restores_input() {
        let mut abuf = A5;
        let mut a = MatrixViewMut::new(5, 5, &mut abuf).unwrap();
        let mut rbuf = [0.0; 25];
        let mut r = MatrixViewMut::new(5, 5, &mut rbuf).unwrap();
        inverse(&mut a, &mut r).unwrap();

        let mut inplace = A5;
        let mut b = MatrixViewMut::new(5, 5, &mut inplace).unwrap();
        inverse_in_place(&mut b).unwrap();
        assert!(max_abs_diff(&r, &b).unwrap() < 1e-9);

        let orig = MatrixView::new(5, 5, &A5).unwrap();
        assert!(max_abs_diff(&a, &orig).unwrap() < 1e-12);
    }

    #[test]
    fn failed_inverse_restores_input() {
        let orig: [f64; 9] = [4.0, 2.0, 1.0, 2.0, 1.0, 3.0, 1.0, 3.0, 2.0];
        let mut buf = orig;
        let mut a = MatrixViewMut::new(3, 3, &mut buf).unwrap();
        assert_eq!(inverse_in_place(&mut a), Err(MatrixError::NotPositiveDefinite));
        for (x, y) in buf.iter().zip(orig.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn triangular_inverse_both_forms() {
        let lbuf: [f64; 9] = [2.0, 0.0, 0.0, 1.0, 3.0, 0.0, -1.0, 2.0, 4.0];
        let l = MatrixView::new(3, 3, &lbuf).unwrap();
        let mut rbuf = [7.0; 9];
        let mut r = MatrixViewMut::new(3, 3, &mut rbuf).unwrap();
        triangular_inverse(&l, &mut r).unwrap();

        let mut prod = [0.0; 9];
        let mut p = MatrixViewMut::new(3, 3, &mut prod).unwrap();
        multiply(&l, &r, &mut p).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((p[(i, j)] - expected).abs() < 1e-12);
            }
        }

        let mut ibuf = lbuf;
        let mut li = MatrixViewMut::new(3, 3, &mut ibuf).unwrap();
        triangular_inverse_in_place(&mut li).unwrap();
        assert!(max_abs_diff(&li, &r).unwrap() < 1e-15);
    }

    #[test]
    fn triangular_inverse_singular() {
        let lbuf = [1.0, 0.0, 1.0, 0.0];
        let mut buf = lbuf;
        let mut l = MatrixViewMut::new(2, 2, &mut buf).unwrap();
        assert_eq!(triangular_inverse_in_place(&mut l), Err(MatrixError::Singular));
        assert_eq!(buf, lbuf);
    }

    #[test]
    fn divide_matches_inverse_product() {
        let a = MatrixView::new(2, 5, &[1.0, 0.0, 2.0, -1.0, 3.0, 0.5, 0.5, 0.5, 0.5, 0.5]).unwrap();
        let mut bbuf = A5;
        let mut b = MatrixViewMut::new(5, 5, &mut bbuf).unwrap();
        let mut rbuf = [0.0; 10];
        let mut r = MatrixViewMut::new(2, 5, &mut rbuf).unwrap();
        divide(&a, &mut b, &mut r).unwrap();

        // r·B = a
        let mut back = [0.0; 10];
        let mut chk = MatrixViewMut::new(2, 5, &mut back).unwrap();
        multiply(&r, &b, &mut chk).unwrap();
        assert!(max_abs_diff(&chk, &a).unwrap() < 1e-9);

        let orig = MatrixView::new(5, 5, &A5).unwrap();
        assert!(max_abs_diff(&b, &orig).unwrap() < 1e-12);
    }

    #[test]
    fn divide_failure_leaves_r_and_b() {
        let a = MatrixView::new(1, 2, &[1.0, 1.0]).unwrap();
        let mut bbuf: [f64; 4] = [1.0, 2.0, 2.0, 1.0];
        let mut b = MatrixViewMut::new(2, 2, &mut bbuf).unwrap();
        let mut rbuf = [-3.0; 2];
        let mut r = MatrixViewMut::new(1, 2, &mut rbuf).unwrap();
        assert_eq!(divide(&a, &mut b, &mut r), Err(MatrixError::NotPositiveDefinite));
        assert_eq!(rbuf, [-3.0; 2]);
        for (x, y) in bbuf.iter().zip([1.0, 2.0, 2.0, 1.0].iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn divide_shape_checks() {
        let a = MatrixView::new(1, 3, &[1.0, 1.0, 1.0]).unwrap();
        let mut bbuf = [1.0, 0.0, 0.0, 1.0];
        let mut b = MatrixViewMut::new(2, 2, &mut bbuf).unwrap();
        let mut rbuf = [0.0; 2];
        let mut r = MatrixViewMut::new(1, 2, &mut rbuf).unwrap();
        assert_eq!(divide(&a, &mut b, &mut r), Err(MatrixError::DimensionMismatch));
    }

    #[test]
    fn divide_factored_agrees() {
        let a = MatrixView::new(1, 5, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let orig = MatrixView::new(5, 5, &A5).unwrap();
        let mut lbuf = [0.0; 25];
        let mut l = MatrixViewMut::new(5, 5, &mut lbuf).unwrap();
        cholesky(&orig, &mut l).unwrap();

        let mut r1 = [0.0; 5];
        let mut r = MatrixViewMut::new(1, 5, &mut r1).unwrap();
        divide_factored(&a, &l, &mut r).unwrap();

        let mut bbuf = A5;
        let mut b = MatrixViewMut::new(5, 5, &mut bbuf).unwrap();
        let mut r2 = [0.0; 5];
        let mut s = MatrixViewMut::new(1, 5, &mut r2).unwrap();
        divide(&a, &mut b, &mut s).unwrap();
        assert!(max_abs_diff(&r, &s).unwrap() < 1e-9);
    }
}

use crate::matrix::{mismatch, require_square, MatrixError, MAX_DIM};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

fn pivot_too_small<T: FloatScalar>(op: &'static str, col: usize, pivot: T) -> MatrixError {
    log::warn!("{op}: pivot {pivot:?} in column {col} is numerically zero");
    MatrixError::Singular
}

fn swap_rows<T: FloatScalar>(a: &mut impl MatrixMut<T>, r0: usize, r1: usize) {
    for j in 0..a.ncols() {
        let tmp = *a.get(r0, j);
        *a.get_mut(r0, j) = *a.get(r1, j);
        *a.get_mut(r1, j) = tmp;
    }
}

/// Doolittle elimination of column `col` below the pivot, storing the
/// multipliers where the eliminated entries were.
fn eliminate<T: FloatScalar>(a: &mut impl MatrixMut<T>, n: usize, col: usize) {
    let inv_pivot = T::one() / *a.get(col, col);
    for i in (col + 1)..n {
        let m = *a.get(i, col) * inv_pivot;
        *a.get_mut(i, col) = m;
        for j in (col + 1)..n {
            let v = *a.get(i, j) - m * *a.get(col, j);
            *a.get_mut(i, j) = v;
        }
    }
}

/// LU decomposition without pivoting, in place.
///
/// On return, `a` contains both L and U packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// Rows are never exchanged, so [`lu_restore`] recovers `A` exactly from the
/// packed form. A numerically zero pivot returns [`MatrixError::Singular`]
/// with the columns before it already eliminated; use [`lu`] for matrices
/// that need pivoting.
///
/// ```
/// use sigmakit::{linalg, MatrixViewMut};
///
/// let mut buf = [4.0_f64, 3.0, 6.0, 3.0];
/// let mut a = MatrixViewMut::new(2, 2, &mut buf).unwrap();
/// linalg::lu_in_place(&mut a).unwrap();
/// assert_eq!(buf, [4.0, 3.0, 1.5, -1.5]);
/// ```
pub fn lu_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), MatrixError> {
    let n = require_square("lu_in_place", &*a)?;
    for col in 0..n {
        let pivot = *a.get(col, col);
        if pivot.abs() < T::epsilon() {
            return Err(pivot_too_small("lu_in_place", col, pivot));
        }
        eliminate(a, n, col);
    }
    Ok(())
}

/// Non-pivoting packed LU of `a` written into `r`; `a` is left untouched.
pub fn lu_packed<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    require_square("lu_packed", a)?;
    if r.nrows() != a.nrows() || r.ncols() != a.ncols() {
        return Err(mismatch("lu_packed"));
    }
    r.as_mut_slice().copy_from_slice(a.as_slice());
    lu_in_place(r)
}

/// Rebuild `A = L·U` in place from the packed form left by [`lu_in_place`].
///
/// ```
/// use sigmakit::{linalg, MatrixViewMut};
///
/// let mut buf = [4.0_f64, 3.0, 1.5, -1.5];
/// let mut a = MatrixViewMut::new(2, 2, &mut buf).unwrap();
/// linalg::lu_restore(&mut a).unwrap();
/// assert_eq!(buf, [4.0, 3.0, 6.0, 3.0]);
/// ```
pub fn lu_restore<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<(), MatrixError> {
    let n = require_square("lu_restore", &*a)?;
    // A(i,j) = Σ_{k ≤ min(i,j)} L(i,k)·U(k,j). Walking rows and columns
    // backwards only ever overwrites entries no remaining sum reads.
    for i in (0..n).rev() {
        for j in (0..n).rev() {
            let kmax = i.min(j);
            let mut t = T::zero();
            for k in 0..kmax {
                t = t + *a.get(i, k) * *a.get(k, j);
            }
            // unit diagonal of L
            let ukj = *a.get(kmax, j);
            t = t + if kmax == i { ukj } else { *a.get(i, kmax) * ukj };
            *a.get_mut(i, j) = t;
        }
    }
    Ok(())
}

/// LU decomposition with partial pivoting: `P·A = L·U`.
///
/// `l` receives the unit lower factor, `u` the upper factor and `p` the row
/// permutation matrix, all `n × n` with zeros outside their structure. `a`
/// is left untouched. A column with no usable pivot returns
/// [`MatrixError::Singular`]; the outputs are then unspecified.
///
/// Returns `true` when the number of row exchanges is even (the sign of
/// `det(P)`).
pub fn lu<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    l: &mut impl MatrixMut<T>,
    u: &mut impl MatrixMut<T>,
    p: &mut impl MatrixMut<T>,
) -> Result<bool, MatrixError> {
    let n = require_square("lu", a)?;
    for out in [(l.nrows(), l.ncols()), (u.nrows(), u.ncols()), (p.nrows(), p.ncols())] {
        if out != (n, n) {
            return Err(mismatch("lu"));
        }
    }

    let mut perm = [0usize; MAX_DIM];
    for (i, slot) in perm.iter_mut().enumerate().take(n) {
        *slot = i;
    }
    let mut even = true;

    u.as_mut_slice().copy_from_slice(a.as_slice());
    for col in 0..n {
        // Partial pivoting: find row with largest magnitude in this column
        let mut max_row = col;
        let mut max_val = u.get(col, col).abs();
        for row in (col + 1)..n {
            let val = u.get(row, col).abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if max_val < T::epsilon() {
            return Err(pivot_too_small("lu", col, max_val));
        }

        if max_row != col {
            perm.swap(col, max_row);
            swap_rows(u, col, max_row);
            even = !even;
        }

        eliminate(u, n, col);
    }

    // Split the packed result.
    for i in 0..n {
        for j in 0..n {
            let (lij, uij) = match i.cmp(&j) {
                core::cmp::Ordering::Greater => (*u.get(i, j), T::zero()),
                core::cmp::Ordering::Equal => (T::one(), *u.get(i, j)),
                core::cmp::Ordering::Less => (T::zero(), *u.get(i, j)),
            };
            *l.get_mut(i, j) = lij;
            *u.get_mut(i, j) = uij;
            *p.get_mut(i, j) = if perm[i] == j { T::one() } else { T::zero() };
        }
    }
    Ok(even)
}

/// Inverse of a general square matrix by Gauss–Jordan elimination with
/// partial pivoting, done in place in `r`.
///
/// Works for non-symmetric matrices where [`super::inverse`] does not apply.
/// The only scratch is a `MAX_DIM` pivot index array. On
/// [`MatrixError::Singular`] the contents of `r` are unspecified.
///
/// ```
/// use sigmakit::{linalg, MatrixView, MatrixViewMut};
///
/// let a = MatrixView::new(2, 2, &[4.0_f64, 7.0, 2.0, 6.0]).unwrap();
/// let mut buf = [0.0; 4];
/// let mut r = MatrixViewMut::new(2, 2, &mut buf).unwrap();
/// linalg::inverse_general(&a, &mut r).unwrap();
/// assert!((buf[0] - 0.6).abs() < 1e-12);
/// assert!((buf[1] + 0.7).abs() < 1e-12);
/// ```
pub fn inverse_general<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = require_square("inverse_general", a)?;
    if r.nrows() != n || r.ncols() != n {
        return Err(mismatch("inverse_general"));
    }
    r.as_mut_slice().copy_from_slice(a.as_slice());

    let mut pivots = [0usize; MAX_DIM];
    for k in 0..n {
        let mut max_row = k;
        let mut max_val = r.get(k, k).abs();
        for row in (k + 1)..n {
            let val = r.get(row, k).abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }
        if max_val < T::epsilon() {
            return Err(pivot_too_small("inverse_general", k, max_val));
        }
        pivots[k] = max_row;
        if max_row != k {
            swap_rows(r, k, max_row);
        }

        let inv_pivot = T::one() / *r.get(k, k);
        *r.get_mut(k, k) = T::one();
        for j in 0..n {
            let v = *r.get(k, j) * inv_pivot;
            *r.get_mut(k, j) = v;
        }
        for i in 0..n {
            if i == k {
                continue;
            }
            let f = *r.get(i, k);
            *r.get_mut(i, k) = T::zero();
            for j in 0..n {
                let v = *r.get(i, j) - f * *r.get(k, j);
                *r.get_mut(i, j) = v;
            }
        }
    }

    // Undo the row exchanges as column exchanges, last first.
    for k in (0..n).rev() {
        let p = pivots[k];
        if p != k {
            for i in 0..n {
                let tmp = *r.get(i, k);
                *r.get_mut(i, k) = *r.get(i, p);
                *r.get_mut(i, p) = tmp;
            }
        }
    }
    Ok(())
}

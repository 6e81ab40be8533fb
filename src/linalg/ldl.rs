use crate::matrix::{mismatch, require_square, MatrixError};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};

/// LDLᵀ decomposition of a symmetric matrix: `a = l·diag(d)·lᵀ`.
///
/// `l` (`n × n`) receives a unit lower-triangular factor with zeros above
/// the diagonal, and `d` (a `1 × n` or `n × 1` view) the diagonal. Only the
/// lower triangle of `a` is read. Unlike Cholesky no square roots are taken,
/// so symmetric indefinite matrices factor as long as no pivot vanishes; a
/// numerically zero `d[j]` returns [`MatrixError::Singular`].
///
/// ```
/// use sigmakit::{linalg, MatrixView, MatrixViewMut};
///
/// let a = MatrixView::new(2, 2, &[4.0_f64, 2.0, 2.0, -1.0]).unwrap();
/// let (mut lb, mut db) = ([0.0; 4], [0.0; 2]);
/// let mut l = MatrixViewMut::new(2, 2, &mut lb).unwrap();
/// let mut d = MatrixViewMut::new(1, 2, &mut db).unwrap();
/// linalg::ldl(&a, &mut l, &mut d).unwrap();
/// assert_eq!(lb, [1.0, 0.0, 0.5, 1.0]);
/// assert_eq!(db, [4.0, -2.0]);
/// ```
pub fn ldl<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    l: &mut impl MatrixMut<T>,
    d: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    let n = require_square("ldl", a)?;
    if l.nrows() != n || l.ncols() != n || !d.is_vector() || d.len() != n {
        return Err(mismatch("ldl"));
    }

    for x in l.as_mut_slice() {
        *x = T::zero();
    }
    let d = d.as_mut_slice();

    for j in 0..n {
        *l.get_mut(j, j) = T::one();

        let mut t = *a.get(j, j);
        for k in 0..j {
            let ljk = *l.get(j, k);
            t = t - d[k] * ljk * ljk;
        }
        if t.abs() < T::epsilon() {
            log::warn!("ldl: zero pivot at {j}");
            return Err(MatrixError::Singular);
        }
        d[j] = t;

        for i in (j + 1)..n {
            let mut t = *a.get(i, j);
            for k in 0..j {
                t = t - d[k] * *l.get(i, k) * *l.get(j, k);
            }
            *l.get_mut(i, j) = t / d[j];
        }
    }
    Ok(())
}

//! Cholesky rank-1 update and downdate.
//!
//! Given lower-triangular `L` where `P = L·Lᵀ`, compute in-place `L'`
//! such that `P' = L'·L'ᵀ = L·Lᵀ ± v·vᵀ`.

use crate::matrix::{mismatch, require_square, MatrixError};
use crate::traits::{FloatScalar, MatrixMut};

/// Direction of a rank-1 modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// `L·Lᵀ + v·vᵀ`
    Plus,
    /// `L·Lᵀ − v·vᵀ`
    Minus,
}

impl Sign {
    /// `+1` or `-1` as a scalar.
    #[inline]
    pub fn value<T: FloatScalar>(self) -> T {
        match self {
            Sign::Plus => T::one(),
            Sign::Minus => -T::one(),
        }
    }

    /// `Plus` for non-negative `x`, `Minus` otherwise.
    #[inline]
    pub fn of<T: FloatScalar>(x: T) -> Self {
        if x < T::zero() {
            Sign::Minus
        } else {
            Sign::Plus
        }
    }
}

/// In-place Cholesky rank-1 update ([`Sign::Plus`]) or downdate
/// ([`Sign::Minus`]).
///
/// `l` must be lower-triangular on entry (upper triangle is ignored/untouched).
/// `v` is used as workspace and is modified in place.
///
/// Algorithm (direct formulation, cf. LINPACK `dchud`/`dchdd`):
///
/// For j = 0..n:
///   1. `r = sqrt(L[j,j]² + sign·v[j]²)`  (fails for downdate if arg < 0)
///   2. `c = r / L[j,j]`, `s = v[j] / L[j,j]`
///   3. `L[j,j] = r`
///   4. For i = j+1..n:
///        `L[i,j] = (L[i,j] + sign·s·v[i]) / c`
///        `v[i]   = c·v[i] - s·L[i,j]_new`
///
/// O(n²), no allocation. Fails with [`MatrixError::NotPositiveDefinite`] on a
/// zero diagonal, a negative radicand or a vanishing new diagonal; `l` then
/// holds the columns already processed.
///
/// ```
/// use sigmakit::linalg::{cholesky_update, Sign};
/// use sigmakit::MatrixViewMut;
///
/// // L = I, add v·vᵀ with v = [1, 0]
/// let mut buf = [1.0_f64, 0.0, 0.0, 1.0];
/// let mut l = MatrixViewMut::new(2, 2, &mut buf).unwrap();
/// let mut v = [1.0, 0.0];
/// cholesky_update(&mut l, &mut v, Sign::Plus).unwrap();
/// assert!((l[(0, 0)] - 2.0_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn cholesky_update<T: FloatScalar>(
    l: &mut impl MatrixMut<T>,
    v: &mut [T],
    sign: Sign,
) -> Result<(), MatrixError> {
    let n = require_square("cholesky_update", &*l)?;
    if v.len() != n {
        return Err(mismatch("cholesky_update"));
    }
    let sign = sign.value::<T>();

    for j in 0..n {
        let ljj = *l.get(j, j);
        let vj = v[j];
        if ljj == T::zero() {
            log::warn!("cholesky_update: zero diagonal at {j}");
            return Err(MatrixError::NotPositiveDefinite);
        }
        let arg = ljj * ljj + sign * vj * vj;
        if arg <= T::zero() {
            log::warn!("cholesky_update: downdate leaves a non-positive pivot at {j}");
            return Err(MatrixError::NotPositiveDefinite);
        }

        let r = arg.sqrt();
        let c = r / ljj;
        let s = vj / ljj;
        *l.get_mut(j, j) = r;

        for i in (j + 1)..n {
            let lij = (*l.get(i, j) + sign * s * v[i]) / c;
            *l.get_mut(i, j) = lij;
            v[i] = c * v[i] - s * lij;
        }
    }

    Ok(())
}

use super::{MatrixView, MatrixViewMut};
use crate::traits::{FloatScalar, MatrixRef, Scalar};

impl<T: FloatScalar> MatrixView<'_, T> {
    /// Frobenius norm, see [`norm`].
    pub fn norm(&self) -> T {
        norm(self)
    }
}

impl<T: FloatScalar> MatrixViewMut<'_, T> {
    /// Frobenius norm, see [`norm`].
    pub fn norm(&self) -> T {
        norm(self)
    }
}

/// Squared Frobenius norm (sum of all elements squared). No sqrt.
pub fn norm_squared<T: Scalar>(a: &impl MatrixRef<T>) -> T {
    let mut sum = T::zero();
    for &x in a.as_slice() {
        sum = sum + x * x;
    }
    sum
}

/// Frobenius norm (square root of sum of squared elements).
///
/// For a vector view this is the Euclidean length.
///
/// ```
/// use sigmakit::{matrix, MatrixView};
///
/// let v = MatrixView::new(1, 2, &[3.0_f64, 4.0]).unwrap();
/// assert_eq!(matrix::norm(&v), 5.0);
/// ```
pub fn norm<T: FloatScalar>(a: &impl MatrixRef<T>) -> T {
    norm_squared(a).sqrt()
}

/// Infinity norm (maximum absolute row sum).
pub fn norm_inf<T: FloatScalar>(a: &impl MatrixRef<T>) -> T {
    let mut max = T::zero();
    for i in 0..a.nrows() {
        let mut row_sum = T::zero();
        for j in 0..a.ncols() {
            row_sum = row_sum + a.get(i, j).abs();
        }
        if row_sum > max {
            max = row_sum;
        }
    }
    max
}

/// Largest absolute elementwise difference between two equally-shaped
/// matrices, or `None` when the shapes differ.
pub fn max_abs_diff<T: FloatScalar>(a: &impl MatrixRef<T>, b: &impl MatrixRef<T>) -> Option<T> {
    if a.nrows() != b.nrows() || a.ncols() != b.ncols() {
        return None;
    }
    let mut max = T::zero();
    for (&x, &y) in a.as_slice().iter().zip(b.as_slice()) {
        let d = (x - y).abs();
        if d > max {
            max = d;
        }
    }
    Some(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatrixView;

    #[test]
    fn frobenius() {
        let m = MatrixView::new(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(norm_squared(&m), 30.0);
        assert!((norm(&m) - 30.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn inf_norm() {
        let m = MatrixView::new(2, 2, &[1.0_f64, -2.0, 3.0, -4.0]).unwrap();
        assert_eq!(norm_inf(&m), 7.0);
    }

    #[test]
    fn diff() {
        let a = MatrixView::new(1, 3, &[1.0_f64, 2.0, 3.0]).unwrap();
        let b = MatrixView::new(1, 3, &[1.0_f64, 2.5, 2.0]).unwrap();
        assert_eq!(max_abs_diff(&a, &b), Some(1.0));
        let c = MatrixView::new(3, 1, &[1.0_f64, 2.0, 3.0]).unwrap();
        assert_eq!(max_abs_diff(&a, &c), None);
    }

    #[test]
    fn empty_norm_is_zero() {
        let data: [f64; 0] = [];
        let m = MatrixView::new(0, 0, &data).unwrap();
        assert_eq!(norm(&m), 0.0);
    }
}

use super::{require_square, MatrixError, MatrixViewMut};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};

impl<T: Scalar> MatrixViewMut<'_, T> {
    /// Set every active element to zero.
    pub fn zero(&mut self) {
        self.fill(T::zero());
    }

    /// Set every active element to `value`.
    pub fn fill(&mut self, value: T) {
        for x in self.as_mut_slice() {
            *x = value;
        }
    }

    /// Overwrite with the identity matrix.
    pub fn eye(&mut self) -> Result<(), MatrixError> {
        let n = require_square("eye", &*self)?;
        self.zero();
        for i in 0..n {
            *self.get_mut(i, i) = T::one();
        }
        Ok(())
    }

    /// Sum of diagonal elements.
    pub fn trace(&self) -> Result<T, MatrixError> {
        let n = require_square("trace", &*self)?;
        let mut sum = T::zero();
        for i in 0..n {
            sum = sum + *self.get(i, i);
        }
        Ok(sum)
    }

    /// Swap rows `i` and `j`.
    ///
    /// ```
    /// use sigmakit::MatrixViewMut;
    ///
    /// let mut buf = [1, 1, 2, 2, 3, 3];
    /// let mut m = MatrixViewMut::new(3, 2, &mut buf).unwrap();
    /// m.permute_rows(0, 2).unwrap();
    /// assert_eq!(buf, [3, 3, 2, 2, 1, 1]);
    /// ```
    pub fn permute_rows(&mut self, i: usize, j: usize) -> Result<(), MatrixError> {
        if i >= self.nrows || j >= self.nrows {
            return Err(super::mismatch("permute_rows"));
        }
        if i != j {
            let w = self.ncols;
            let (lo, hi) = (i.min(j), i.max(j));
            let (head, tail) = self.as_mut_slice().split_at_mut(hi * w);
            head[lo * w..(lo + 1) * w].swap_with_slice(&mut tail[..w]);
        }
        Ok(())
    }
}

impl<T: FloatScalar> MatrixViewMut<'_, T> {
    /// Replace each off-diagonal pair with its mean, making the matrix
    /// exactly symmetric.
    pub fn symmetrize(&mut self) -> Result<(), MatrixError> {
        let n = require_square("symmetrize", &*self)?;
        let half = T::lit(0.5);
        for i in 0..n {
            for j in 0..i {
                let t = (*self.get(i, j) + *self.get(j, i)) * half;
                *self.get_mut(i, j) = t;
                *self.get_mut(j, i) = t;
            }
        }
        Ok(())
    }

    /// Regularize the diagonal.
    ///
    /// With `ε = min|aᵢᵢ| / max|aᵢᵢ|`, adds `ε` to every diagonal element
    /// when `ε < 1`. Returns the amount added (zero when the diagonal is
    /// uniform in magnitude or identically zero).
    pub fn force_positive(&mut self) -> Result<T, MatrixError> {
        let n = require_square("force_positive", &*self)?;
        if n == 0 {
            return Ok(T::zero());
        }
        let mut min = self.get(0, 0).abs();
        let mut max = min;
        for i in 1..n {
            let d = self.get(i, i).abs();
            if d < min {
                min = d;
            }
            if d > max {
                max = d;
            }
        }
        if max == T::zero() {
            return Ok(T::zero());
        }
        let eps = min / max;
        if eps < T::one() {
            log::warn!("force_positive: adding {eps:?} to the diagonal");
            for i in 0..n {
                let d = self.get_mut(i, i);
                *d = *d + eps;
            }
            Ok(eps)
        } else {
            Ok(T::zero())
        }
    }
}

/// Check whether `a` is symmetric to within `tol`.
pub fn is_symmetric<T: FloatScalar>(a: &impl MatrixRef<T>, tol: T) -> bool {
    if !a.is_square() {
        return false;
    }
    for i in 0..a.nrows() {
        for j in (i + 1)..a.ncols() {
            if (*a.get(i, j) - *a.get(j, i)).abs() > tol {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatrixView;

    #[test]
    fn eye_and_trace() {
        let mut buf = [5.0; 9];
        let mut m = MatrixViewMut::new(3, 3, &mut buf).unwrap();
        m.eye().unwrap();
        assert_eq!(m.trace().unwrap(), 3.0);
        assert_eq!(m[(0, 1)], 0.0);
    }

    #[test]
    fn eye_rejects_rectangular() {
        let mut buf = [5.0; 6];
        let mut m = MatrixViewMut::new(2, 3, &mut buf).unwrap();
        assert_eq!(m.eye(), Err(MatrixError::NotSquare));
        assert_eq!(buf, [5.0; 6]);
    }

    #[test]
    fn permute_rows_round_trip() {
        let mut buf: [f64; 25] = core::array::from_fn(|k| (k / 5 + 1) as f64);
        let mut m = MatrixViewMut::new(5, 5, &mut buf).unwrap();
        m.permute_rows(1, 4).unwrap();
        assert_eq!(m[(1, 0)], 5.0);
        assert_eq!(m[(4, 3)], 2.0);
        m.permute_rows(4, 1).unwrap();
        m.permute_rows(2, 2).unwrap();
        for i in 0..5 {
            assert_eq!(m[(i, 0)], (i + 1) as f64);
        }
        assert!(m.permute_rows(0, 5).is_err());
    }

    #[test]
    fn symmetrize_averages() {
        let mut buf = [1.0, 2.0, 4.0, 3.0];
        let mut m = MatrixViewMut::new(2, 2, &mut buf).unwrap();
        m.symmetrize().unwrap();
        assert_eq!(buf, [1.0, 3.0, 3.0, 3.0]);
        let v = MatrixView::new(2, 2, &buf).unwrap();
        assert!(is_symmetric(&v, 0.0));
    }

    #[test]
    fn force_positive_adds_ratio() {
        let mut buf = [1.0, 0.0, 0.0, -4.0];
        let mut m = MatrixViewMut::new(2, 2, &mut buf).unwrap();
        let eps = m.force_positive().unwrap();
        assert_eq!(eps, 0.25);
        assert_eq!(buf, [1.25, 0.0, 0.0, -3.75]);
    }

    #[test]
    fn force_positive_uniform_is_noop() {
        let mut buf = [2.0, 1.0, 1.0, -2.0];
        let mut m = MatrixViewMut::new(2, 2, &mut buf).unwrap();
        assert_eq!(m.force_positive().unwrap(), 0.0);
        assert_eq!(buf, [2.0, 1.0, 1.0, -2.0]);

        let mut zeros = [0.0; 4];
        let mut z = MatrixViewMut::new(2, 2, &mut zeros).unwrap();
        assert_eq!(z.force_positive().unwrap(), 0.0);
    }
}

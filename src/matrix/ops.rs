use super::{mismatch, MatrixError, MatrixViewMut};
use crate::traits::{MatrixMut, MatrixRef, Scalar};

// ── Element-wise ────────────────────────────────────────────────────

fn same_shape<T>(a: &impl MatrixRef<T>, b: &impl MatrixRef<T>) -> bool {
    a.nrows() == b.nrows() && a.ncols() == b.ncols()
}

/// `r = a + b`.
///
/// ```
/// use sigmakit::{matrix, MatrixView, MatrixViewMut};
///
/// let a = MatrixView::new(1, 2, &[1.0, 2.0]).unwrap();
/// let b = MatrixView::new(1, 2, &[3.0, 4.0]).unwrap();
/// let mut buf = [0.0; 2];
/// let mut r = MatrixViewMut::new(1, 2, &mut buf).unwrap();
/// matrix::add(&a, &b, &mut r).unwrap();
/// assert_eq!(buf, [4.0, 6.0]);
/// ```
pub fn add<T: Scalar>(
    a: &impl MatrixRef<T>,
    b: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if !same_shape(a, b) || !same_shape(a, r) {
        return Err(mismatch("add"));
    }
    for ((o, &x), &y) in r.as_mut_slice().iter_mut().zip(a.as_slice()).zip(b.as_slice()) {
        *o = x + y;
    }
    Ok(())
}

/// `r = a - b`.
pub fn sub<T: Scalar>(
    a: &impl MatrixRef<T>,
    b: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if !same_shape(a, b) || !same_shape(a, r) {
        return Err(mismatch("sub"));
    }
    for ((o, &x), &y) in r.as_mut_slice().iter_mut().zip(a.as_slice()).zip(b.as_slice()) {
        *o = x - y;
    }
    Ok(())
}

/// `r = k · a`.
pub fn scale<T: Scalar>(
    k: T,
    a: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if !same_shape(a, r) {
        return Err(mismatch("scale"));
    }
    for (o, &x) in r.as_mut_slice().iter_mut().zip(a.as_slice()) {
        *o = k * x;
    }
    Ok(())
}

/// `r = aᵀ`.
pub fn transpose<T: Scalar>(
    a: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if r.nrows() != a.ncols() || r.ncols() != a.nrows() {
        return Err(mismatch("transpose"));
    }
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            *r.get_mut(j, i) = *a.get(i, j);
        }
    }
    Ok(())
}

// ── Products ────────────────────────────────────────────────────────

/// `r = a · b`.
///
/// ```
/// use sigmakit::{matrix, MatrixView, MatrixViewMut};
///
/// let a = MatrixView::new(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let b = MatrixView::new(3, 1, &[1.0, 0.0, -1.0]).unwrap();
/// let mut buf = [0.0; 2];
/// let mut r = MatrixViewMut::new(2, 1, &mut buf).unwrap();
/// matrix::multiply(&a, &b, &mut r).unwrap();
/// assert_eq!(buf, [-2.0, -2.0]);
/// ```
pub fn multiply<T: Scalar>(
    a: &impl MatrixRef<T>,
    b: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if a.ncols() != b.nrows() || r.nrows() != a.nrows() || r.ncols() != b.ncols() {
        return Err(mismatch("multiply"));
    }
    let inner = a.ncols();
    for i in 0..a.nrows() {
        for j in 0..b.ncols() {
            let mut sum = T::zero();
            for k in 0..inner {
                sum = sum + *a.get(i, k) * *b.get(k, j);
            }
            *r.get_mut(i, j) = sum;
        }
    }
    Ok(())
}

/// `r = a · bᵀ` without materialising the transpose.
pub fn multiply_transposed<T: Scalar>(
    a: &impl MatrixRef<T>,
    b: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if a.ncols() != b.ncols() || r.nrows() != a.nrows() || r.ncols() != b.nrows() {
        return Err(mismatch("multiply_transposed"));
    }
    let inner = a.ncols();
    for i in 0..a.nrows() {
        for j in 0..b.nrows() {
            let mut sum = T::zero();
            for k in 0..inner {
                sum = sum + *a.get(i, k) * *b.get(j, k);
            }
            *r.get_mut(i, j) = sum;
        }
    }
    Ok(())
}

/// `r = a · diag(d)`: column `j` of `a` scaled by `d[j]`.
///
/// `d` is the diagonal as a slice; its length must equal `a.ncols()`.
pub fn multiply_diag<T: Scalar>(
    a: &impl MatrixRef<T>,
    d: &[T],
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if d.len() != a.ncols() || !same_shape(a, r) {
        return Err(mismatch("multiply_diag"));
    }
    for i in 0..a.nrows() {
        for (j, &dj) in d.iter().enumerate() {
            *r.get_mut(i, j) = *a.get(i, j) * dj;
        }
    }
    Ok(())
}

/// `r = diag(d) · a`: row `i` of `a` scaled by `d[i]`.
pub fn diag_multiply<T: Scalar>(
    d: &[T],
    a: &impl MatrixRef<T>,
    r: &mut impl MatrixMut<T>,
) -> Result<(), MatrixError> {
    if d.len() != a.nrows() || !same_shape(a, r) {
        return Err(mismatch("diag_multiply"));
    }
    for (i, &di) in d.iter().enumerate() {
        for j in 0..a.ncols() {
            *r.get_mut(i, j) = di * *a.get(i, j);
        }
    }
    Ok(())
}

// ── In-place ────────────────────────────────────────────────────────

impl<T: Scalar> MatrixViewMut<'_, T> {
    /// Multiply every element by `k`.
    pub fn scale(&mut self, k: T) {
        for x in self.as_mut_slice() {
            *x = *x * k;
        }
    }

    /// Transpose in place, swapping the shape.
    ///
    /// Uses cycle-following over the active buffer, so no scratch storage
    /// is needed for non-square shapes either.
    ///
    /// ```
    /// use sigmakit::{MatrixRef, MatrixViewMut};
    ///
    /// let mut buf = [1, 2, 3, 4, 5, 6];
    /// let mut m = MatrixViewMut::new(2, 3, &mut buf).unwrap();
    /// m.transpose();
    /// assert_eq!((m.nrows(), m.ncols()), (3, 2));
    /// assert_eq!(m.as_slice(), &[1, 4, 2, 5, 3, 6]);
    /// ```
    pub fn transpose(&mut self) {
        let (m, n) = (self.nrows, self.ncols);
        let len = m * n;
        let data = &mut self.data[..len];
        // destination k of the n×m result reads source (k % m, k / m)
        let source = |k: usize| (k % m) * n + k / m;

        for start in 0..len {
            let mut next = source(start);
            let mut steps = 1;
            while next > start {
                next = source(next);
                steps += 1;
            }
            // cycle already rotated from a smaller index, or a fixed point
            if next < start || steps == 1 {
                continue;
            }
            log::trace!("transpose: rotating cycle at {start} of length {steps}");
            let first = data[start];
            let mut k = start;
            loop {
                let src = source(k);
                if src == start {
                    data[k] = first;
                    break;
                }
                data[k] = data[src];
                k = src;
            }
        }

        self.nrows = n;
        self.ncols = m;
    }
}

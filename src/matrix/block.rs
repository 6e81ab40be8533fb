use super::{mismatch, MatrixError, MatrixViewMut};
use crate::traits::{MatrixMut, MatrixRef, Scalar};

// ── Block copy & accumulate ─────────────────────────────────────────

impl<T: Scalar> MatrixViewMut<'_, T> {
    /// Shared bounds check for a `rows × cols` block written at `(row, col)`.
    fn block_fits(&self, op: &'static str, row: usize, col: usize, rows: usize, cols: usize) -> Result<(), MatrixError> {
        if row + rows > self.nrows || col + cols > self.ncols {
            log::debug!(
                "{op}: {rows}x{cols} block at ({row},{col}) exceeds {}x{}",
                self.nrows,
                self.ncols
            );
            return Err(MatrixError::DimensionMismatch);
        }
        Ok(())
    }

    fn combine_block(
        &mut self,
        op: &'static str,
        a: &impl MatrixRef<T>,
        row: usize,
        col: usize,
        f: impl Fn(T, T) -> T,
    ) -> Result<(), MatrixError> {
        self.block_fits(op, row, col, a.nrows(), a.ncols())?;
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                let dst = self.get_mut(row + i, col + j);
                *dst = f(*dst, *a.get(i, j));
            }
        }
        Ok(())
    }

    /// Copy all of `a` into the block starting at `(row, col)`.
    ///
    /// ```
    /// use sigmakit::{MatrixView, MatrixViewMut};
    ///
    /// let patch = MatrixView::new(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let mut buf = [0.0; 9];
    /// let mut m = MatrixViewMut::new(3, 3, &mut buf).unwrap();
    /// m.copy_from(&patch, 1, 1).unwrap();
    /// assert_eq!(m[(1, 1)], 1.0);
    /// assert_eq!(m[(2, 2)], 4.0);
    /// assert!(m.copy_from(&patch, 2, 0).is_err());
    /// ```
    pub fn copy_from(&mut self, a: &impl MatrixRef<T>, row: usize, col: usize) -> Result<(), MatrixError> {
        self.combine_block("copy_from", a, row, col, |_, x| x)
    }

    /// Add `a` into the block starting at `(row, col)`.
    pub fn add_block(&mut self, a: &impl MatrixRef<T>, row: usize, col: usize) -> Result<(), MatrixError> {
        self.combine_block("add_block", a, row, col, |d, x| d + x)
    }

    /// Subtract `a` from the block starting at `(row, col)`.
    pub fn sub_block(&mut self, a: &impl MatrixRef<T>, row: usize, col: usize) -> Result<(), MatrixError> {
        self.combine_block("sub_block", a, row, col, |d, x| d - x)
    }

    /// Add the part of `a` starting at `(a_row, a_col)` into `self` starting
    /// at `(row, col)`.
    ///
    /// The block size is the largest that fits both: `a` is read from its
    /// offset to its last row/column, clipped to what remains of `self`.
    pub fn add_from(
        &mut self,
        a: &impl MatrixRef<T>,
        a_row: usize,
        a_col: usize,
        row: usize,
        col: usize,
    ) -> Result<(), MatrixError> {
        if a_row > a.nrows() || a_col > a.ncols() || row > self.nrows || col > self.ncols {
            return Err(mismatch("add_from"));
        }
        let rows = (a.nrows() - a_row).min(self.nrows - row);
        let cols = (a.ncols() - a_col).min(self.ncols - col);
        for i in 0..rows {
            for j in 0..cols {
                let dst = self.get_mut(row + i, col + j);
                *dst = *dst + *a.get(a_row + i, a_col + j);
            }
        }
        Ok(())
    }

    /// Copy the first `count` rows of `a` into rows `row..row + count`.
    ///
    /// `a` must have the same column count as `self`.
    pub fn fill_rows(&mut self, a: &impl MatrixRef<T>, row: usize, count: usize) -> Result<(), MatrixError> {
        if a.ncols() != self.ncols || a.nrows() < count {
            return Err(mismatch("fill_rows"));
        }
        self.block_fits("fill_rows", row, 0, count, self.ncols)?;
        let width = self.ncols;
        let src = &a.as_slice()[..count * width];
        self.as_mut_slice()[row * width..(row + count) * width].copy_from_slice(src);
        Ok(())
    }

    /// Copy the first `count` columns of `a` into columns `col..col + count`.
    ///
    /// `a` must have the same row count as `self`.
    pub fn fill_cols(&mut self, a: &impl MatrixRef<T>, col: usize, count: usize) -> Result<(), MatrixError> {
        if a.nrows() != self.nrows || a.ncols() < count {
            return Err(mismatch("fill_cols"));
        }
        self.block_fits("fill_cols", 0, col, self.nrows, count)?;
        for i in 0..self.nrows {
            for j in 0..count {
                *self.get_mut(i, col + j) = *a.get(i, j);
            }
        }
        Ok(())
    }
}

// ── Rows & columns as slices ────────────────────────────────────────

impl<T: Scalar> MatrixViewMut<'_, T> {
    /// Write `v` into column `j`.
    pub fn set_col(&mut self, j: usize, v: &[T]) -> Result<(), MatrixError> {
        if j >= self.ncols || v.len() != self.nrows {
            return Err(mismatch("set_col"));
        }
        for (i, &x) in v.iter().enumerate() {
            *self.get_mut(i, j) = x;
        }
        Ok(())
    }

    /// Write `v` into row `i`.
    pub fn set_row(&mut self, i: usize, v: &[T]) -> Result<(), MatrixError> {
        if i >= self.nrows || v.len() != self.ncols {
            return Err(mismatch("set_row"));
        }
        let w = self.ncols;
        self.as_mut_slice()[i * w..(i + 1) * w].copy_from_slice(v);
        Ok(())
    }
}

/// Copy column `j` of `a` into `out`.
pub fn col_into<T: Scalar>(a: &impl MatrixRef<T>, j: usize, out: &mut [T]) -> Result<(), MatrixError> {
    if j >= a.ncols() || out.len() != a.nrows() {
        return Err(mismatch("col_into"));
    }
    for (i, o) in out.iter_mut().enumerate() {
        *o = *a.get(i, j);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatrixView;

    #[test]
    fn block_accumulate() {
        let ones = [1.0; 4];
        let a = MatrixView::new(2, 2, &ones).unwrap();
        let mut buf = [0.0; 9];
        let mut m = MatrixViewMut::new(3, 3, &mut buf).unwrap();
        m.add_block(&a, 0, 0).unwrap();
        m.add_block(&a, 1, 1).unwrap();
        m.sub_block(&a, 0, 1).unwrap();
        assert_eq!(buf, [1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn block_out_of_range_is_rejected() {
        let a = MatrixView::new(2, 2, &[1.0; 4]).unwrap();
        let mut buf = [7.0; 9];
        let mut m = MatrixViewMut::new(3, 3, &mut buf).unwrap();
        assert_eq!(m.add_block(&a, 2, 2), Err(MatrixError::DimensionMismatch));
        assert_eq!(buf, [7.0; 9]);
    }

    #[test]
    fn add_from_offset_clips() {
        // 5×3 source, add rows 3.. and cols 2.. into (0,0) of a 2×2
        let src: [f64; 15] = core::array::from_fn(|k| k as f64);
        let c = MatrixView::new(5, 3, &src).unwrap();
        let mut buf = [0.0; 4];
        let mut m = MatrixViewMut::new(2, 2, &mut buf).unwrap();
        m.add_from(&c, 3, 2, 0, 0).unwrap();
        // rows 3,4 col 2 → 11, 14; only one source column remains
        assert_eq!(buf, [11.0, 0.0, 14.0, 0.0]);
    }

    #[test]
    fn fill_cols_then_rows() {
        let mut a_buf = [1.0; 25];
        let b = [2.0; 25];
        let c = [3.0; 10];
        let d = [4.0; 10];
        let mut a = MatrixViewMut::new(5, 5, &mut a_buf).unwrap();
        let b = MatrixView::new(5, 5, &b).unwrap();
        let c = MatrixView::new(5, 2, &c).unwrap();
        let d = MatrixView::new(2, 5, &d).unwrap();

        // only one column left at 4
        assert!(a.fill_cols(&b, 4, 2).is_err());
        a.fill_cols(&b, 4, 1).unwrap();
        a.fill_cols(&c, 2, 2).unwrap();
        a.fill_rows(&d, 3, 2).unwrap();

        for j in 0..5 {
            let top = match j {
                2 | 3 => 3.0,
                4 => 2.0,
                _ => 1.0,
            };
            assert_eq!(a[(0, j)], top);
            assert_eq!(a[(3, j)], 4.0);
            assert_eq!(a[(4, j)], 4.0);
        }
    }

    #[test]
    fn rows_and_cols() {
        let mut buf = [0; 6];
        let mut m = MatrixViewMut::new(2, 3, &mut buf).unwrap();
        m.set_row(1, &[4, 5, 6]).unwrap();
        m.set_col(0, &[9, 8]).unwrap();
        assert!(m.set_col(3, &[0, 0]).is_err());
        let mut col = [0; 2];
        col_into(&m, 2, &mut col).unwrap();
        assert_eq!(col, [0, 6]);
        assert_eq!(buf, [9, 0, 0, 8, 5, 6]);
    }
}

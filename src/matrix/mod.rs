mod block;
mod norm;
mod ops;
mod square;
mod util;

use core::ops::{Index, IndexMut};

use crate::traits::{MatrixMut, MatrixRef};

pub use block::col_into;
pub use norm::{max_abs_diff, norm, norm_inf, norm_squared};
pub use ops::{add, diag_multiply, multiply, multiply_diag, multiply_transposed, scale, sub, transpose};
pub use square::is_symmetric;

/// Largest row or column count a view may have.
pub const MAX_DIM: usize = 255;

/// Errors from matrix views and the decompositions built on them.
///
/// Every operation validates shapes before writing anything, so an `Err`
/// guarantees the outputs were left untouched, except where a decomposition
/// documents partial progress (see [`crate::linalg::cholesky_in_place`]).
///
/// ```
/// use sigmakit::{MatrixError, MatrixViewMut};
///
/// let mut buf = [0.0_f64; 4];
/// assert_eq!(
///     MatrixViewMut::new(3, 3, &mut buf).unwrap_err(),
///     MatrixError::CapacityExceeded
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixError {
    /// Operand shapes are incompatible.
    DimensionMismatch,
    /// A square-only operation was given a non-square matrix.
    NotSquare,
    /// A Cholesky-family operation met a non-positive pivot.
    NotPositiveDefinite,
    /// Requested shape exceeds the backing buffer or a static bound.
    CapacityExceeded,
    /// Zero pivot in a triangular, LU or LDL step.
    Singular,
}

impl core::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MatrixError::DimensionMismatch => write!(f, "matrix dimensions do not agree"),
            MatrixError::NotSquare => write!(f, "matrix is not square"),
            MatrixError::NotPositiveDefinite => write!(f, "matrix is not positive definite"),
            MatrixError::CapacityExceeded => write!(f, "shape exceeds backing buffer capacity"),
            MatrixError::Singular => write!(f, "matrix is singular"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MatrixError {}

#[inline]
pub(crate) fn check_shape(nrows: usize, ncols: usize, capacity: usize) -> Result<(), MatrixError> {
    if nrows > MAX_DIM || ncols > MAX_DIM || nrows * ncols > capacity {
        log::debug!("view shape {nrows}x{ncols} does not fit a buffer of {capacity} elements");
        return Err(MatrixError::CapacityExceeded);
    }
    Ok(())
}

#[inline]
pub(crate) fn mismatch(op: &'static str) -> MatrixError {
    log::debug!("{op}: operand dimensions do not agree");
    MatrixError::DimensionMismatch
}

#[inline]
pub(crate) fn require_square<T>(op: &'static str, a: &impl MatrixRef<T>) -> Result<usize, MatrixError> {
    if a.is_square() {
        Ok(a.nrows())
    } else {
        log::debug!("{op}: {}x{} matrix is not square", a.nrows(), a.ncols());
        Err(MatrixError::NotSquare)
    }
}

/// Read-only row-major matrix view over a borrowed slice.
///
/// The view never owns memory. Its shape may change through
/// [`refurbish`](Self::refurbish) or [`rebind`](Self::rebind), but only to
/// shapes whose element count fits the bound buffer.
///
/// ```
/// use sigmakit::{MatrixView, MatrixRef};
///
/// let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
/// let a = MatrixView::new(2, 3, &data).unwrap();
/// assert_eq!(a[(1, 0)], 4.0);
/// assert_eq!(a.ncols(), 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a, T> {
    nrows: usize,
    ncols: usize,
    data: &'a [T],
}

impl<'a, T> MatrixView<'a, T> {
    /// Create a `nrows × ncols` view over `data` (row-major).
    pub fn new(nrows: usize, ncols: usize, data: &'a [T]) -> Result<Self, MatrixError> {
        check_shape(nrows, ncols, data.len())?;
        Ok(Self { nrows, ncols, data })
    }

    /// View `data` as a column vector.
    pub fn column(data: &'a [T]) -> Result<Self, MatrixError> {
        Self::new(data.len(), 1, data)
    }

    /// Shape known to fit; used for views over fixed-capacity storage.
    #[inline]
    pub(crate) fn fitted(nrows: usize, ncols: usize, data: &'a [T]) -> Self {
        debug_assert!(nrows <= MAX_DIM && ncols <= MAX_DIM && nrows * ncols <= data.len());
        Self { nrows, ncols, data }
    }

    /// Reshape over the same buffer.
    pub fn refurbish(&mut self, nrows: usize, ncols: usize) -> Result<(), MatrixError> {
        check_shape(nrows, ncols, self.data.len())?;
        self.nrows = nrows;
        self.ncols = ncols;
        Ok(())
    }

    /// Reshape and bind to a different buffer.
    pub fn rebind(&mut self, nrows: usize, ncols: usize, data: &'a [T]) -> Result<(), MatrixError> {
        check_shape(nrows, ncols, data.len())?;
        *self = Self { nrows, ncols, data };
        Ok(())
    }

    /// Number of elements in the bound buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }
}

/// Mutable row-major matrix view over a borrowed slice.
///
/// This is the output type of every operation in the crate. It holds the
/// only borrow of its buffer for as long as it lives, so two views can never
/// write the same region at once.
///
/// ```
/// use sigmakit::{MatrixViewMut, MatrixRef};
///
/// let mut buf = [0.0_f64; 9];
/// let mut a = MatrixViewMut::new(3, 3, &mut buf).unwrap();
/// a.eye().unwrap();
/// assert_eq!(a[(2, 2)], 1.0);
///
/// a.refurbish(2, 4).unwrap();
/// assert_eq!(a.len(), 8);
/// assert!(a.refurbish(4, 4).is_err());
/// ```
#[derive(Debug)]
pub struct MatrixViewMut<'a, T> {
    nrows: usize,
    ncols: usize,
    data: &'a mut [T],
}

impl<'a, T> MatrixViewMut<'a, T> {
    /// Create a `nrows × ncols` view over `data` (row-major).
    pub fn new(nrows: usize, ncols: usize, data: &'a mut [T]) -> Result<Self, MatrixError> {
        check_shape(nrows, ncols, data.len())?;
        Ok(Self { nrows, ncols, data })
    }

    /// View `data` as a column vector.
    pub fn column(data: &'a mut [T]) -> Result<Self, MatrixError> {
        let n = data.len();
        Self::new(n, 1, data)
    }

    #[inline]
    pub(crate) fn fitted(nrows: usize, ncols: usize, data: &'a mut [T]) -> Self {
        debug_assert!(nrows <= MAX_DIM && ncols <= MAX_DIM && nrows * ncols <= data.len());
        Self { nrows, ncols, data }
    }

    /// Reshape over the same buffer. Element values are not moved.
    pub fn refurbish(&mut self, nrows: usize, ncols: usize) -> Result<(), MatrixError> {
        check_shape(nrows, ncols, self.data.len())?;
        self.nrows = nrows;
        self.ncols = ncols;
        Ok(())
    }

    /// Reshape and bind to a different buffer.
    ///
    /// On error the view keeps its previous shape and buffer.
    pub fn rebind(
        &mut self,
        nrows: usize,
        ncols: usize,
        data: &'a mut [T],
    ) -> Result<(), MatrixError> {
        check_shape(nrows, ncols, data.len())?;
        self.nrows = nrows;
        self.ncols = ncols;
        self.data = data;
        Ok(())
    }

    /// Number of elements in the bound buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Shared view of the same shape over the same buffer.
    #[inline]
    pub fn as_view(&self) -> MatrixView<'_, T> {
        MatrixView {
            nrows: self.nrows,
            ncols: self.ncols,
            data: &*self.data,
        }
    }

    /// Shorter-lived mutable view of the same shape.
    #[inline]
    pub fn reborrow(&mut self) -> MatrixViewMut<'_, T> {
        MatrixViewMut {
            nrows: self.nrows,
            ncols: self.ncols,
            data: &mut *self.data,
        }
    }
}

impl<T> MatrixRef<T> for MatrixView<'_, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &self.data[row * self.ncols + col]
    }

    #[inline]
    fn as_slice(&self) -> &[T] {
        &self.data[..self.nrows * self.ncols]
    }
}

impl<T> MatrixRef<T> for MatrixViewMut<'_, T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &self.data[row * self.ncols + col]
    }

    #[inline]
    fn as_slice(&self) -> &[T] {
        &self.data[..self.nrows * self.ncols]
    }
}

impl<T> MatrixMut<T> for MatrixViewMut<'_, T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        debug_assert!(row < self.nrows && col < self.ncols);
        &mut self.data[row * self.ncols + col]
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.nrows * self.ncols;
        &mut self.data[..len]
    }
}

// Index by (row, col) tuple; panics outside the active shape.
impl<T> Index<(usize, usize)> for MatrixView<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.nrows && col < self.ncols, "index ({row},{col}) out of bounds");
        &self.data[row * self.ncols + col]
    }
}

impl<T> Index<(usize, usize)> for MatrixViewMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.nrows && col < self.ncols, "index ({row},{col}) out of bounds");
        &self.data[row * self.ncols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for MatrixViewMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.nrows && col < self.ncols, "index ({row},{col}) out of bounds");
        &mut self.data[row * self.ncols + col]
    }
}

use core::fmt::Debug;
use num_traits::{Float, Num, One, Zero};

/// Trait for types that can be used as matrix elements.
///
/// Blanket-implemented for all types satisfying the bounds.
/// Covers `f32`, `f64`, and all integer types.
pub trait Scalar: Copy + PartialEq + PartialOrd + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + PartialOrd + Debug + Zero + One + Num> Scalar for T {}

/// Trait for floating-point matrix elements.
///
/// Required by operations that need `sqrt`, `abs`, trigonometry, etc.
/// (decompositions, norms, the estimators and the [`crate::math`] facade).
/// Both `f32` and `f64` implement it, so a single code path serves either
/// scalar width.
pub trait FloatScalar: Scalar + Float {
    /// Convert a small literal (weights, tunables) into `Self`.
    ///
    /// Every `f64` constant used by this crate is representable in `f32`
    /// after rounding, so the conversion cannot fail for the two
    /// implementing types.
    #[inline]
    fn lit(x: f64) -> Self {
        <Self as num_traits::NumCast>::from(x).unwrap_or_else(Self::nan)
    }

    /// Convert a dimension into `Self`.
    #[inline]
    fn from_dim(n: usize) -> Self {
        <Self as num_traits::NumCast>::from(n).unwrap_or_else(Self::nan)
    }
}

impl<T: Scalar + Float> FloatScalar for T {}

/// Read-only access to a matrix-like type.
///
/// Implemented by [`crate::MatrixView`] and [`crate::MatrixViewMut`] so the
/// decompositions and products accept either as input.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;

    /// The active `nrows * ncols` elements in row-major order.
    fn as_slice(&self) -> &[T];

    /// Number of active elements.
    #[inline]
    fn len(&self) -> usize {
        self.nrows() * self.ncols()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    /// True for 1×n and n×1 shapes.
    #[inline]
    fn is_vector(&self) -> bool {
        self.nrows() == 1 || self.ncols() == 1
    }
}

/// Mutable access to a matrix-like type.
///
/// Extends `MatrixRef` with mutable element access, enabling
/// in-place algorithms (Cholesky, LU, etc.) to work generically.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;

    /// The active `nrows * ncols` elements in row-major order.
    fn as_mut_slice(&mut self) -> &mut [T];
}

//! Decompositions and solvers over [`MatrixRef`](crate::MatrixRef) /
//! [`MatrixMut`](crate::MatrixMut).
//!
//! Every function works on caller-provided views and never allocates.
//! Failures are reported through [`MatrixError`](crate::MatrixError); shape
//! problems are detected before any output is written.

pub(crate) mod cholesky;
pub(crate) mod cholupdate;
pub(crate) mod ldl;
pub(crate) mod lu;
pub(crate) mod qr;

pub use cholesky::{
    cholesky, cholesky_in_place, cholesky_restore, cholesky_restore_full, cholesky_semidefinite, divide,
    divide_factored, inverse, inverse_in_place, triangular_inverse, triangular_inverse_in_place,
};
pub use cholupdate::{cholesky_update, Sign};
pub use ldl::ldl;
pub use lu::{inverse_general, lu, lu_in_place, lu_packed, lu_restore};
pub use qr::{qr, qr_triangularize};

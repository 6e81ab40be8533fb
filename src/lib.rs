//! # sigmakit
//!
//! Matrix views, decompositions and unscented Kalman filters for embedded
//! state estimation. No heap allocation anywhere: matrices are views over
//! caller-owned slices, and filters keep their buffers inline, sized by
//! const-generic capacities.
//!
//! ## Quick start
//!
//! ```
//! use sigmakit::{linalg, MatrixView, MatrixViewMut, MatrixRef};
//!
//! // A = L·Lᵀ
//! let mut abuf = [4.0_f64, 2.0, 2.0, 3.0];
//! let a = MatrixView::new(2, 2, &abuf).unwrap();
//!
//! let mut l = [0.0; 4];
//! let mut l = MatrixViewMut::new(2, 2, &mut l).unwrap();
//! linalg::cholesky(&a, &mut l).unwrap();
//! assert_eq!(l[(0, 0)], 2.0);
//! assert_eq!(l[(0, 1)], 0.0);
//!
//! // A⁻¹ into a caller buffer; A is factored in place and handed back
//! let mut a = MatrixViewMut::new(2, 2, &mut abuf).unwrap();
//! let mut inv = [0.0; 4];
//! let mut inv = MatrixViewMut::new(2, 2, &mut inv).unwrap();
//! linalg::inverse(&mut a, &mut inv).unwrap();
//! assert!((inv[(0, 0)] - 0.375).abs() < 1e-12);
//! assert_eq!(inv.nrows(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`]: `MatrixView` and `MatrixViewMut`, row-major views with a
//!   runtime shape bounded by the slice they borrow. Element access, block
//!   copy/add/subtract, products (plain, transposed, diagonal), norms and
//!   square-matrix helpers such as `symmetrize` and `force_positive`.
//!
//! - [`linalg`]: Cholesky (with rank-1 update/downdate and restore), LU
//!   with partial pivoting, LDLᵀ, Householder QR, triangular inverse, SPD
//!   inverse and right division `X = B·A⁻¹`. Free functions over
//!   [`MatrixRef`] / [`MatrixMut`].
//!
//! - [`estimate`]: [`Ukf`], [`SrUkf`] (square-root UKF) and [`Cf`]
//!   (complementary filter with PI error feedback). All share the
//!   [`Estimator`] state accessors.
//!
//! - [`filter`]: scalar signal conditioning, [`filter::LowPass`] and
//!   [`filter::RateLimiter`] behind the [`filter::SignalFilter`] trait.
//!
//! - [`math`]: scalar helpers (`sqrt`, trigonometry, `sign`, clamping)
//!   and the default scalar [`math::Real`].
//!
//! - [`traits`]: element traits.
//!   - [`Scalar`]: all matrix elements
//!   - [`FloatScalar`]: `f32` / `f64`, used by decompositions and filters
//!   - [`MatrixRef`] / [`MatrixMut`]: generic read/write access for algorithms
//!
//! ## Cargo features
//!
//! | Feature | Default  | Description |
//! |---------|----------|-------------|
//! | `std`   | yes      | Hardware FPU via system libm, `std::error::Error` impls |
//! | `libm`  | baseline | Pure-Rust software float fallback |
//! | `f32`   | no       | [`math::Real`] becomes `f32` instead of `f64` |
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade: rejected
//! shapes at `debug`, numerical failures inside filters at `warn`, and one
//! line per filter step at `trace`. Nothing is printed unless the
//! application installs a logger.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod estimate;
pub mod filter;
pub mod linalg;
pub mod math;
pub mod matrix;
pub mod traits;

pub use estimate::{Cf, EstimateError, Estimator, SigmaParams, SrUkf, Ukf};
pub use matrix::{MatrixError, MatrixView, MatrixViewMut, MAX_DIM};
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};

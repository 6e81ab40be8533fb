//! State estimation: UKF, square-root UKF and a complementary filter.
//!
//! All three keep their buffers inline, sized by const generics: `N` is the
//! state capacity and `M` the measurement capacity (`L`, the control-input
//! capacity, for [`Cf`]). The actual state length is fixed at construction
//! and may be anything from 1 up to the capacity. Nothing is allocated.
//!
//! Process and measurement models are closures writing into an output slice,
//! so they can carry whatever context they need (time step, control input,
//! reference vectors).
//!
//! # Unscented Kalman Filter
//!
//! ```
//! use sigmakit::estimate::{Estimator, Ukf};
//! use sigmakit::MatrixView;
//!
//! // 2-state constant velocity, position measured
//! let mut ukf = Ukf::<f64, 2, 1>::new(&[0.0, 1.0]).unwrap();
//!
//! let dt = 0.1;
//! let q = [0.01, 0.0, 0.0, 0.01];
//! let q = MatrixView::new(2, 2, &q).unwrap();
//! let r = MatrixView::new(1, 1, &[0.5]).unwrap();
//!
//! ukf.predict(
//!     |x, next| {
//!         next[0] = x[0] + dt * x[1];
//!         next[1] = x[1];
//!     },
//!     Some(&q),
//! )
//! .unwrap();
//!
//! ukf.update(|x, z| z[0] = x[0], &[0.12], &r).unwrap();
//! assert!((ukf.state_at(0).unwrap() - 0.11).abs() < 0.01);
//! ```
//!
//! # Complementary filter
//!
//! ```
//! use sigmakit::estimate::{Cf, Estimator};
//!
//! // integrate a rate, correct the angle from an absolute sensor
//! let mut cf = Cf::<f64, 1, 1>::new(&[0.0], 1).unwrap();
//! for _ in 0..200 {
//!     cf.predict(|dt, u, x, next| next[0] = x[0] + dt * u[0], 0.01, &[0.0], &[0.0])
//!         .unwrap();
//!     cf.update(|x, z, e| e[0] = z[0] - x[0], 0.01, &[1.0], &[0.05]).unwrap();
//! }
//! assert!((cf.state()[0] - 1.0).abs() < 0.05);
//! ```

mod cf;
mod sigma;
mod srukf;
mod ukf;


pub use cf::Cf;
pub use sigma::SigmaParams;
pub use srukf::SrUkf;
pub use ukf::Ukf;

use crate::matrix::{MatrixError, MAX_DIM};

/// Errors from state estimation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateError {
    /// A matrix operation inside a filter step failed.
    Matrix(MatrixError),
    /// Covariance (or a noise matrix) is not positive definite.
    CovarianceNotPD,
    /// State or measurement length exceeds the filter's capacity.
    CapacityExceeded,
    /// Argument lengths disagree with the filter's dimensions.
    DimensionMismatch,
    /// Time step must be strictly positive.
    InvalidTimeStep,
    /// Sigma-point scaling leaves `n + lambda <= 0`.
    InvalidParameters,
}

impl From<MatrixError> for EstimateError {
    fn from(e: MatrixError) -> Self {
        EstimateError::Matrix(e)
    }
}

impl core::fmt::Display for EstimateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EstimateError::Matrix(e) => write!(f, "matrix operation failed: {e}"),
            EstimateError::CovarianceNotPD => {
                write!(f, "covariance matrix is not positive definite")
            }
            EstimateError::CapacityExceeded => {
                write!(f, "dimension exceeds the filter capacity")
            }
            EstimateError::DimensionMismatch => write!(f, "argument dimensions do not agree"),
            EstimateError::InvalidTimeStep => write!(f, "time step must be positive"),
            EstimateError::InvalidParameters => {
                write!(f, "sigma-point parameters give a non-positive spread")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EstimateError {}

/// Read access to the state vector shared by every filter.
pub trait Estimator<T: Copy> {
    /// Number of states chosen at construction.
    fn n_states(&self) -> usize;

    /// The current estimate, `n_states()` long.
    fn state(&self) -> &[T];

    /// Mutable access for constraint handling (e.g. renormalizing a
    /// quaternion between steps). The sigma-point filters treat any call as
    /// an edit and regenerate their points around the new mean at the next
    /// `update`.
    fn state_mut(&mut self) -> &mut [T];

    /// Component `i` of the estimate, `None` when out of range.
    #[inline]
    fn state_at(&self, i: usize) -> Option<T> {
        self.state().get(i).copied()
    }
}

/// Validate a state length against capacity `cap` for a filter that needs
/// `rows(n)` rows in its largest internal view.
pub(crate) fn check_states(n: usize, cap: usize, rows: usize) -> Result<(), EstimateError> {
    if n == 0 || n > cap || rows > MAX_DIM {
        log::debug!("state length {n} outside 1..={cap} (view rows {rows})");
        return Err(EstimateError::CapacityExceeded);
    }
    Ok(())
}

/// Validate a measurement length against capacity `cap`.
pub(crate) fn check_measurements(m: usize, cap: usize, rows: usize) -> Result<(), EstimateError> {
    if m == 0 || m > cap || rows > MAX_DIM {
        log::debug!("measurement length {m} outside 1..={cap} (view rows {rows})");
        return Err(EstimateError::CapacityExceeded);
    }
    Ok(())
}

#[inline]
pub(crate) fn wrong_len(op: &'static str) -> EstimateError {
    log::debug!("{op}: argument dimensions do not agree");
    EstimateError::DimensionMismatch
}

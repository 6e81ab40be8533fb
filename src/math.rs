//! Scalar math facade.
//!
//! Thin wrappers over [`num_traits::Float`] so that every algorithm in the
//! crate goes through one place for `sqrt`, trigonometry and ordering
//! helpers. With the `std` feature the system libm is used; otherwise the
//! pure-Rust `libm` fallback is selected by `num-traits`.
//!
//! [`Real`] is the crate-wide default scalar: `f64`, or `f32` when the `f32`
//! feature is enabled. All generic types accept either width regardless.
//!
//! ```
//! use sigmakit::math;
//!
//! assert_eq!(math::sqrt(9.0_f64), 3.0);
//! assert_eq!(math::sign(-2.5_f64), -1.0);
//! assert_eq!(math::constrained(7.0_f64, 0.0, 5.0), 5.0);
//! ```

use crate::traits::FloatScalar;

/// Default scalar width.
#[cfg(not(feature = "f32"))]
pub type Real = f64;

/// Default scalar width.
#[cfg(feature = "f32")]
pub type Real = f32;

/// π at the default scalar width.
#[cfg(not(feature = "f32"))]
pub const PI: Real = core::f64::consts::PI;

/// π at the default scalar width.
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;

/// True when [`Real`] is double precision.
#[inline]
pub const fn using_double() -> bool {
    core::mem::size_of::<Real>() == core::mem::size_of::<f64>()
}

#[inline]
pub fn sqrt<T: FloatScalar>(x: T) -> T {
    x.sqrt()
}

#[inline]
pub fn abs<T: FloatScalar>(x: T) -> T {
    x.abs()
}

#[inline]
pub fn sin<T: FloatScalar>(x: T) -> T {
    x.sin()
}

#[inline]
pub fn cos<T: FloatScalar>(x: T) -> T {
    x.cos()
}

#[inline]
pub fn tan<T: FloatScalar>(x: T) -> T {
    x.tan()
}

#[inline]
pub fn asin<T: FloatScalar>(x: T) -> T {
    x.asin()
}

#[inline]
pub fn acos<T: FloatScalar>(x: T) -> T {
    x.acos()
}

#[inline]
pub fn atan<T: FloatScalar>(x: T) -> T {
    x.atan()
}

#[inline]
pub fn atan2<T: FloatScalar>(y: T, x: T) -> T {
    y.atan2(x)
}

/// `-1` for negative inputs, `+1` otherwise (zero maps to `+1`).
#[inline]
pub fn sign<T: FloatScalar>(x: T) -> T {
    if x < T::zero() {
        -T::one()
    } else {
        T::one()
    }
}

/// Smaller of two values (`a` when they compare equal).
#[inline]
pub fn minimum<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

/// Larger of two values (`a` when they compare equal).
#[inline]
pub fn maximum<T: PartialOrd>(a: T, b: T) -> T {
    if b > a {
        b
    } else {
        a
    }
}

/// Clamp `x` into `[lo, hi]`.
#[inline]
pub fn constrained<T: PartialOrd>(x: T, lo: T, hi: T) -> T {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_of_zero_is_positive() {
        assert_eq!(sign(0.0_f64), 1.0);
        assert_eq!(sign(-0.0_f32), 1.0);
        assert_eq!(sign(-1e-30_f64), -1.0);
    }

    #[test]
    fn min_max_clamp() {
        assert_eq!(minimum(3, 4), 3);
        assert_eq!(maximum(3.0, 4.0), 4.0);
        assert_eq!(constrained(-1.0_f64, 0.0, 1.0), 0.0);
        assert_eq!(constrained(0.5_f64, 0.0, 1.0), 0.5);
    }

    #[test]
    fn trig_round_trip() {
        let x = 0.3_f64;
        assert!((asin(sin(x)) - x).abs() < 1e-15);
        assert!((acos(cos(x)) - x).abs() < 1e-15);
        assert!((atan(tan(x)) - x).abs() < 1e-15);
        assert!((atan2(1.0_f64, 1.0) - PI as f64 / 4.0).abs() < 1e-6);
    }

    #[test]
    fn real_width() {
        assert_eq!(using_double(), core::mem::size_of::<Real>() == 8);
    }
}

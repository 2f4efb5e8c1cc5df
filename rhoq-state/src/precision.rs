//! Scalar precision abstraction
//!
//! Every kernel is generic over the real scalar so the engine runs in
//! single or double precision. `f64` is the default throughout the public
//! API; `f32` halves the footprint of ρ at the cost of looser tolerances.

use num_complex::Complex;
use num_traits::{Float, FloatConst, NumAssign};
use std::fmt;
use std::iter::Sum;

/// Real scalar usable as the element type of a density matrix
pub trait Real:
    Float + FloatConst + NumAssign + Sum + Send + Sync + fmt::Debug + fmt::Display + 'static
{
    /// Lossless-enough conversion from a double literal
    fn from_f64(value: f64) -> Self;

    /// Widen to double
    fn to_f64(self) -> f64;
}

impl Real for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Real for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Complex scalar over a [`Real`]
pub type Cplx<T> = Complex<T>;

/// Complex value from double literals
#[inline]
pub fn cplx<T: Real>(re: f64, im: f64) -> Cplx<T> {
    Complex::new(T::from_f64(re), T::from_f64(im))
}

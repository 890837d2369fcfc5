// src/backend/number.rs

use ndarray::{LinalgScalar, ScalarOperand};
use rand_distr::num_traits::{FromPrimitive, One, Zero};
use std::cmp::{PartialEq, PartialOrd};
use std::default::Default;
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Base trait for all numeric types usable inside tensors.
/// Provides a common interface for arithmetic, comparisons and conversions
/// so the rest of the crate never has to name a concrete scalar type.
pub trait SimnetN:
    Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Div<Output = Self>
    + AddAssign
    + Neg<Output = Self>
    + Sum<Self> + for<'a> Sum<&'a Self>
    + PartialOrd + PartialEq
    + Clone + Copy + Debug + Display + Default
    + Zero + One + FromPrimitive
    + LinalgScalar + ScalarOperand
    + 'static
{
    /// Neutral element for addition (zero)
    fn zero() -> Self;

    /// Neutral element for multiplication (one)
    fn one() -> Self;

    /// Absolute value
    fn abs(self) -> Self;

    /// Converts to f64 for operations that require floating point
    fn to_f64(self) -> f64;

    /// Converts to f32 for operations that require floating point
    fn to_f32(self) -> f32;

    /// Converts from f32 (may fail if there's precision loss)
    fn from_f32(value: f32) -> Option<Self>;

    /// Converts from f64 (may fail if there's precision loss)
    fn from_f64(value: f64) -> Option<Self>;

    /// Minimum value representable by this type
    fn min_value() -> Self;

    /// Maximum value representable by this type
    fn max_value() -> Self;
}

/// Additional trait for floating-point scalar types.
pub trait SimnetF: SimnetN {
    /// Square root
    fn sqrt(self) -> Self;

    /// Exponential function (e^x)
    fn exp(self) -> Self;

    /// Natural logarithm
    fn ln(self) -> Self;

    /// Power with floating-point exponent
    fn powf(self, exp: Self) -> Self;

    /// Checks if it's NaN
    fn is_nan(self) -> bool;

    /// Checks if it's finite
    fn is_finite(self) -> bool;

    /// Epsilon for floating-point comparisons
    fn epsilon() -> Self;
}

// ============= IMPLEMENTATIONS =============

impl SimnetN for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn abs(self) -> Self {
        self.abs()
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn to_f32(self) -> f32 {
        self as f32
    }

    fn from_f32(value: f32) -> Option<Self> {
        Some(value as f64)
    }

    fn from_f64(value: f64) -> Option<Self> {
        Some(value)
    }

    fn min_value() -> Self {
        f64::MIN
    }

    fn max_value() -> Self {
        f64::MAX
    }
}

impl SimnetF for f64 {
    fn sqrt(self) -> Self {
        self.sqrt()
    }

    fn exp(self) -> Self {
        self.exp()
    }

    fn ln(self) -> Self {
        self.ln()
    }

    fn powf(self, exp: Self) -> Self {
        self.powf(exp)
    }

    fn is_nan(self) -> bool {
        self.is_nan()
    }

    fn is_finite(self) -> bool {
        self.is_finite()
    }

    fn epsilon() -> Self {
        f64::EPSILON
    }
}

impl SimnetN for f32 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn abs(self) -> Self {
        self.abs()
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn to_f32(self) -> f32 {
        self
    }

    fn from_f32(value: f32) -> Option<Self> {
        Some(value)
    }

    fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value >= f32::MIN as f64 && value <= f32::MAX as f64 {
            Some(value as f32)
        } else {
            None
        }
    }

    fn min_value() -> Self {
        f32::MIN
    }

    fn max_value() -> Self {
        f32::MAX
    }
}

impl SimnetF for f32 {
    fn sqrt(self) -> Self {
        self.sqrt()
    }

    fn exp(self) -> Self {
        self.exp()
    }

    fn ln(self) -> Self {
        self.ln()
    }

    fn powf(self, exp: Self) -> Self {
        self.powf(exp)
    }

    fn is_nan(self) -> bool {
        self.is_nan()
    }

    fn is_finite(self) -> bool {
        self.is_finite()
    }

    fn epsilon() -> Self {
        f32::EPSILON
    }
}

//! Unit newtypes for distribution-feeder quantities.
//!
//! Distribution solvers report power in watts/vars and voltages in volts, while
//! everything this workspace hands downstream is expressed in kilo-units or
//! per-unit. Mixing the two scales is the most common extraction bug, so each
//! quantity gets its own wrapper and conversions are explicit.
//!
//! # Usage
//!
//! ```
//! use feeder_core::units::{Kilowatts, Kilovars, Kilovolts, Volts};
//!
//! let p = Kilowatts::from_watts(1500.0);
//! let q = Kilovars::from_vars(200.0);
//! assert_eq!(p.value(), 1.5);
//!
//! // let wrong = p + q;  // does not compile: Kilowatts + Kilovars
//! let s = p.apparent_power(q);
//! assert!(s.value() > p.value());
//!
//! let base = Kilovolts(2.4).to_volts();
//! assert_eq!(base, Volts(2400.0));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Implements the arithmetic shared by every unit wrapper.
macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// =============================================================================
// Power Units
// =============================================================================

/// Active power in kilowatts (kW)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl_unit_ops!(Kilowatts, "kW");

/// Reactive power in kilovolt-amperes reactive (kVAr)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovars(pub f64);

impl_unit_ops!(Kilovars, "kVAr");

/// Apparent power in kilovolt-amperes (kVA)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KilovoltAmperes(pub f64);

impl_unit_ops!(KilovoltAmperes, "kVA");

impl Kilowatts {
    /// Scale a solver sample reported in watts.
    #[inline]
    pub fn from_watts(watts: f64) -> Self {
        Kilowatts(watts / 1000.0)
    }

    /// S = √(P² + Q²)
    #[inline]
    pub fn apparent_power(self, q: Kilovars) -> KilovoltAmperes {
        KilovoltAmperes(self.0.hypot(q.0))
    }
}

impl Kilovars {
    /// Scale a solver sample reported in vars.
    #[inline]
    pub fn from_vars(vars: f64) -> Self {
        Kilovars(vars / 1000.0)
    }
}

// =============================================================================
// Voltage Units
// =============================================================================

/// Voltage magnitude in per-unit (pu) of a bus base voltage
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct PerUnit(pub f64);

impl_unit_ops!(PerUnit, "pu");

/// Voltage in kilovolts (kV)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV");

/// Voltage in volts (V), the scale terminal magnitudes are reported in
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Volts(pub f64);

impl_unit_ops!(Volts, "V");

impl Kilovolts {
    #[inline]
    pub fn to_volts(self) -> Volts {
        Volts(self.0 * 1000.0)
    }
}

impl Volts {
    /// Normalize against a base voltage.
    ///
    /// Returns `None` when the base is zero or not finite, so callers can
    /// surface the bad base instead of propagating `inf`/`NaN`.
    #[inline]
    pub fn checked_per_unit(self, base: Volts) -> Option<PerUnit> {
        if !base.0.is_finite() || base.0.abs() < 1e-12 {
            None
        } else {
            Some(PerUnit(self.0 / base.0))
        }
    }
}

//! # Unit Types
//!
//! Type-safe wrappers for the process units the calculators work in. These
//! are plain `f64` newtypes: they keep `power` and `speed` from being swapped
//! in formula signatures while serializing as bare numbers.
//!
//! ## Metric Units (Primary)
//!
//! Laser process parameters are quoted in shop-floor units:
//! - Length: millimetres (mm)
//! - Power: watts (W)
//! - Feed rate: millimetres per minute (mm/min)
//! - Line energy: joules per millimetre (J/mm)
//! - Temperature: degrees Celsius (°C)
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::units::{MmPerMin, Watts};
//!
//! let line_energy = Watts(3000.0) / MmPerMin(2000.0);
//! assert_eq!(line_energy.0, 90.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length / Feed
// ============================================================================

/// Length in millimetres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Feed rate in millimetres per minute
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MmPerMin(pub f64);

impl MmPerMin {
    /// Feed rate in millimetres per second
    pub fn per_second(self) -> f64 {
        self.0 / 60.0
    }

    /// Seconds needed to travel `length`
    pub fn travel_time_s(self, length: Millimeters) -> f64 {
        length.0 / self.per_second()
    }
}

// ============================================================================
// Power / Energy
// ============================================================================

/// Power in watts
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f64);

/// Line energy (heat input) in joules per millimetre
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoulesPerMm(pub f64);

impl Watts {
    /// Power in kilowatts
    pub fn kilowatts(self) -> f64 {
        self.0 / 1000.0
    }
}

/// Heat input Q = P × 60 / v
impl Div<MmPerMin> for Watts {
    type Output = JoulesPerMm;
    fn div(self, rhs: MmPerMin) -> JoulesPerMm {
        JoulesPerMm(self.0 * 60.0 / rhs.0)
    }
}

// ============================================================================
// Temperature
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(pub f64);

// ============================================================================
// Arithmetic Operations
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(MmPerMin);
impl_arithmetic!(Watts);
impl_arithmetic!(JoulesPerMm);
impl_arithmetic!(Celsius);

// ============================================================================
// Rounding
// ============================================================================

/// Round to a fixed number of decimal places.
///
/// Applied once, when a result struct is assembled; intermediate math always
/// runs at full precision.
///
/// ```rust
/// use calc_engine::units::round_to;
///
/// assert_eq!(round_to(0.12345, 3), 0.123);
/// assert_eq!(round_to(1234.56, 0), 1235.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_input() {
        let q = Watts(3000.0) / MmPerMin(2000.0);
        assert!((q.0 - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_feed_conversion() {
        let v = MmPerMin(1200.0);
        assert_eq!(v.per_second(), 20.0);
        assert_eq!(v.travel_time_s(Millimeters(100.0)), 5.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Millimeters(2.0) + Millimeters(3.0);
        assert_eq!(a, Millimeters(5.0));
        assert_eq!(Watts(1000.0) * 1.5, Watts(1500.0));
        assert_eq!(Watts(1500.0).kilowatts(), 1.5);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(2.5551, 2), 2.56);
        assert_eq!(round_to(-0.0004, 3), -0.0);
        assert_eq!(round_to(7.0, 1), 7.0);
    }

    #[test]
    fn test_transparent_serialization() {
        let json = serde_json::to_string(&Celsius(20.5)).unwrap();
        assert_eq!(json, "20.5");
    }
}

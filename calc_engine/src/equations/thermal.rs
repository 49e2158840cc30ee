//! # Thermal Formulas for a Moving Cut Front
//!
//! Simplified conduction model of a laser cut: the beam dwells on a point for
//! the interaction time, heat diffuses sideways over the diffusion length,
//! and the temperature decays exponentially away from the kerf wall.
//!
//! ## Units
//!
//! - power W, speed mm/min, lengths mm, time s
//! - thermal diffusivity α in mm²/s
//! - line energy in J/mm

use crate::units::{MmPerMin, Watts};

/// Line energy Q = P × 60 / v (J/mm)
///
/// # Example
/// ```rust
/// use calc_engine::equations::thermal::heat_input;
///
/// // 3 kW at 2 m/min
/// assert!((heat_input(3000.0, 2000.0) - 90.0).abs() < 1e-9);
/// ```
#[inline]
pub fn heat_input(power_w: f64, speed_mm_min: f64) -> f64 {
    (Watts(power_w) / MmPerMin(speed_mm_min)).0
}

/// Time the beam spends over one point, t = d / (v/60) (s)
#[inline]
pub fn interaction_time(beam_diameter_mm: f64, speed_mm_min: f64) -> f64 {
    beam_diameter_mm / (speed_mm_min / 60.0)
}

/// Thermal diffusion length L = √(α t) (mm)
#[inline]
pub fn diffusion_length(diffusivity_mm2_s: f64, time_s: f64) -> f64 {
    (diffusivity_mm2_s * time_s).sqrt()
}

/// Decay length λ of T(d) = T0 + (Tm - T0)·exp(-d/λ) chosen so that the
/// profile crosses `boundary_c` exactly at `boundary_distance`.
///
/// Requires `peak_c > boundary_c > ambient_c` and a positive distance.
pub fn decay_length(boundary_distance: f64, peak_c: f64, boundary_c: f64, ambient_c: f64) -> f64 {
    let ratio = (peak_c - ambient_c) / (boundary_c - ambient_c);
    boundary_distance / ratio.ln()
}

/// Temperature at distance `d` from the kerf wall
#[inline]
pub fn exponential_profile(d: f64, peak_c: f64, ambient_c: f64, decay_length: f64) -> f64 {
    ambient_c + (peak_c - ambient_c) * (-d / decay_length).exp()
}

/// Mean cooling rate (°C/s) from peak to ambient over `time_s`
#[inline]
pub fn cooling_rate(peak_c: f64, ambient_c: f64, time_s: f64) -> f64 {
    (peak_c - ambient_c) / time_s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_time() {
        // 0.1 mm beam at 6 m/min = 100 mm/s → 1 ms
        assert!((interaction_time(0.1, 6000.0) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn test_profile_hits_boundary_temperature() {
        let lambda = decay_length(0.5, 1500.0, 700.0, 20.0);
        let t = exponential_profile(0.5, 1500.0, 20.0, lambda);
        assert!((t - 700.0).abs() < 1e-9);
        assert!((exponential_profile(0.0, 1500.0, 20.0, lambda) - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_profile_strictly_decreasing() {
        let lambda = decay_length(1.0, 1400.0, 500.0, 25.0);
        let mut previous = f64::INFINITY;
        for i in 0..=10 {
            let t = exponential_profile(i as f64 * 0.2, 1400.0, 25.0, lambda);
            assert!(t < previous);
            previous = t;
        }
    }
}

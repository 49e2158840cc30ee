//! # Simply Supported Strip Formulas
//!
//! A panel spanning between two supports under a uniform line load `w`
//! (N/mm) over span `L` (mm). `E` in MPa, `I` in mm⁴.
//!
//! ```text
//!    ↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓ w
//!    ═════════════════
//!    △                △
//!   R1  ←─────L─────→ R2
//! ```
//!
//! Sign convention: loads and deflection positive in the load direction.

/// R1 = R2 = wL/2
#[inline]
pub fn uniform_load_reaction(w: f64, l: f64) -> f64 {
    w * l / 2.0
}

/// M_max = wL²/8 at midspan
///
/// # Example
/// ```rust
/// use calc_engine::equations::beam::uniform_load_max_moment;
///
/// // 1 N/mm over 2 m
/// assert!((uniform_load_max_moment(1.0, 2000.0) - 500_000.0).abs() < 1e-6);
/// ```
#[inline]
pub fn uniform_load_max_moment(w: f64, l: f64) -> f64 {
    w * l * l / 8.0
}

/// δ_max = 5wL⁴ / (384EI) at midspan
#[inline]
pub fn uniform_load_max_deflection(w: f64, l: f64, e: f64, i: f64) -> f64 {
    5.0 * w * l.powi(4) / (384.0 * e * i)
}

/// Bending stress σ = M/S
#[inline]
pub fn bending_stress(moment: f64, section_modulus: f64) -> f64 {
    moment / section_modulus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_moment_from_reaction() {
        // Midspan moment = R·L/2 - w(L/2)²/2
        let (w, l) = (2.5, 1200.0);
        let half = l / 2.0;
        let from_statics = uniform_load_reaction(w, l) * half - w * half * half / 2.0;
        assert!((from_statics - uniform_load_max_moment(w, l)).abs() < 1e-6);
    }

    #[test]
    fn test_deflection_scales_with_span_to_fourth() {
        let d1 = uniform_load_max_deflection(1.0, 1000.0, 200_000.0, 1.0e6);
        let d2 = uniform_load_max_deflection(1.0, 2000.0, 200_000.0, 1.0e6);
        assert!((d2 / d1 - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_reaction_is_half_total_load() {
        assert!((uniform_load_reaction(3.0, 1000.0) - 1500.0).abs() < 1e-9);
    }
}

//! # Cross-Section Properties
//!
//! Geometric properties of the solid rectangular strip that remains of a
//! perforated panel. Dimensions in mm; results in mm², mm⁴, mm³.
//!
//! ## Notation
//!
//! - `b` = strip width (perpendicular to span)
//! - `t` = plate thickness (bending depth)

/// Width of solid material left after perforation.
///
/// `open_area_pct` is the perforated share of the face, 0-100.
///
/// # Example
/// ```rust
/// use calc_engine::equations::section::effective_width;
///
/// assert!((effective_width(1000.0, 25.0) - 750.0).abs() < 1e-9);
/// ```
#[inline]
pub fn effective_width(width: f64, open_area_pct: f64) -> f64 {
    width * (1.0 - open_area_pct / 100.0)
}

/// A = b × t
#[inline]
pub fn rectangular_area(b: f64, t: f64) -> f64 {
    b * t
}

/// Second moment of area about the plate mid-plane.
///
/// # Formula
/// I = b t³ / 12
///
/// # Example
/// ```rust
/// use calc_engine::equations::section::rectangular_moment_of_inertia;
///
/// // 1000 mm wide, 3 mm plate
/// let i = rectangular_moment_of_inertia(1000.0, 3.0);
/// assert!((i - 2250.0).abs() < 1e-9);
/// ```
#[inline]
pub fn rectangular_moment_of_inertia(b: f64, t: f64) -> f64 {
    b * t.powi(3) / 12.0
}

/// Elastic section modulus, S = I / (t/2) = b t² / 6
#[inline]
pub fn rectangular_section_modulus(b: f64, t: f64) -> f64 {
    b * t.powi(2) / 6.0
}

/// Section properties bundled for reporting
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SectionProperties {
    pub effective_width_mm: f64,
    pub area_mm2: f64,
    pub moment_of_inertia_mm4: f64,
    pub section_modulus_mm3: f64,
}

impl SectionProperties {
    pub fn perforated_strip(width: f64, thickness: f64, open_area_pct: f64) -> Self {
        let b = effective_width(width, open_area_pct);
        SectionProperties {
            effective_width_mm: b,
            area_mm2: rectangular_area(b, thickness),
            moment_of_inertia_mm4: rectangular_moment_of_inertia(b, thickness),
            section_modulus_mm3: rectangular_section_modulus(b, thickness),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_modulus_is_i_over_c() {
        let (b, t) = (800.0, 4.0);
        let i = rectangular_moment_of_inertia(b, t);
        let s = rectangular_section_modulus(b, t);
        assert!((s - i / (t / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_perforation_reduces_every_property() {
        let solid = SectionProperties::perforated_strip(1000.0, 3.0, 0.0);
        let perforated = SectionProperties::perforated_strip(1000.0, 3.0, 40.0);
        assert!((perforated.area_mm2 - 0.6 * solid.area_mm2).abs() < 1e-9);
        assert!(perforated.moment_of_inertia_mm4 < solid.moment_of_inertia_mm4);
        assert!(perforated.section_modulus_mm3 < solid.section_modulus_mm3);
    }
}

//! # Architectural Panel Check
//!
//! Strength and stiffness check of a laser-cut (perforated) facade or infill
//! panel spanning one way between two supports.
//!
//! ## Assumptions
//!
//! - Simply supported strip, span measured between supports
//! - Only the solid share of the width carries bending:
//!   `b = width × (1 − open_area / 100)`
//! - Live and wind pressures act on the gross face; self-weight on the solid
//!   material only
//! - LRFD strength with φ = 0.9 on yield; unfactored service combinations for
//!   deflection
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::calculations::architectural_panel::{calculate, Exposure, PanelInput, PanelVerdict};
//! use calc_engine::materials::DomainLibrary;
//!
//! let input = PanelInput {
//!     material: "aluminum_6061".to_string(),
//!     thickness_mm: 6.0,
//!     panel_width_mm: 1000.0,
//!     span_mm: 600.0,
//!     open_area_pct: 20.0,
//!     live_load_kpa: 0.5,
//!     wind_load_kpa: 1.0,
//!     deflection_limit: 180.0,
//!     exposure: Exposure::Exterior,
//! };
//!
//! let result = calculate(&input, DomainLibrary::global()).unwrap();
//! assert_eq!(result.verdict, PanelVerdict::Compliant);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ensure_finite, resolve_key, to_payload};
use crate::compose::Advisory;
use crate::equations::beam::uniform_load_reaction;
use crate::equations::{bending_stress, uniform_load_max_deflection, uniform_load_max_moment, SectionProperties};
use crate::errors::{EngineError, EngineResult};
use crate::fields::{FieldSpec, InputRecord};
use crate::loads::{
    find_governing_combination, service_combinations, strength_combinations, GoverningCombination, LoadCase,
    LoadType,
};
use crate::materials::{DomainLibrary, StructuralMaterial, TableKey};
use crate::registry::Calculator;
use crate::units::round_to;
use crate::validation::ValidationIssue;

const CALC: &str = "architectural-panel";

/// Resistance factor on yield for flexure
pub const PHI_BENDING: f64 = 0.9;

/// Utilization above which the design is flagged as tight
const HIGH_UTILIZATION: f64 = 0.9;

/// Open area above which perforation dominates panel behaviour (%)
const HIGH_OPEN_AREA_PCT: f64 = 50.0;

const GRAVITY: f64 = 9.81;

/// Thicknesses are recommended in these increments (mm)
const THICKNESS_INCREMENT_MM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    Interior,
    Exterior,
    Marine,
}

impl Exposure {
    pub const KEYS: [&'static str; 3] = ["interior", "exterior", "marine"];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "interior" => Some(Exposure::Interior),
            "exterior" => Some(Exposure::Exterior),
            "marine" => Some(Exposure::Marine),
            _ => None,
        }
    }

    /// Minimum corrosion rating (1-5) suitable for this exposure
    pub fn required_corrosion_rating(&self) -> u8 {
        match self {
            Exposure::Interior => 1,
            Exposure::Exterior => 3,
            Exposure::Marine => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelInput {
    pub material: String,
    pub thickness_mm: f64,
    pub panel_width_mm: f64,
    pub span_mm: f64,
    pub open_area_pct: f64,
    pub live_load_kpa: f64,
    pub wind_load_kpa: f64,
    /// n in the L/n deflection limit
    pub deflection_limit: f64,
    pub exposure: Exposure,
}

impl PanelInput {
    pub fn from_record(record: &InputRecord) -> EngineResult<Self> {
        let exposure_key = record.text("exposure")?;
        let exposure = Exposure::from_key(exposure_key)
            .ok_or_else(|| EngineError::invalid_input("exposure", exposure_key, "Unknown exposure class"))?;
        Ok(PanelInput {
            material: record.text("material")?.to_string(),
            thickness_mm: record.number("thickness")?,
            panel_width_mm: record.number("panel_width")?,
            span_mm: record.number("span")?,
            open_area_pct: record.number("open_area")?,
            live_load_kpa: record.number("live_load")?,
            wind_load_kpa: record.number("wind_load")?,
            deflection_limit: record.number("deflection_limit")?,
            exposure,
        })
    }

    fn check(&self) -> EngineResult<()> {
        if self.open_area_pct >= 100.0 || self.open_area_pct < 0.0 {
            return Err(EngineError::invalid_input(
                "open_area",
                self.open_area_pct.to_string(),
                "Open area must leave solid material",
            ));
        }
        for (field, value) in [
            ("thickness", self.thickness_mm),
            ("panel_width", self.panel_width_mm),
            ("span", self.span_mm),
            ("deflection_limit", self.deflection_limit),
        ] {
            if value <= 0.0 {
                return Err(EngineError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelVerdict {
    Compliant,
    DeflectionExceeded,
    StrengthExceeded,
    BothExceeded,
}

impl PanelVerdict {
    pub fn from_checks(strength_ok: bool, deflection_ok: bool) -> Self {
        match (strength_ok, deflection_ok) {
            (true, true) => PanelVerdict::Compliant,
            (true, false) => PanelVerdict::DeflectionExceeded,
            (false, true) => PanelVerdict::StrengthExceeded,
            (false, false) => PanelVerdict::BothExceeded,
        }
    }

    pub fn passes(&self) -> bool {
        *self == PanelVerdict::Compliant
    }
}

/// Unfactored line loads on the strip (N/mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineLoads {
    pub dead_n_mm: f64,
    pub live_n_mm: f64,
    pub wind_n_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationResult {
    pub name: String,
    pub load_n_mm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelResult {
    pub material: String,
    pub material_name: String,
    pub effective_width_mm: f64,
    pub area_mm2: f64,
    pub moment_of_inertia_mm4: f64,
    pub section_modulus_mm3: f64,
    pub line_loads: LineLoads,
    pub strength_combinations: Vec<CombinationResult>,
    pub governing_strength: GoverningCombination,
    pub governing_service: GoverningCombination,
    pub max_moment_n_mm: f64,
    /// Factored end reaction per support (N)
    pub support_reaction_n: f64,
    pub bending_stress_mpa: f64,
    /// φ × Fy
    pub design_strength_mpa: f64,
    pub utilization: f64,
    pub deflection_mm: f64,
    pub allowable_deflection_mm: f64,
    /// span / δ; compared against `deflection_limit`
    pub deflection_ratio: f64,
    pub verdict: PanelVerdict,
    pub panel_mass_kg: f64,
    pub material_cost_usd: f64,
    /// Smallest thickness meeting both checks, when the panel fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_thickness_mm: Option<f64>,
    pub warnings: Vec<Advisory>,
    pub recommendations: Vec<Advisory>,
}

impl PanelResult {
    pub fn passes(&self) -> bool {
        self.verdict.passes()
    }
}

pub fn calculate(input: &PanelInput, library: &DomainLibrary) -> EngineResult<PanelResult> {
    input.check()?;

    let mut warnings = Vec::new();
    let material = resolve_key(&library.structural_materials, "material", &input.material, &mut warnings);
    let props = material.record;

    // === Section ===
    let section = SectionProperties::perforated_strip(input.panel_width_mm, input.thickness_mm, input.open_area_pct);

    // === Loads (kPa = 1e-3 N/mm²) ===
    let mass_per_mm_kg = props.density_kg_m3 * 1e-9 * section.area_mm2;
    let loads = LineLoads {
        dead_n_mm: mass_per_mm_kg * GRAVITY,
        live_n_mm: input.live_load_kpa * 1e-3 * input.panel_width_mm,
        wind_n_mm: input.wind_load_kpa * 1e-3 * input.panel_width_mm,
    };
    let case = LoadCase::new("Panel strip")
        .with_load(LoadType::Dead, loads.dead_n_mm)
        .with_load(LoadType::Live, loads.live_n_mm)
        .with_load(LoadType::Wind, loads.wind_n_mm);
    case.validate()?;

    let strength = strength_combinations();
    let governing_strength = find_governing_combination(&case, &strength);
    let governing_service = find_governing_combination(&case, &service_combinations());

    // === Strength ===
    let moment = uniform_load_max_moment(governing_strength.load, input.span_mm);
    let reaction = uniform_load_reaction(governing_strength.load, input.span_mm);
    let stress = bending_stress(moment, section.section_modulus_mm3);
    let design_strength = PHI_BENDING * props.yield_strength_mpa;
    let utilization = ensure_finite(CALC, "utilization", stress / design_strength)?;

    // === Stiffness ===
    let deflection = uniform_load_max_deflection(
        governing_service.load,
        input.span_mm,
        props.elastic_modulus_mpa(),
        section.moment_of_inertia_mm4,
    );
    let deflection = ensure_finite(CALC, "deflection", deflection)?;
    let deflection_ratio = if deflection > 0.0 {
        input.span_mm / deflection
    } else {
        f64::MAX
    };
    let allowable_deflection = input.span_mm / input.deflection_limit;

    let strength_ok = utilization <= 1.0;
    let deflection_ok = deflection <= allowable_deflection;
    let verdict = PanelVerdict::from_checks(strength_ok, deflection_ok);

    // σ ∝ 1/t², δ ∝ 1/t³ (self-weight neglected)
    let recommended_thickness = if verdict.passes() {
        None
    } else {
        let for_strength = input.thickness_mm * utilization.max(1.0).sqrt();
        let for_stiffness = input.thickness_mm * (deflection / allowable_deflection).max(1.0).cbrt();
        let needed = for_strength.max(for_stiffness);
        Some((needed / THICKNESS_INCREMENT_MM).ceil() * THICKNESS_INCREMENT_MM)
    };

    let panel_mass = mass_per_mm_kg * input.span_mm;

    // === Advisories ===
    if utilization > HIGH_UTILIZATION {
        warnings.push(Advisory::high(
            "HIGH_UTILIZATION",
            format!("Bending utilization is {:.0}% of design strength", utilization * 100.0),
        ));
    }
    let required_rating = input.exposure.required_corrosion_rating();
    if props.corrosion_rating < required_rating {
        warnings.push(Advisory::medium(
            "CORROSION_EXPOSURE",
            format!(
                "{} (corrosion rating {}/5) needs protection for {:?} exposure (rating {} recommended)",
                props.name, props.corrosion_rating, input.exposure, required_rating
            ),
        ));
    }
    if input.open_area_pct > HIGH_OPEN_AREA_PCT {
        warnings.push(Advisory::medium(
            "HIGH_OPEN_AREA",
            format!(
                "{:.0}% open area leaves little material between holes; check local buckling and edge distances",
                input.open_area_pct
            ),
        ));
    }

    let mut recommendations = Vec::new();
    if let Some(t) = recommended_thickness {
        recommendations.push(Advisory::high(
            "INCREASE_THICKNESS",
            format!("Increase thickness to {:.1} mm or reduce the span", t),
        ));
    } else if utilization < 0.3 && deflection_ratio > 2.0 * input.deflection_limit {
        recommendations.push(Advisory::low(
            "REDUCE_THICKNESS",
            "The panel is lightly loaded; a thinner sheet would save material",
        ));
    }

    Ok(PanelResult {
        material: material.key.key().to_string(),
        material_name: props.name.to_string(),
        effective_width_mm: round_to(section.effective_width_mm, 2),
        area_mm2: round_to(section.area_mm2, 2),
        moment_of_inertia_mm4: round_to(section.moment_of_inertia_mm4, 2),
        section_modulus_mm3: round_to(section.section_modulus_mm3, 2),
        line_loads: LineLoads {
            dead_n_mm: round_to(loads.dead_n_mm, 5),
            live_n_mm: round_to(loads.live_n_mm, 5),
            wind_n_mm: round_to(loads.wind_n_mm, 5),
        },
        strength_combinations: case
            .combination_results(&strength)
            .into_iter()
            .map(|(name, load)| CombinationResult {
                name,
                load_n_mm: round_to(load, 5),
            })
            .collect(),
        governing_strength: GoverningCombination {
            load: round_to(governing_strength.load, 5),
            ..governing_strength
        },
        governing_service: GoverningCombination {
            load: round_to(governing_service.load, 5),
            ..governing_service
        },
        max_moment_n_mm: round_to(moment, 1),
        support_reaction_n: round_to(reaction, 2),
        bending_stress_mpa: round_to(stress, 2),
        design_strength_mpa: round_to(design_strength, 1),
        utilization: round_to(utilization, 3),
        deflection_mm: round_to(deflection, 3),
        allowable_deflection_mm: round_to(allowable_deflection, 3),
        deflection_ratio: round_to(deflection_ratio.min(1.0e9), 1),
        verdict,
        panel_mass_kg: round_to(panel_mass, 3),
        material_cost_usd: round_to(panel_mass * props.cost_per_kg, 2),
        recommended_thickness_mm: recommended_thickness,
        warnings,
        recommendations,
    })
}

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::enumeration("material", "Panel material", &StructuralMaterial::keys(), "aluminum_6061").lenient(),
        FieldSpec::number("thickness", "Sheet thickness", 6.0)
            .range(0.5, 50.0)
            .step(0.5)
            .unit("mm"),
        FieldSpec::number("panel_width", "Panel width", 1000.0)
            .range(100.0, 5000.0)
            .step(10.0)
            .unit("mm"),
        FieldSpec::number("span", "Span between supports", 600.0)
            .range(100.0, 10000.0)
            .step(10.0)
            .unit("mm"),
        FieldSpec::number("open_area", "Perforation open area", 20.0)
            .range(0.0, 70.0)
            .step(1.0)
            .unit("%"),
        FieldSpec::number("live_load", "Live load", 0.5)
            .range(0.0, 10.0)
            .step(0.1)
            .unit("kPa"),
        FieldSpec::number("wind_load", "Wind load", 1.0)
            .range(0.0, 5.0)
            .step(0.1)
            .unit("kPa"),
        FieldSpec::number("deflection_limit", "Deflection limit (L/n)", 180.0)
            .range(60.0, 1000.0)
            .step(10.0)
            .optional(),
        FieldSpec::enumeration("exposure", "Exposure", &Exposure::KEYS, "exterior").optional(),
    ]
}

/// `architectural-panel` calculator
pub struct ArchitecturalPanel;

impl Calculator for ArchitecturalPanel {
    fn id(&self) -> &'static str {
        CALC
    }

    fn name(&self) -> &'static str {
        "Architectural Panel Check"
    }

    fn description(&self) -> &'static str {
        "Bending strength and deflection of a perforated laser-cut panel under dead, live and wind load"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        fields()
    }

    fn cross_validate(&self, input: &InputRecord, library: &DomainLibrary) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let (Ok(material), Ok(exposure)) = (input.text("material"), input.text("exposure")) {
            let props = library.structural_materials.resolve(material).record;
            if let Some(exposure) = Exposure::from_key(exposure) {
                if exposure == Exposure::Marine && props.corrosion_rating < exposure.required_corrosion_rating() {
                    issues.push(ValidationIssue::warning(
                        "material",
                        "CORROSION_EXPOSURE",
                        format!("{} is not suited to marine exposure without coating", props.name),
                    ));
                }
            }
        }
        if let (Ok(span), Ok(thickness)) = (input.number("span"), input.number("thickness")) {
            if span / thickness > 500.0 {
                issues.push(ValidationIssue::warning(
                    "span",
                    "SLENDER_PANEL",
                    format!("Span is {:.0} times the thickness; stiffness will govern", span / thickness),
                ));
            }
        }
        issues
    }

    fn compute(&self, input: &InputRecord, library: &DomainLibrary) -> EngineResult<Value> {
        let input = PanelInput::from_record(input)?;
        to_payload(&calculate(&input, library)?)
    }

    fn example_inputs(&self) -> InputRecord {
        InputRecord::new()
            .with("material", "stainless_316")
            .with("thickness", 4.0)
            .with("panel_width", 1200.0)
            .with("span", 800.0)
            .with("open_area", 30.0)
            .with("live_load", 0.5)
            .with("wind_load", 1.5)
            .with("deflection_limit", 120.0)
            .with("exposure", "marine")
    }
}

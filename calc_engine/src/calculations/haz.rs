//! # Heat Affected Zone Analysis
//!
//! Estimates the width and depth of the zone beside a laser cut whose
//! microstructure was altered by conduction, plus the temperature profile
//! across it.
//!
//! ## Model
//!
//! ```text
//! Q      = P × 60 / v                  line energy (J/mm)
//! Q_abs  = Q × absorptivity × gas heat factor
//! t      = beam diameter / (v / 60)    interaction time (s)
//! L      = √(α t)                      diffusion length (mm)
//! width  = L × haz_factor × √(Q_abs / 10)
//! depth  = min(0.8 × width, thickness)
//! ```
//!
//! Pulsed operation (`pulse_frequency > 0`) scales the width by
//! `√(duty_cycle / 100)`. Width never drops below 0.01 mm.
//!
//! The temperature profile starts at the melting point on the kerf wall,
//! crosses the transformation temperature exactly at the HAZ boundary and
//! decays toward ambient: 11 points from 0 to 2 × width.
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::calculations::haz::{calculate, HazInput};
//! use calc_engine::materials::DomainLibrary;
//!
//! let input = HazInput {
//!     material: "steel".to_string(),
//!     thickness_mm: 5.0,
//!     laser_power_w: 3000.0,
//!     cutting_speed_mm_min: 2000.0,
//!     pulse_frequency_hz: 0.0,
//!     duty_cycle_pct: 100.0,
//!     beam_diameter_mm: 0.2,
//!     assist_gas: "nitrogen".to_string(),
//!     ambient_temperature_c: 20.0,
//! };
//!
//! let result = calculate(&input, DomainLibrary::global()).unwrap();
//! assert!((result.heat_input_j_mm - 90.0).abs() < 1e-9);
//! assert!(result.haz_width_mm > 0.0);
//! assert_eq!(result.temperature_profile.len(), 11);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{cut_material_keys, ensure_finite, gas_keys, resolve_key, to_payload};
use crate::compose::Advisory;
use crate::equations::thermal::{
    cooling_rate, decay_length, diffusion_length, exponential_profile, heat_input, interaction_time,
};
use crate::errors::{EngineError, EngineResult};
use crate::fields::{FieldSpec, InputRecord};
use crate::materials::{AssistGas, CutMaterial, DomainLibrary, TableKey};
use crate::registry::Calculator;
use crate::units::{round_to, Celsius, Millimeters, MmPerMin, Watts};
use crate::validation::ValidationIssue;

const CALC: &str = "haz-analysis";

/// Line energy above which the cut is considered thermally aggressive (J/mm)
pub const HIGH_HEAT_INPUT_J_MM: f64 = 1000.0;

/// Reference absorbed line energy of the width correlation (J/mm)
const REFERENCE_ENERGY_J_MM: f64 = 10.0;

/// Depth as a fraction of width
const DEPTH_RATIO: f64 = 0.8;

const MIN_WIDTH_MM: f64 = 0.01;

/// Profile points, from the kerf wall out to twice the HAZ width
const PROFILE_POINTS: usize = 11;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazInput {
    pub material: String,
    pub thickness_mm: f64,
    pub laser_power_w: f64,
    pub cutting_speed_mm_min: f64,
    /// 0 = continuous wave
    pub pulse_frequency_hz: f64,
    pub duty_cycle_pct: f64,
    pub beam_diameter_mm: f64,
    pub assist_gas: String,
    pub ambient_temperature_c: f64,
}

impl HazInput {
    pub fn from_record(record: &InputRecord) -> EngineResult<Self> {
        Ok(HazInput {
            material: record.text("material")?.to_string(),
            thickness_mm: record.number("thickness")?,
            laser_power_w: record.number("laser_power")?,
            cutting_speed_mm_min: record.number("cutting_speed")?,
            pulse_frequency_hz: record.number("pulse_frequency")?,
            duty_cycle_pct: record.number("duty_cycle")?,
            beam_diameter_mm: record.number("beam_diameter")?,
            assist_gas: record.text("assist_gas")?.to_string(),
            ambient_temperature_c: record.number("ambient_temperature")?,
        })
    }

    pub fn is_pulsed(&self) -> bool {
        self.pulse_frequency_hz > 0.0
    }

    fn check(&self) -> EngineResult<()> {
        let positive = [
            ("thickness", self.thickness_mm),
            ("laser_power", self.laser_power_w),
            ("cutting_speed", self.cutting_speed_mm_min),
            ("beam_diameter", self.beam_diameter_mm),
            ("duty_cycle", self.duty_cycle_pct),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(EngineError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazSeverity {
    Minimal,
    Low,
    Moderate,
    Severe,
}

impl HazSeverity {
    pub fn from_width(width_mm: f64) -> Self {
        if width_mm < 0.1 {
            HazSeverity::Minimal
        } else if width_mm < 0.3 {
            HazSeverity::Low
        } else if width_mm < 0.8 {
            HazSeverity::Moderate
        } else {
            HazSeverity::Severe
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub distance_mm: f64,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazResult {
    pub material: String,
    pub material_name: String,
    pub assist_gas: String,
    pub heat_input_j_mm: f64,
    pub absorbed_heat_j_mm: f64,
    pub interaction_time_ms: f64,
    pub diffusion_length_mm: f64,
    pub haz_width_mm: f64,
    pub haz_depth_mm: f64,
    /// Cross-section of the HAZ along one kerf wall
    pub haz_area_mm2: f64,
    pub peak_temperature_c: f64,
    pub cooling_rate_c_per_s: f64,
    pub severity: HazSeverity,
    pub pulsed: bool,
    pub temperature_profile: Vec<ProfilePoint>,
    pub metallurgical_effects: Vec<String>,
    pub warnings: Vec<Advisory>,
    pub recommendations: Vec<Advisory>,
}

pub fn calculate(input: &HazInput, library: &DomainLibrary) -> EngineResult<HazResult> {
    input.check()?;

    let mut warnings = Vec::new();
    let material = resolve_key(&library.cut_materials, "material", &input.material, &mut warnings);
    let gas = resolve_key(&library.gases, "assist_gas", &input.assist_gas, &mut warnings);
    let props = material.record;

    let power = Watts(input.laser_power_w);
    let speed = MmPerMin(input.cutting_speed_mm_min);
    let ambient = Celsius(input.ambient_temperature_c);
    let thickness = Millimeters(input.thickness_mm);

    // === Energy balance ===
    let q = heat_input(power.0, speed.0);
    let q_abs = q * props.absorptivity * gas.record.heat_factor;

    // === Conduction ===
    let t = interaction_time(input.beam_diameter_mm, speed.0);
    let l = diffusion_length(props.thermal_diffusivity_mm2_s, t);

    let mut width = l * props.haz_factor * (q_abs / REFERENCE_ENERGY_J_MM).sqrt();
    if input.is_pulsed() {
        width *= (input.duty_cycle_pct / 100.0).sqrt();
    }
    let width = ensure_finite(CALC, "HAZ width", width)?.max(MIN_WIDTH_MM);
    let depth = (width * DEPTH_RATIO).min(thickness.0);

    // === Temperature field ===
    let peak = Celsius(props.melting_point_c);
    let lambda = decay_length(width, peak.0, props.transformation_temp_c, ambient.0);
    let lambda = ensure_finite(CALC, "decay length", lambda)?;
    let step = 2.0 * width / (PROFILE_POINTS - 1) as f64;
    let temperature_profile: Vec<ProfilePoint> = (0..PROFILE_POINTS)
        .map(|i| {
            let d = i as f64 * step;
            ProfilePoint {
                distance_mm: round_to(d, 4),
                temperature_c: round_to(exponential_profile(d, peak.0, ambient.0, lambda), 1),
            }
        })
        .collect();

    // Heat leaves the zone over its own diffusion time, width²/α
    let cooling_time = width * width / props.thermal_diffusivity_mm2_s;
    let cooling = ensure_finite(CALC, "cooling rate", cooling_rate(peak.0, ambient.0, cooling_time))?;

    let severity = HazSeverity::from_width(width);

    if q > HIGH_HEAT_INPUT_J_MM {
        warnings.push(Advisory::high(
            "HIGH_HEAT_INPUT",
            format!("Line energy of {:.0} J/mm exceeds {:.0} J/mm", q, HIGH_HEAT_INPUT_J_MM),
        ));
    }

    let recommendations = recommend(input, severity, material.key, gas.key, library);

    Ok(HazResult {
        material: material.key.key().to_string(),
        material_name: props.name.to_string(),
        assist_gas: gas.key.key().to_string(),
        heat_input_j_mm: round_to(q, 2),
        absorbed_heat_j_mm: round_to(q_abs, 2),
        interaction_time_ms: round_to(t * 1000.0, 4),
        diffusion_length_mm: round_to(l, 4),
        haz_width_mm: round_to(width, 4),
        haz_depth_mm: round_to(depth, 4),
        haz_area_mm2: round_to(width * depth, 5),
        peak_temperature_c: peak.0,
        cooling_rate_c_per_s: round_to(cooling, 0),
        severity,
        pulsed: input.is_pulsed(),
        temperature_profile,
        metallurgical_effects: props.metallurgical_effects.iter().map(|e| e.to_string()).collect(),
        warnings,
        recommendations,
    })
}

fn recommend(
    input: &HazInput,
    severity: HazSeverity,
    material: CutMaterial,
    gas: AssistGas,
    library: &DomainLibrary,
) -> Vec<Advisory> {
    let mut out = Vec::new();

    match severity {
        HazSeverity::Severe => out.push(Advisory::high(
            "REDUCE_HEAT_INPUT",
            "Increase cutting speed or reduce power to narrow the heat affected zone",
        )),
        HazSeverity::Moderate => out.push(Advisory::medium(
            "REDUCE_HEAT_INPUT",
            "A higher cutting speed would reduce the heat affected zone",
        )),
        HazSeverity::Low | HazSeverity::Minimal => {}
    }

    if !input.is_pulsed() && matches!(severity, HazSeverity::Moderate | HazSeverity::Severe) {
        out.push(Advisory::low(
            "USE_PULSED_MODE",
            "Pulsed operation at reduced duty cycle limits heat build-up on fine contours",
        ));
    }

    if !library.gases.get(gas).is_recommended_for(material) {
        let best = AssistGas::best_for(material);
        out.push(Advisory::medium(
            "SWITCH_GAS",
            format!("{} is a better assist gas for this material", library.gases.get(best).name),
        ));
    }

    out
}

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::enumeration("material", "Material", &cut_material_keys(), "steel").lenient(),
        FieldSpec::number("thickness", "Material thickness", 5.0)
            .range(0.1, 50.0)
            .step(0.1)
            .unit("mm"),
        FieldSpec::number("laser_power", "Laser power", 3000.0)
            .range(100.0, 20000.0)
            .step(50.0)
            .unit("W"),
        FieldSpec::number("cutting_speed", "Cutting speed", 2000.0)
            .range(10.0, 50000.0)
            .step(10.0)
            .unit("mm/min"),
        FieldSpec::number("pulse_frequency", "Pulse frequency", 0.0)
            .range(0.0, 100000.0)
            .unit("Hz")
            .optional(),
        FieldSpec::number("duty_cycle", "Duty cycle", 100.0)
            .range(1.0, 100.0)
            .unit("%")
            .optional(),
        FieldSpec::number("beam_diameter", "Focused beam diameter", 0.2)
            .range(0.05, 2.0)
            .step(0.01)
            .unit("mm")
            .optional(),
        FieldSpec::enumeration("assist_gas", "Assist gas", &gas_keys(), "nitrogen")
            .lenient()
            .optional(),
        FieldSpec::number("ambient_temperature", "Ambient temperature", 20.0)
            .range(-40.0, 100.0)
            .unit("°C")
            .optional(),
    ]
}

/// `haz-analysis` calculator
pub struct HazAnalysis;

impl Calculator for HazAnalysis {
    fn id(&self) -> &'static str {
        CALC
    }

    fn name(&self) -> &'static str {
        "Heat Affected Zone Analysis"
    }

    fn description(&self) -> &'static str {
        "Width, depth and temperature profile of the heat affected zone beside a laser cut"
    }

    fn version(&self) -> &'static str {
        "1.1.0"
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        fields()
    }

    fn cross_validate(&self, input: &InputRecord, library: &DomainLibrary) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if let (Ok(power), Ok(speed)) = (input.number("laser_power"), input.number("cutting_speed")) {
            let q = heat_input(power, speed);
            if q > HIGH_HEAT_INPUT_J_MM {
                issues.push(ValidationIssue::warning(
                    "cutting_speed",
                    "HIGH_HEAT_INPUT",
                    format!("Heat input of {:.0} J/mm is very high; expect a wide heat affected zone", q),
                ));
            }
        }

        if let (Ok(material), Ok(gas)) = (input.text("material"), input.text("assist_gas")) {
            let material = library.cut_materials.resolve(material);
            let gas = library.gases.resolve(gas);
            let rating = gas.record.rating(material.key);
            if !gas.record.is_recommended_for(material.key) {
                issues.push(ValidationIssue::warning(
                    "assist_gas",
                    "SUBOPTIMAL_GAS",
                    format!(
                        "{} is rated {}/5 for {}",
                        gas.record.name, rating, material.record.name
                    ),
                ));
            }
        }

        if let (Ok(frequency), Ok(duty)) = (input.number("pulse_frequency"), input.number("duty_cycle")) {
            if frequency == 0.0 && duty < 100.0 {
                issues.push(ValidationIssue::warning(
                    "duty_cycle",
                    "DUTY_CYCLE_IGNORED",
                    "Duty cycle has no effect in continuous-wave mode (pulse frequency 0)",
                ));
            }
        }

        issues
    }

    fn compute(&self, input: &InputRecord, library: &DomainLibrary) -> EngineResult<Value> {
        let input = HazInput::from_record(input)?;
        to_payload(&calculate(&input, library)?)
    }

    fn example_inputs(&self) -> InputRecord {
        InputRecord::new()
            .with("material", "stainless_steel")
            .with("thickness", 3.0)
            .with("laser_power", 4000.0)
            .with("cutting_speed", 3500.0)
            .with("pulse_frequency", 0.0)
            .with("duty_cycle", 100.0)
            .with("beam_diameter", 0.15)
            .with("assist_gas", "nitrogen")
            .with("ambient_temperature", 22.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel_input() -> HazInput {
        HazInput {
            material: "steel".to_string(),
            thickness_mm: 5.0,
            laser_power_w: 3000.0,
            cutting_speed_mm_min: 2000.0,
            pulse_frequency_hz: 0.0,
            duty_cycle_pct: 100.0,
            beam_diameter_mm: 0.2,
            assist_gas: "nitrogen".to_string(),
            ambient_temperature_c: 20.0,
        }
    }

    fn lib() -> &'static DomainLibrary {
        DomainLibrary::global()
    }

    #[test]
    fn test_steel_scenario() {
        let result = calculate(&steel_input(), lib()).unwrap();

        assert!((result.heat_input_j_mm - 90.0).abs() < 1e-9);
        assert!(result.haz_width_mm > 0.0);
        assert!(result.haz_depth_mm <= 5.0);
        // L = √(13 × 0.006) = 0.2793, × √(36/10) = 0.530
        assert!((result.haz_width_mm - 0.53).abs() < 0.01, "{}", result.haz_width_mm);
        assert_eq!(result.severity, HazSeverity::Moderate);

        let profile = &result.temperature_profile;
        assert_eq!(profile.len(), 11);
        assert_eq!(profile[0].distance_mm, 0.0);
        assert!((profile[0].temperature_c - 1510.0).abs() < 0.1);
        for pair in profile.windows(2) {
            assert!(pair[1].temperature_c < pair[0].temperature_c);
            assert!(pair[1].distance_mm > pair[0].distance_mm);
        }
        // Transformation temperature sits at the HAZ boundary (point 5)
        assert!((profile[5].temperature_c - 723.0).abs() < 1.0);
    }

    #[test]
    fn test_minimal_record_through_registry() {
        let input = InputRecord::new()
            .with("material", "steel")
            .with("thickness", 5.0)
            .with("laser_power", 3000.0)
            .with("cutting_speed", 2000.0)
            .with("pulse_frequency", 0.0);

        let validation = crate::registry::global().validate("haz-analysis", &input).unwrap();
        assert!(validation.is_valid, "{:?}", validation.errors);

        let result = crate::registry::global().calculate("haz-analysis", &input).unwrap();
        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["assist_gas"], "nitrogen");
        assert!(data["haz_width_mm"].as_f64().unwrap() > 0.0);
        assert!(data["haz_depth_mm"].as_f64().unwrap() <= 5.0);

        let profile = data["temperature_profile"].as_array().unwrap();
        assert_eq!(profile.len(), 11);
        assert_eq!(profile[0]["distance_mm"].as_f64().unwrap(), 0.0);
        let temps: Vec<f64> = profile.iter().map(|p| p["temperature_c"].as_f64().unwrap()).collect();
        for pair in temps.windows(2) {
            assert!(pair[1] < pair[0], "{:?}", temps);
        }
    }

    #[test]
    fn test_high_heat_input_reported_once() {
        let input = HazAnalysis
            .default_inputs()
            .with("laser_power", 20000.0)
            .with("cutting_speed", 600.0);
        let result = crate::registry::global().calculate("haz-analysis", &input).unwrap();
        let codes = result.warning_codes();
        assert_eq!(codes.iter().filter(|c| *c == "HIGH_HEAT_INPUT").count(), 1, "{:?}", codes);
    }

    #[test]
    fn test_width_monotone_in_power() {
        let mut previous = 0.0;
        for power in [500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0] {
            let input = HazInput {
                laser_power_w: power,
                ..steel_input()
            };
            let width = calculate(&input, lib()).unwrap().haz_width_mm;
            assert!(width >= previous, "{} W gave {} < {}", power, width, previous);
            previous = width;
        }
    }

    #[test]
    fn test_depth_capped_by_thickness() {
        let input = HazInput {
            thickness_mm: 0.1,
            laser_power_w: 20000.0,
            cutting_speed_mm_min: 100.0,
            ..steel_input()
        };
        let result = calculate(&input, lib()).unwrap();
        assert!(result.haz_depth_mm <= 0.1);
        assert!(result.haz_width_mm > result.haz_depth_mm);
    }

    #[test]
    fn test_pulsing_narrows_zone() {
        let cw = calculate(&steel_input(), lib()).unwrap();
        let pulsed = calculate(
            &HazInput {
                pulse_frequency_hz: 5000.0,
                duty_cycle_pct: 25.0,
                ..steel_input()
            },
            lib(),
        )
        .unwrap();
        assert!(pulsed.pulsed);
        assert!((pulsed.haz_width_mm - cw.haz_width_mm * 0.5).abs() < 0.001);
    }

    #[test]
    fn test_duty_cycle_ignored_without_pulsing() {
        let cw = calculate(&steel_input(), lib()).unwrap();
        let low_duty = calculate(
            &HazInput {
                duty_cycle_pct: 30.0,
                ..steel_input()
            },
            lib(),
        )
        .unwrap();
        assert_eq!(cw.haz_width_mm, low_duty.haz_width_mm);
    }

    #[test]
    fn test_oxygen_widens_zone() {
        let nitrogen = calculate(&steel_input(), lib()).unwrap();
        let oxygen = calculate(
            &HazInput {
                assist_gas: "oxygen".to_string(),
                ..steel_input()
            },
            lib(),
        )
        .unwrap();
        assert!(oxygen.haz_width_mm > nitrogen.haz_width_mm);
    }

    #[test]
    fn test_width_floor() {
        let input = HazInput {
            material: "titanium".to_string(),
            laser_power_w: 100.0,
            cutting_speed_mm_min: 50000.0,
            beam_diameter_mm: 0.05,
            ..steel_input()
        };
        let result = calculate(&input, lib()).unwrap();
        assert_eq!(result.haz_width_mm, MIN_WIDTH_MM);
        assert_eq!(result.severity, HazSeverity::Minimal);
    }

    #[test]
    fn test_unknown_material_uses_default() {
        let input = HazInput {
            material: "mithril".to_string(),
            ..steel_input()
        };
        let result = calculate(&input, lib()).unwrap();
        assert_eq!(result.material, CutMaterial::Aluminum6061.key());
        assert!(result.warnings.iter().any(|w| w.code == "DEFAULT_RECORD_USED"));
    }

    #[test]
    fn test_high_heat_input_warning() {
        let input = HazInput {
            laser_power_w: 20000.0,
            cutting_speed_mm_min: 600.0,
            ..steel_input()
        };
        let result = calculate(&input, lib()).unwrap();
        assert!(result.warnings.iter().any(|w| w.code == "HIGH_HEAT_INPUT"));
    }

    #[test]
    fn test_cross_validation() {
        let calc = HazAnalysis;
        let record = calc
            .default_inputs()
            .with("material", "aluminum_6061")
            .with("assist_gas", "oxygen")
            .with("laser_power", 20000.0)
            .with("cutting_speed", 100.0)
            .with("duty_cycle", 50.0);
        let codes: Vec<String> = calc.cross_validate(&record, lib()).into_iter().map(|i| i.code).collect();
        assert!(codes.contains(&"HIGH_HEAT_INPUT".to_string()));
        assert!(codes.contains(&"SUBOPTIMAL_GAS".to_string()));
        assert!(codes.contains(&"DUTY_CYCLE_IGNORED".to_string()));
    }

    #[test]
    fn test_switch_gas_recommended() {
        let input = HazInput {
            material: "aluminum_6061".to_string(),
            assist_gas: "oxygen".to_string(),
            ..steel_input()
        };
        let result = calculate(&input, lib()).unwrap();
        assert!(result.recommendations.iter().any(|r| r.code == "SWITCH_GAS"));
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        let input = HazInput {
            cutting_speed_mm_min: 0.0,
            ..steel_input()
        };
        assert!(calculate(&input, lib()).is_err());
    }
}

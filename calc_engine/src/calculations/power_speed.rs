//! # Power/Speed Matching
//!
//! Recommends laser power and cutting speed for a material and thickness,
//! biased toward the operator's priority.
//!
//! ## Baseline
//!
//! ```text
//! P = 300 W/mm × t × difficulty × laser power factor × quality power factor
//! v = 12000 / t^1.2 / difficulty × laser speed factor × quality speed factor
//! ```
//!
//! ## Priority multipliers
//!
//! | priority | power | speed | quality points |
//! | --- | --- | --- | --- |
//! | speed | 1.15 | 1.30 | −15 |
//! | quality | 0.95 | 0.75 | +15 |
//! | efficiency | 0.85 | 0.95 | 0 |
//! | balanced | 1.00 | 1.00 | +5 |
//!
//! Power never exceeds `max_power`. When it is clamped, speed falls by the
//! same ratio and quality takes a penalty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{cut_material_keys, ensure_finite, gas_keys, laser_keys, resolve_key, to_payload};
use crate::compose::Advisory;
use crate::equations::heat_input;
use crate::errors::{EngineError, EngineResult};
use crate::fields::{FieldSpec, InputRecord};
use crate::materials::{
    AssistGas, DomainLibrary, GasProperties, LaserProperties, TableKey, ThermalProperties,
};
use crate::registry::Calculator;
use crate::scoring::{CandidateOption, Scorer};
use crate::units::round_to;
use crate::validation::ValidationIssue;

const CALC: &str = "power-speed-matching";

/// Baseline power per mm of mild steel (W/mm)
pub const POWER_PER_MM: f64 = 300.0;

/// Baseline speed numerator (mm/min at 1 mm)
pub const SPEED_CONSTANT: f64 = 12000.0;

const THICKNESS_EXPONENT: f64 = 1.2;

/// Edge quality points per gas rating step away from neutral (3)
const GAS_RATING_POINTS: f64 = 3.0;

/// Quality points lost at a 100% power shortfall
const CLAMP_PENALTY_POINTS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Speed,
    Quality,
    Efficiency,
    Balanced,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Speed, Priority::Quality, Priority::Efficiency, Priority::Balanced];

    pub fn key(&self) -> &'static str {
        match self {
            Priority::Speed => "speed",
            Priority::Quality => "quality",
            Priority::Efficiency => "efficiency",
            Priority::Balanced => "balanced",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.key() == key)
    }

    pub fn keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.key()).collect()
    }

    /// (power ×, speed ×, quality points)
    pub fn multipliers(&self) -> (f64, f64, f64) {
        match self {
            Priority::Speed => (1.15, 1.30, -15.0),
            Priority::Quality => (0.95, 0.75, 15.0),
            Priority::Efficiency => (0.85, 0.95, 0.0),
            Priority::Balanced => (1.0, 1.0, 5.0),
        }
    }

    /// Ranking weights (speed, quality, efficiency); each sums to 100
    fn weights(&self) -> (f64, f64, f64) {
        match self {
            Priority::Speed => (60.0, 20.0, 20.0),
            Priority::Quality => (20.0, 60.0, 20.0),
            Priority::Efficiency => (20.0, 20.0, 60.0),
            Priority::Balanced => (34.0, 33.0, 33.0),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Priority::Speed => "Maximum throughput",
            Priority::Quality => "Best edge quality",
            Priority::Efficiency => "Lowest energy",
            Priority::Balanced => "Balanced",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Standard,
    High,
    Precision,
}

impl QualityLevel {
    pub const KEYS: [&'static str; 3] = ["standard", "high", "precision"];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "standard" => Some(QualityLevel::Standard),
            "high" => Some(QualityLevel::High),
            "precision" => Some(QualityLevel::Precision),
            _ => None,
        }
    }

    /// (power ×, speed ×, quality points)
    pub fn factors(&self) -> (f64, f64, f64) {
        match self {
            QualityLevel::Standard => (1.0, 1.0, 0.0),
            QualityLevel::High => (1.1, 0.85, 5.0),
            QualityLevel::Precision => (1.2, 0.7, 10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpeedInput {
    pub material: String,
    pub thickness_mm: f64,
    pub laser_source: String,
    pub max_power_w: f64,
    pub priority: Priority,
    pub quality_level: QualityLevel,
    pub assist_gas: String,
}

impl PowerSpeedInput {
    pub fn from_record(record: &InputRecord) -> EngineResult<Self> {
        let priority_key = record.text("priority_goal")?;
        let priority = Priority::from_key(priority_key)
            .ok_or_else(|| EngineError::invalid_input("priority_goal", priority_key, "Unknown priority"))?;
        let level_key = record.text("quality_level")?;
        let quality_level = QualityLevel::from_key(level_key)
            .ok_or_else(|| EngineError::invalid_input("quality_level", level_key, "Unknown quality level"))?;
        Ok(PowerSpeedInput {
            material: record.text("material")?.to_string(),
            thickness_mm: record.number("thickness")?,
            laser_source: record.text("laser_source")?.to_string(),
            max_power_w: record.number("max_power")?,
            priority,
            quality_level,
            assist_gas: record.text("assist_gas")?.to_string(),
        })
    }
}

/// One power/speed operating point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessSetting {
    pub priority: Priority,
    pub power_w: f64,
    /// Power the cut would take without the source limit
    pub required_power_w: f64,
    pub speed_mm_min: f64,
    pub heat_input_j_mm: f64,
    pub predicted_quality: f64,
    pub power_limited: bool,
}

impl ProcessSetting {
    fn rounded(&self) -> Self {
        ProcessSetting {
            power_w: round_to(self.power_w, 0),
            required_power_w: round_to(self.required_power_w, 0),
            speed_mm_min: round_to(self.speed_mm_min, 0),
            heat_input_j_mm: round_to(self.heat_input_j_mm, 2),
            predicted_quality: round_to(self.predicted_quality, 1),
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpeedResult {
    pub material: String,
    pub material_name: String,
    pub laser_source: String,
    pub laser_name: String,
    pub assist_gas: String,
    pub quality_level: QualityLevel,
    pub recommended: ProcessSetting,
    /// Power as a share of the machine's maximum (%)
    pub power_utilization_pct: f64,
    /// Every priority, ranked with the selected priority's weights
    pub alternatives: Vec<CandidateOption>,
    pub warnings: Vec<Advisory>,
    pub recommendations: Vec<Advisory>,
}

struct Context<'a> {
    thickness_mm: f64,
    max_power_w: f64,
    quality_level: QualityLevel,
    material: &'a ThermalProperties,
    laser: &'a LaserProperties,
    gas_rating: u8,
}

impl Context<'_> {
    fn setting(&self, priority: Priority) -> ProcessSetting {
        let (level_power, level_speed, level_quality) = self.quality_level.factors();
        let (p_mult, v_mult, q_points) = priority.multipliers();

        let base_power = POWER_PER_MM
            * self.thickness_mm
            * self.material.cut_difficulty
            * self.laser.power_factor
            * level_power;
        let base_speed = SPEED_CONSTANT / self.thickness_mm.powf(THICKNESS_EXPONENT) / self.material.cut_difficulty
            * self.laser.speed_factor
            * level_speed;

        let wanted_power = base_power * p_mult;
        let mut speed = base_speed * v_mult;
        let (power, power_limited) = if wanted_power > self.max_power_w {
            (self.max_power_w, true)
        } else {
            (wanted_power, false)
        };
        let ratio = power / wanted_power;
        speed *= ratio;

        let gas_bonus = (self.gas_rating as f64 - 3.0) * GAS_RATING_POINTS;
        let clamp_penalty = CLAMP_PENALTY_POINTS * (1.0 - ratio);
        let quality = (self.material.base_edge_quality
            + gas_bonus
            + q_points
            + level_quality
            + self.laser.quality_offset
            - clamp_penalty)
            .clamp(0.0, 100.0);

        ProcessSetting {
            priority,
            power_w: power,
            required_power_w: wanted_power,
            speed_mm_min: speed,
            heat_input_j_mm: heat_input(power, speed),
            predicted_quality: quality,
            power_limited,
        }
    }
}

pub fn calculate(input: &PowerSpeedInput, library: &DomainLibrary) -> EngineResult<PowerSpeedResult> {
    for (field, value) in [("thickness", input.thickness_mm), ("max_power", input.max_power_w)] {
        if value.is_nan() || value <= 0.0 {
            return Err(EngineError::invalid_input(field, value.to_string(), "Must be positive"));
        }
    }

    let mut warnings = Vec::new();
    let material = resolve_key(&library.cut_materials, "material", &input.material, &mut warnings);
    let laser = resolve_key(&library.lasers, "laser_source", &input.laser_source, &mut warnings);
    let gas = resolve_key(&library.gases, "assist_gas", &input.assist_gas, &mut warnings);
    let gas_props: &GasProperties = gas.record;

    let context = Context {
        thickness_mm: input.thickness_mm,
        max_power_w: input.max_power_w,
        quality_level: input.quality_level,
        material: material.record,
        laser: laser.record,
        gas_rating: gas_props.rating(material.key),
    };

    let settings: Vec<ProcessSetting> = Priority::ALL.iter().map(|p| context.setting(*p)).collect();
    let recommended = context.setting(input.priority);
    ensure_finite(CALC, "speed", recommended.speed_mm_min)?;
    ensure_finite(CALC, "heat_input", recommended.heat_input_j_mm)?;

    // Normalize against the best of the four settings
    let fastest = settings.iter().map(|s| s.speed_mm_min).fold(0.0, f64::max);
    let best_quality = settings.iter().map(|s| s.predicted_quality).fold(0.0, f64::max);
    let leanest = settings
        .iter()
        .map(|s| s.heat_input_j_mm)
        .fold(f64::INFINITY, f64::min);
    let (w_speed, w_quality, w_efficiency) = input.priority.weights();

    let ranking = Scorer::new(|s: &ProcessSetting| s.priority.key().to_string())
        .criterion("speed", w_speed, move |s| w_speed * s.speed_mm_min / fastest)
        .criterion("quality", w_quality, move |s| {
            if best_quality > 0.0 {
                w_quality * s.predicted_quality / best_quality
            } else {
                0.0
            }
        })
        .criterion("efficiency", w_efficiency, move |s| w_efficiency * leanest / s.heat_input_j_mm)
        .tie_break(|s| s.power_w)
        .score_and_rank(settings);

    let alternatives = ranking
        .ranked
        .iter()
        .map(|entry| {
            let s = entry.candidate.rounded();
            let option = CandidateOption::new(s.priority.key(), s.priority.label(), round_to(entry.total_score, 1))
                .with_property("power_w", s.power_w)
                .with_property("speed_mm_min", s.speed_mm_min)
                .with_property("heat_input_j_mm", s.heat_input_j_mm)
                .with_property("predicted_quality", s.predicted_quality);
            match s.priority {
                Priority::Speed => option
                    .with_pros(&["Highest throughput"])
                    .with_cons(&["Rougher edge", "More dross"]),
                Priority::Quality => option
                    .with_pros(&["Smoothest edge", "Narrow heat affected zone"])
                    .with_cons(&["Slowest cutting"]),
                Priority::Efficiency => option
                    .with_pros(&["Lowest power draw"])
                    .with_cons(&["Less margin on thickness variation"]),
                Priority::Balanced => option.with_pros(&["Robust general-purpose setting"]),
            }
        })
        .collect();

    if recommended.power_limited {
        warnings.push(Advisory::high(
            "POWER_LIMITED",
            format!(
                "Required power exceeds the {:.0} W source; speed reduced to {:.0} mm/min",
                input.max_power_w, recommended.speed_mm_min
            ),
        ));
    }
    if material.record.highly_reflective {
        if laser.record.handles_reflective {
            warnings.push(Advisory::low(
                "REFLECTIVE_MATERIAL",
                format!("{} is highly reflective; enable back-reflection protection", material.record.name),
            ));
        } else {
            warnings.push(Advisory::high(
                "REFLECTIVE_MATERIAL",
                format!(
                    "{} reflects most of the {} beam; risk of optics damage",
                    material.record.name, laser.record.name
                ),
            ));
        }
    }
    if !gas_props.is_recommended_for(material.key) {
        warnings.push(Advisory::medium(
            "SUBOPTIMAL_GAS",
            format!(
                "{} is rated {}/5 for {}",
                gas_props.name,
                gas_props.rating(material.key),
                material.record.name
            ),
        ));
    }

    let mut recommendations = Vec::new();
    let best_gas = AssistGas::best_for(material.key);
    if best_gas != gas.key {
        recommendations.push(Advisory::medium(
            "SWITCH_GAS",
            format!("{} gives the best edge on {}", best_gas.properties().name, material.record.name),
        ));
    }
    if recommended.power_limited {
        recommendations.push(Advisory::medium(
            "CONSIDER_HIGHER_POWER",
            format!(
                "A source of at least {:.0} W would run this cut unrestricted",
                recommended.required_power_w
            ),
        ));
    }
    if input.priority == Priority::Speed && recommended.predicted_quality < 60.0 {
        recommendations.push(Advisory::low(
            "CHECK_EDGE_QUALITY",
            "Speed priority leaves a rough edge; switch to balanced if parts need finishing",
        ));
    }

    Ok(PowerSpeedResult {
        material: material.key.key().to_string(),
        material_name: material.record.name.to_string(),
        laser_source: laser.key.key().to_string(),
        laser_name: laser.record.name.to_string(),
        assist_gas: gas.key.key().to_string(),
        quality_level: input.quality_level,
        recommended: recommended.rounded(),
        power_utilization_pct: round_to(recommended.power_w / input.max_power_w * 100.0, 1),
        alternatives,
        warnings,
        recommendations,
    })
}

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::enumeration("material", "Material", &cut_material_keys(), "steel").lenient(),
        FieldSpec::number("thickness", "Thickness", 5.0)
            .range(0.5, 30.0)
            .step(0.5)
            .unit("mm"),
        FieldSpec::enumeration("laser_source", "Laser source", &laser_keys(), "fiber").lenient(),
        FieldSpec::number("max_power", "Maximum laser power", 6000.0)
            .range(500.0, 20000.0)
            .step(100.0)
            .unit("W"),
        FieldSpec::enumeration("priority_goal", "Priority", &Priority::keys(), "balanced"),
        FieldSpec::enumeration("quality_level", "Quality level", &QualityLevel::KEYS, "standard").optional(),
        FieldSpec::enumeration("assist_gas", "Assist gas", &gas_keys(), "nitrogen").lenient(),
    ]
}

/// `power-speed-matching` calculator
pub struct PowerSpeedMatching;

impl Calculator for PowerSpeedMatching {
    fn id(&self) -> &'static str {
        CALC
    }

    fn name(&self) -> &'static str {
        "Power/Speed Matching"
    }

    fn description(&self) -> &'static str {
        "Recommended laser power and cutting speed for a material, thickness and priority"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        fields()
    }

    fn cross_validate(&self, input: &InputRecord, library: &DomainLibrary) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let (Ok(material), Ok(laser)) = (input.text("material"), input.text("laser_source")) {
            let material = library.cut_materials.resolve(material).record;
            let laser = library.lasers.resolve(laser).record;
            if material.highly_reflective && !laser.handles_reflective {
                issues.push(ValidationIssue::warning(
                    "laser_source",
                    "REFLECTIVE_MATERIAL",
                    format!("{} is a poor match for {}", laser.name, material.name),
                ));
            }
        }
        issues
    }

    fn compute(&self, input: &InputRecord, library: &DomainLibrary) -> EngineResult<Value> {
        let input = PowerSpeedInput::from_record(input)?;
        to_payload(&calculate(&input, library)?)
    }

    fn example_inputs(&self) -> InputRecord {
        InputRecord::new()
            .with("material", "stainless_steel")
            .with("thickness", 8.0)
            .with("laser_source", "fiber")
            .with("max_power", 4000.0)
            .with("priority_goal", "quality")
            .with("quality_level", "high")
            .with("assist_gas", "nitrogen")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::CutMaterial;

    fn base(priority: Priority) -> PowerSpeedInput {
        PowerSpeedInput {
            material: "steel".to_string(),
            thickness_mm: 5.0,
            laser_source: "fiber".to_string(),
            max_power_w: 6000.0,
            priority,
            quality_level: QualityLevel::Standard,
            assist_gas: "oxygen".to_string(),
        }
    }

    fn run(input: &PowerSpeedInput) -> PowerSpeedResult {
        calculate(input, DomainLibrary::global()).unwrap()
    }

    #[test]
    fn test_balanced_baseline() {
        let result = run(&base(Priority::Balanced));
        // 300 × 5 × 1.0 × 1.0
        assert_eq!(result.recommended.power_w, 1500.0);
        let speed = 12000.0 / 5.0_f64.powf(1.2);
        assert!((result.recommended.speed_mm_min - speed.round()).abs() < 1e-9);
        assert!(!result.recommended.power_limited);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_speed_priority_is_faster_than_quality() {
        let fast = run(&base(Priority::Speed));
        let fine = run(&base(Priority::Quality));
        assert!(fast.recommended.speed_mm_min > fine.recommended.speed_mm_min);
        assert!(fine.recommended.predicted_quality > fast.recommended.predicted_quality);
    }

    #[test]
    fn test_priority_effect_survives_clamping() {
        let mut fast = base(Priority::Speed);
        fast.thickness_mm = 20.0;
        fast.max_power_w = 2000.0;
        let mut fine = fast.clone();
        fine.priority = Priority::Quality;

        let fast = run(&fast);
        let fine = run(&fine);
        assert!(fast.recommended.power_limited);
        assert!(fast.recommended.speed_mm_min > fine.recommended.speed_mm_min);
        assert!(fine.recommended.predicted_quality > fast.recommended.predicted_quality);
    }

    #[test]
    fn test_power_clamp_scales_speed() {
        let mut input = base(Priority::Balanced);
        input.max_power_w = 750.0;
        let result = run(&input);
        assert_eq!(result.recommended.power_w, 750.0);
        let unclamped = 12000.0 / 5.0_f64.powf(1.2);
        assert!((result.recommended.speed_mm_min - (unclamped * 0.5).round()).abs() < 1e-9);
        assert!(result.warnings.iter().any(|w| w.code == "POWER_LIMITED"));
        assert_eq!(result.power_utilization_pct, 100.0);
    }

    #[test]
    fn test_quality_is_bounded() {
        for priority in Priority::ALL {
            for material in CutMaterial::ALL {
                let mut input = base(priority);
                input.material = material.key().to_string();
                input.quality_level = QualityLevel::Precision;
                let q = run(&input).recommended.predicted_quality;
                assert!((0.0..=100.0).contains(&q));
            }
        }
    }

    #[test]
    fn test_alternatives_rank_every_priority() {
        let result = run(&base(Priority::Speed));
        assert_eq!(result.alternatives.len(), 4);
        assert_eq!(result.alternatives[0].key, "speed");
        for pair in result.alternatives.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }

        let mut keys: Vec<&str> = result.alternatives.iter().map(|a| a.key.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["balanced", "efficiency", "quality", "speed"]);
    }

    #[test]
    fn test_reflective_material_on_co2() {
        let mut input = base(Priority::Balanced);
        input.material = "copper".to_string();
        input.laser_source = "co2".to_string();
        input.assist_gas = "nitrogen".to_string();
        let result = run(&input);
        let warning = result.warnings.iter().find(|w| w.code == "REFLECTIVE_MATERIAL").unwrap();
        assert_eq!(warning.priority, crate::compose::Priority::High);
    }

    #[test]
    fn test_reflective_warning_reported_once() {
        let input = PowerSpeedMatching
            .default_inputs()
            .with("material", "copper")
            .with("laser_source", "co2");
        let result = crate::registry::global().calculate("power-speed-matching", &input).unwrap();
        let codes = result.warning_codes();
        assert_eq!(codes.iter().filter(|c| *c == "REFLECTIVE_MATERIAL").count(), 1, "{:?}", codes);
    }

    #[test]
    fn test_co2_needs_more_power() {
        let fiber = run(&base(Priority::Balanced));
        let mut co2 = base(Priority::Balanced);
        co2.laser_source = "co2".to_string();
        let co2 = run(&co2);
        assert!(co2.recommended.power_w > fiber.recommended.power_w);
        assert!(co2.recommended.speed_mm_min < fiber.recommended.speed_mm_min);
    }

    #[test]
    fn test_unknown_laser_falls_back() {
        let mut input = base(Priority::Balanced);
        input.laser_source = "plasma".to_string();
        let result = run(&input);
        assert_eq!(result.laser_source, "fiber");
        assert!(result.warnings.iter().any(|w| w.code == "DEFAULT_RECORD_USED"));
    }
}

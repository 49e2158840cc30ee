//! # Predictive Cut Quality
//!
//! Estimates edge quality, roughness, dross and kerf from how far the process
//! parameters sit from the material's optimum.
//!
//! The "models" are deterministic heuristics, one formula per [`ModelKind`].
//! They are not trained on data; every result says so (`model.heuristic`).
//!
//! ## Features
//!
//! | feature | value | optimum |
//! | --- | --- | --- |
//! | energy density | `P × 60 / v / t` (J/mm²) | material table |
//! | focus position | mm from surface | `gas focus ratio × t` |
//! | gas pressure | bar | gas table |
//!
//! Each feature enters the models as a relative deviation `|x − opt| / scale`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{cut_material_keys, ensure_finite, gas_keys, resolve_key, to_payload};
use crate::compose::{Advisory, ConfidenceBand};
use crate::equations::heat_input;
use crate::errors::{EngineError, EngineResult};
use crate::fields::{FieldSpec, InputRecord};
use crate::materials::{CutMaterial, DomainLibrary, TableKey};
use crate::registry::Calculator;
use crate::units::round_to;
use crate::validation::ValidationIssue;

const CALC: &str = "quality-prediction";

/// Confidence never drops below this share of model accuracy
const MIN_COVERAGE: f64 = 0.5;

/// Deviation beyond which a parameter suggestion is emitted
const SUGGESTION_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    NeuralNetwork,
    RandomForest,
    Svm,
    Ensemble,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::NeuralNetwork,
        ModelKind::RandomForest,
        ModelKind::Svm,
        ModelKind::Ensemble,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ModelKind::NeuralNetwork => "neural_network",
            ModelKind::RandomForest => "random_forest",
            ModelKind::Svm => "svm",
            ModelKind::Ensemble => "ensemble",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.key() == key)
    }

    pub fn keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.key()).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::NeuralNetwork => "Neural network (smooth response)",
            ModelKind::RandomForest => "Random forest (banded response)",
            ModelKind::Svm => "Support vector (linear response)",
            ModelKind::Ensemble => "Ensemble (mean of all three)",
        }
    }

    /// Nominal accuracy reported for the model
    pub fn accuracy(&self) -> f64 {
        match self {
            ModelKind::NeuralNetwork => 0.94,
            ModelKind::RandomForest => 0.91,
            ModelKind::Svm => 0.88,
            ModelKind::Ensemble => 0.96,
        }
    }

    /// Quality points lost for a set of feature deviations
    pub fn penalty(&self, d: &Deviations) -> f64 {
        match self {
            ModelKind::NeuralNetwork => {
                let activation = 1.2 * d.energy.powi(2) + 2.0 * d.focus.powi(2) + 0.8 * d.pressure.powi(2);
                100.0 * (1.0 - (-activation).exp())
            }
            ModelKind::RandomForest => {
                band(d.energy, &[(0.1, 0.0), (0.3, 8.0), (0.6, 18.0)], 30.0)
                    + band(d.focus, &[(0.05, 0.0), (0.15, 5.0), (0.3, 12.0)], 20.0)
                    + band(d.pressure, &[(0.1, 0.0), (0.3, 4.0)], 10.0)
            }
            ModelKind::Svm => 40.0 * d.energy + 60.0 * d.focus + 15.0 * d.pressure,
            ModelKind::Ensemble => {
                let members = [ModelKind::NeuralNetwork, ModelKind::RandomForest, ModelKind::Svm];
                members.iter().map(|m| m.penalty(d)).sum::<f64>() / members.len() as f64
            }
        }
    }
}

/// Step lookup: the penalty of the first band whose upper bound exceeds `x`
fn band(x: f64, bands: &[(f64, f64)], beyond: f64) -> f64 {
    bands
        .iter()
        .find(|(upper, _)| x < *upper)
        .map(|(_, penalty)| *penalty)
        .unwrap_or(beyond)
}

/// Relative distance of each feature from its optimum (0 = on target)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Deviations {
    pub energy: f64,
    pub focus: f64,
    pub pressure: f64,
}

impl Deviations {
    fn total(&self) -> f64 {
        self.energy + self.focus + self.pressure
    }

    fn only_energy(&self) -> Self {
        Deviations { energy: self.energy, ..Default::default() }
    }

    fn only_focus(&self) -> Self {
        Deviations { focus: self.focus, ..Default::default() }
    }

    fn only_pressure(&self) -> Self {
        Deviations { pressure: self.pressure, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityInput {
    pub material: String,
    pub thickness_mm: f64,
    pub laser_power_w: f64,
    pub cutting_speed_mm_min: f64,
    pub assist_gas: String,
    pub gas_pressure_bar: f64,
    /// Negative values focus below the surface
    pub focus_position_mm: f64,
    pub model: ModelKind,
}

impl QualityInput {
    pub fn from_record(record: &InputRecord) -> EngineResult<Self> {
        let model_key = record.text("model_type")?;
        let model = ModelKind::from_key(model_key)
            .ok_or_else(|| EngineError::invalid_input("model_type", model_key, "Unknown model type"))?;
        Ok(QualityInput {
            material: record.text("material")?.to_string(),
            thickness_mm: record.number("thickness")?,
            laser_power_w: record.number("laser_power")?,
            cutting_speed_mm_min: record.number("cutting_speed")?,
            assist_gas: record.text("assist_gas")?.to_string(),
            gas_pressure_bar: record.number("gas_pressure")?,
            focus_position_mm: record.number("focus_position")?,
            model,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl QualityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            QualityGrade::Excellent
        } else if score >= 70.0 {
            QualityGrade::Good
        } else if score >= 55.0 {
            QualityGrade::Acceptable
        } else {
            QualityGrade::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrossRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub kind: ModelKind,
    pub name: String,
    pub accuracy: f64,
    pub heuristic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub value: f64,
    pub optimum: f64,
    pub deviation: f64,
    /// Quality points this feature alone costs (≤ 0)
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityResult {
    pub material: String,
    pub material_name: String,
    pub assist_gas: String,
    pub model: ModelInfo,
    pub quality_score: f64,
    pub grade: QualityGrade,
    pub surface_roughness_ra_um: f64,
    pub dross_risk: DrossRisk,
    pub kerf_width_mm: f64,
    pub energy_density_j_mm2: f64,
    pub prediction_confidence: f64,
    pub confidence: ConfidenceBand,
    pub feature_contributions: Vec<FeatureContribution>,
    pub warnings: Vec<Advisory>,
    pub recommendations: Vec<Advisory>,
}

pub fn calculate(input: &QualityInput, library: &DomainLibrary) -> EngineResult<QualityResult> {
    for (field, value) in [
        ("thickness", input.thickness_mm),
        ("laser_power", input.laser_power_w),
        ("cutting_speed", input.cutting_speed_mm_min),
        ("gas_pressure", input.gas_pressure_bar),
    ] {
        if value.is_nan() || value <= 0.0 {
            return Err(EngineError::invalid_input(field, value.to_string(), "Must be positive"));
        }
    }

    let mut warnings = Vec::new();
    let material = resolve_key(&library.cut_materials, "material", &input.material, &mut warnings);
    let gas = resolve_key(&library.gases, "assist_gas", &input.assist_gas, &mut warnings);
    let props = material.record;
    let t = input.thickness_mm;

    // === Features ===
    let line_energy = heat_input(input.laser_power_w, input.cutting_speed_mm_min);
    let energy_density = ensure_finite(CALC, "energy_density", line_energy / t)?;
    let optimal_energy = props.optimal_energy_density;
    let optimal_focus = gas.record.focus_ratio * t;
    let optimal_pressure = gas.record.typical_pressure_bar;

    let deviations = Deviations {
        energy: (energy_density - optimal_energy).abs() / optimal_energy,
        focus: (input.focus_position_mm - optimal_focus).abs() / t.max(1.0),
        pressure: (input.gas_pressure_bar - optimal_pressure).abs() / optimal_pressure,
    };

    // === Prediction ===
    let gas_bonus = (gas.record.rating(material.key) as f64 - 3.0) * 3.0;
    let ceiling = (props.base_edge_quality + gas_bonus).clamp(0.0, 100.0);
    let predict = |d: &Deviations| (ceiling - input.model.penalty(d)).clamp(0.0, 100.0);
    let quality = predict(&deviations);

    let impact = |d: Deviations| predict(&d) - ceiling;
    let feature_contributions = vec![
        FeatureContribution {
            feature: "energy_density".to_string(),
            value: round_to(energy_density, 2),
            optimum: optimal_energy,
            deviation: round_to(deviations.energy, 3),
            impact: round_to(impact(deviations.only_energy()), 1),
        },
        FeatureContribution {
            feature: "focus_position".to_string(),
            value: input.focus_position_mm,
            optimum: round_to(optimal_focus, 2),
            deviation: round_to(deviations.focus, 3),
            impact: round_to(impact(deviations.only_focus()), 1),
        },
        FeatureContribution {
            feature: "gas_pressure".to_string(),
            value: input.gas_pressure_bar,
            optimum: optimal_pressure,
            deviation: round_to(deviations.pressure, 3),
            impact: round_to(impact(deviations.only_pressure()), 1),
        },
    ];

    // Roughness grows with thickness and with lost quality
    let roughness = (1.6 + 0.25 * t) * (1.0 + (100.0 - quality) / 25.0);

    // Under-powered cuts and low pressure leave dross
    let underpowered = ((optimal_energy - energy_density) / optimal_energy).max(0.0);
    let low_pressure = ((optimal_pressure - input.gas_pressure_bar) / optimal_pressure).max(0.0);
    let oxidizing_on_stainless = gas.record.heat_factor > 1.0 && material.key == CutMaterial::StainlessSteel;
    let dross_index = 0.5 * underpowered
        + 0.3 * low_pressure
        + 0.2 * deviations.focus
        + if oxidizing_on_stainless { 0.2 } else { 0.0 };
    let dross_risk = if dross_index < 0.1 {
        DrossRisk::Low
    } else if dross_index < 0.3 {
        DrossRisk::Medium
    } else {
        DrossRisk::High
    };

    // Kerf widens with thickness, excess energy and defocus
    let overpowered = ((energy_density - optimal_energy) / optimal_energy).max(0.0);
    let kerf = 0.1 + 0.02 * t + 0.05 * overpowered + 0.03 * (input.focus_position_mm - optimal_focus).abs();

    let coverage = (1.0 - 0.5 * deviations.total()).max(MIN_COVERAGE);
    let confidence = input.model.accuracy() * coverage;
    let band = ConfidenceBand::from_confidence(confidence);

    // === Advisories ===
    if band == ConfidenceBand::Low {
        warnings.push(Advisory::medium(
            "LOW_CONFIDENCE",
            "Parameters are far from the calibrated range; treat the prediction as indicative",
        ));
    }
    if !gas.record.is_recommended_for(material.key) {
        warnings.push(Advisory::medium(
            "SUBOPTIMAL_GAS",
            format!("{} is a poor match for {}", gas.record.name, props.name),
        ));
    }

    let mut recommendations = Vec::new();
    if deviations.energy > SUGGESTION_THRESHOLD {
        let target_speed = input.laser_power_w * 60.0 / (optimal_energy * t);
        recommendations.push(Advisory::high(
            "ADJUST_SPEED",
            format!(
                "At {:.0} W, a cutting speed near {:.0} mm/min hits the optimal energy density",
                input.laser_power_w, target_speed
            ),
        ));
    }
    if deviations.focus > SUGGESTION_THRESHOLD {
        recommendations.push(Advisory::medium(
            "ADJUST_FOCUS",
            format!("Set focus to about {:.1} mm", optimal_focus),
        ));
    }
    if deviations.pressure > SUGGESTION_THRESHOLD {
        recommendations.push(Advisory::medium(
            "ADJUST_PRESSURE",
            format!("Run {} at about {:.0} bar", gas.record.name, optimal_pressure),
        ));
    }

    Ok(QualityResult {
        material: material.key.key().to_string(),
        material_name: props.name.to_string(),
        assist_gas: gas.key.key().to_string(),
        model: ModelInfo {
            kind: input.model,
            name: input.model.name().to_string(),
            accuracy: input.model.accuracy(),
            heuristic: true,
        },
        quality_score: round_to(quality, 1),
        grade: QualityGrade::from_score(quality),
        surface_roughness_ra_um: round_to(roughness, 2),
        dross_risk,
        kerf_width_mm: round_to(kerf, 3),
        energy_density_j_mm2: round_to(energy_density, 2),
        prediction_confidence: round_to(confidence, 3),
        confidence: band,
        feature_contributions,
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
        FieldSpec::number("laser_power", "Laser power", 3000.0)
            .range(100.0, 20000.0)
            .step(100.0)
            .unit("W"),
        FieldSpec::number("cutting_speed", "Cutting speed", 2000.0)
            .range(10.0, 50000.0)
            .step(10.0)
            .unit("mm/min"),
        FieldSpec::enumeration("assist_gas", "Assist gas", &gas_keys(), "nitrogen").lenient(),
        FieldSpec::number("gas_pressure", "Gas pressure", 15.0)
            .range(0.5, 25.0)
            .step(0.5)
            .unit("bar"),
        FieldSpec::number("focus_position", "Focus position", -1.5)
            .range(-10.0, 10.0)
            .step(0.1)
            .unit("mm"),
        FieldSpec::enumeration("model_type", "Model", &ModelKind::keys(), "ensemble").optional(),
    ]
}

/// `quality-prediction` calculator
pub struct QualityPrediction;

impl Calculator for QualityPrediction {
    fn id(&self) -> &'static str {
        CALC
    }

    fn name(&self) -> &'static str {
        "Cut Quality Prediction"
    }

    fn description(&self) -> &'static str {
        "Heuristic edge quality, roughness, dross and kerf prediction from process parameters"
    }

    fn version(&self) -> &'static str {
        "0.9.0"
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        fields()
    }

    fn cross_validate(&self, input: &InputRecord, library: &DomainLibrary) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let (Ok(focus), Ok(thickness)) = (input.number("focus_position"), input.number("thickness")) {
            if focus.abs() > thickness {
                issues.push(ValidationIssue::warning(
                    "focus_position",
                    "FOCUS_OUTSIDE_SHEET",
                    "Focus lies further from the surface than the sheet is thick",
                ));
            }
        }
        if let (Ok(gas), Ok(pressure)) = (input.text("assist_gas"), input.number("gas_pressure")) {
            let gas = library.gases.resolve(gas).record;
            if pressure > 2.0 * gas.typical_pressure_bar {
                issues.push(ValidationIssue::warning(
                    "gas_pressure",
                    "HIGH_GAS_PRESSURE",
                    format!("{:.0} bar is more than twice the usual pressure for {}", pressure, gas.name),
                ));
            }
        }
        issues
    }

    fn compute(&self, input: &InputRecord, library: &DomainLibrary) -> EngineResult<Value> {
        let input = QualityInput::from_record(input)?;
        to_payload(&calculate(&input, library)?)
    }

    fn example_inputs(&self) -> InputRecord {
        InputRecord::new()
            .with("material", "aluminum_5052")
            .with("thickness", 4.0)
            .with("laser_power", 4000.0)
            .with("cutting_speed", 2500.0)
            .with("assist_gas", "nitrogen")
            .with("gas_pressure", 14.0)
            .with("focus_position", -1.0)
            .with("model_type", "random_forest")
    }
}

//! # Material Selection
//!
//! Ranks structural sheet materials for an application against strength,
//! corrosion and budget requirements.
//!
//! ## Scoring
//!
//! | criterion | cap | score |
//! | --- | --- | --- |
//! | strength fit | 30 | 30 when Fy meets the requirement, else pro rata |
//! | corrosion fit | 25 | 25 when the rating meets the requirement, else pro rata |
//! | application | 25 | 25 when the material lists the application |
//! | cost efficiency | 20 | `min(20, 20 / cost)` |
//!
//! Budget and (optionally) weldability are hard constraints applied before
//! scoring. Ties rank the cheaper material first.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::to_payload;
use crate::compose::Advisory;
use crate::errors::{EngineError, EngineResult};
use crate::fields::{FieldSpec, InputRecord};
use crate::materials::{Application, DomainLibrary, MechanicalProperties, StructuralMaterial, TableKey};
use crate::registry::Calculator;
use crate::scoring::{CandidateOption, Excluded, Scorer};
use crate::units::round_to;
use crate::validation::ValidationIssue;

const CALC: &str = "material-selection";

const STRENGTH_CAP: f64 = 30.0;
const CORROSION_CAP: f64 = 25.0;
const APPLICATION_CAP: f64 = 25.0;
const COST_CAP: f64 = 20.0;

/// Minimum weldability rating when welding is required
pub const MIN_WELDABILITY: u8 = 3;

/// Top candidate cost at or under this share of budget is a comfortable fit
const COMFORTABLE_BUDGET_SHARE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthRequirement {
    Low,
    Medium,
    High,
    UltraHigh,
}

impl StrengthRequirement {
    pub const KEYS: [&'static str; 4] = ["low", "medium", "high", "ultra_high"];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "low" => Some(StrengthRequirement::Low),
            "medium" => Some(StrengthRequirement::Medium),
            "high" => Some(StrengthRequirement::High),
            "ultra_high" => Some(StrengthRequirement::UltraHigh),
            _ => None,
        }
    }

    /// Minimum yield strength (MPa)
    pub fn min_yield_mpa(&self) -> f64 {
        match self {
            StrengthRequirement::Low => 100.0,
            StrengthRequirement::Medium => 250.0,
            StrengthRequirement::High => 400.0,
            StrengthRequirement::UltraHigh => 800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrosionRequirement {
    None,
    Mild,
    Moderate,
    High,
    Extreme,
}

impl CorrosionRequirement {
    pub const KEYS: [&'static str; 5] = ["none", "mild", "moderate", "high", "extreme"];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "none" => Some(CorrosionRequirement::None),
            "mild" => Some(CorrosionRequirement::Mild),
            "moderate" => Some(CorrosionRequirement::Moderate),
            "high" => Some(CorrosionRequirement::High),
            "extreme" => Some(CorrosionRequirement::Extreme),
            _ => None,
        }
    }

    /// Minimum corrosion rating (1-5)
    pub fn min_rating(&self) -> u8 {
        *self as u8 + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionInput {
    pub application: Application,
    pub strength: StrengthRequirement,
    pub corrosion: CorrosionRequirement,
    /// USD/kg
    pub budget: f64,
    pub require_weldability: bool,
    pub max_results: usize,
}

impl SelectionInput {
    pub fn from_record(record: &InputRecord) -> EngineResult<Self> {
        let application_key = record.text("application")?;
        let application = Application::from_key(application_key)
            .ok_or_else(|| EngineError::invalid_input("application", application_key, "Unknown application"))?;
        let strength_key = record.text("strength_requirement")?;
        let strength = StrengthRequirement::from_key(strength_key).ok_or_else(|| {
            EngineError::invalid_input("strength_requirement", strength_key, "Unknown strength class")
        })?;
        let corrosion_key = record.text("corrosion_resistance")?;
        let corrosion = CorrosionRequirement::from_key(corrosion_key).ok_or_else(|| {
            EngineError::invalid_input("corrosion_resistance", corrosion_key, "Unknown corrosion class")
        })?;
        let max_results = record.number("max_results")?;
        Ok(SelectionInput {
            application,
            strength,
            corrosion,
            budget: record.number("budget")?,
            require_weldability: record.flag("require_weldability")?,
            max_results: max_results.max(1.0).round() as usize,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetFit {
    WithinBudget,
    NearBudget,
    OverBudget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub budget_usd_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_cost_usd_kg: Option<f64>,
    /// Cheapest material in the library, admissible or not
    pub cheapest_available_usd_kg: f64,
    pub budget_fit: BudgetFit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    pub application: Application,
    pub min_yield_mpa: f64,
    pub min_corrosion_rating: u8,
    pub min_weldability: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub requirements: Requirements,
    /// Ranked best first, at most `max_results`
    pub recommended_materials: Vec<CandidateOption>,
    pub excluded: Vec<Excluded>,
    pub cost_analysis: CostAnalysis,
    pub warnings: Vec<Advisory>,
    pub recommendations: Vec<Advisory>,
}

impl SelectionResult {
    pub fn top(&self) -> Option<&CandidateOption> {
        self.recommended_materials.first()
    }
}

type Candidate<'a> = (StructuralMaterial, &'a MechanicalProperties);

pub fn calculate(input: &SelectionInput, library: &DomainLibrary) -> EngineResult<SelectionResult> {
    if input.budget.is_nan() || input.budget <= 0.0 {
        return Err(EngineError::invalid_input(
            "budget",
            input.budget.to_string(),
            "Budget must be positive",
        ));
    }

    let min_yield = input.strength.min_yield_mpa();
    let min_rating = input.corrosion.min_rating();
    let application = input.application;
    let budget = input.budget;
    let require_weld = input.require_weldability;

    let candidates: Vec<Candidate> = library
        .structural_materials
        .iter()
        .map(|(key, props)| (*key, props))
        .collect();

    let cheapest = candidates
        .iter()
        .map(|(_, p)| p.cost_per_kg)
        .fold(f64::INFINITY, f64::min);

    let ranking = Scorer::<Candidate>::new(|c| c.0.key().to_string())
        .constraint("within_budget", move |c| c.1.cost_per_kg <= budget)
        .constraint("weldable", move |c| !require_weld || c.1.weldability >= MIN_WELDABILITY)
        .criterion("strength_fit", STRENGTH_CAP, move |c| {
            STRENGTH_CAP * (c.1.yield_strength_mpa / min_yield).min(1.0)
        })
        .criterion("corrosion_fit", CORROSION_CAP, move |c| {
            CORROSION_CAP * (c.1.corrosion_rating as f64 / min_rating as f64).min(1.0)
        })
        .criterion("application", APPLICATION_CAP, move |c| {
            if c.1.suits(application) {
                APPLICATION_CAP
            } else {
                0.0
            }
        })
        .criterion("cost_efficiency", COST_CAP, |c| (COST_CAP / c.1.cost_per_kg).min(COST_CAP))
        .tie_break(|c| c.1.cost_per_kg)
        .score_and_rank(candidates);

    let recommended_materials: Vec<CandidateOption> = ranking
        .ranked
        .iter()
        .take(input.max_results)
        .map(|entry| {
            let (key, props) = entry.candidate;
            let mut option = CandidateOption::new(key.key(), props.name, round_to(entry.total_score, 1))
                .with_property("yield_strength_mpa", props.yield_strength_mpa)
                .with_property("tensile_strength_mpa", props.tensile_strength_mpa)
                .with_property("elastic_modulus_gpa", props.elastic_modulus_gpa)
                .with_property("density_kg_m3", props.density_kg_m3)
                .with_property("cost_per_kg", props.cost_per_kg)
                .with_property("corrosion_rating", props.corrosion_rating as f64)
                .with_property("weldability", props.weldability as f64)
                .with_pros(props.pros)
                .with_cons(props.cons);
            for sub in &entry.breakdown {
                option = option.with_property(format!("score_{}", sub.criterion), round_to(sub.score, 2));
            }
            option
        })
        .collect();

    let top = ranking.top().map(|entry| entry.candidate.1);
    let budget_fit = match top {
        None => BudgetFit::OverBudget,
        Some(p) if p.cost_per_kg <= COMFORTABLE_BUDGET_SHARE * budget => BudgetFit::WithinBudget,
        Some(_) => BudgetFit::NearBudget,
    };

    let mut warnings = Vec::new();
    let mut recommendations = Vec::new();
    match top {
        None => {
            warnings.push(Advisory::high(
                "NO_MATERIALS_FOUND",
                format!("No material satisfies a budget of ${:.2}/kg with the given constraints", budget),
            ));
            recommendations.push(Advisory::high(
                "INCREASE_BUDGET",
                format!("The cheapest material in the library costs ${:.2}/kg", cheapest),
            ));
        }
        Some(p) => {
            if p.yield_strength_mpa < min_yield {
                warnings.push(Advisory::medium(
                    "STRENGTH_SHORTFALL",
                    format!(
                        "{} yields at {:.0} MPa, below the {:.0} MPa requirement",
                        p.name, p.yield_strength_mpa, min_yield
                    ),
                ));
            }
            if p.corrosion_rating < min_rating {
                warnings.push(Advisory::medium(
                    "CORROSION_SHORTFALL",
                    format!("{} needs a protective coating for this environment", p.name),
                ));
            }
            if !p.suits(application) {
                recommendations.push(Advisory::low(
                    "VERIFY_APPLICATION",
                    format!("{} is not commonly used for {} work", p.name, application.key()),
                ));
            }
        }
    }
    if require_weld && ranking.excluded.iter().any(|e| e.constraint == "weldable") {
        recommendations.push(Advisory::low(
            "CONSIDER_MECHANICAL_FASTENING",
            "Some materials were excluded for poor weldability; bolted or riveted joints would admit them",
        ));
    }

    Ok(SelectionResult {
        requirements: Requirements {
            application,
            min_yield_mpa: min_yield,
            min_corrosion_rating: min_rating,
            min_weldability: require_weld.then_some(MIN_WELDABILITY),
        },
        recommended_materials,
        excluded: ranking.excluded.clone(),
        cost_analysis: CostAnalysis {
            budget_usd_kg: budget,
            top_cost_usd_kg: top.map(|p| p.cost_per_kg),
            cheapest_available_usd_kg: cheapest,
            budget_fit,
        },
        warnings,
        recommendations,
    })
}

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::enumeration("application", "Application", &Application::keys(), "structural"),
        FieldSpec::enumeration(
            "strength_requirement",
            "Strength requirement",
            &StrengthRequirement::KEYS,
            "medium",
        ),
        FieldSpec::enumeration(
            "corrosion_resistance",
            "Corrosion resistance",
            &CorrosionRequirement::KEYS,
            "mild",
        ),
        FieldSpec::number("budget", "Budget", 10.0)
            .range(0.1, 500.0)
            .step(0.1)
            .unit("USD/kg"),
        FieldSpec::boolean("require_weldability", "Must be weldable", false).optional(),
        FieldSpec::number("max_results", "Maximum results", 5.0)
            .range(1.0, 11.0)
            .step(1.0)
            .optional(),
    ]
}

/// `material-selection` calculator
pub struct MaterialSelection;

impl Calculator for MaterialSelection {
    fn id(&self) -> &'static str {
        CALC
    }

    fn name(&self) -> &'static str {
        "Material Selection"
    }

    fn description(&self) -> &'static str {
        "Ranks structural materials by strength, corrosion resistance, application fit and cost"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        fields()
    }

    fn cross_validate(&self, input: &InputRecord, _library: &DomainLibrary) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let ultra = input.text("strength_requirement").map(|s| s == "ultra_high").unwrap_or(false);
        if let Ok(budget) = input.number("budget") {
            if ultra && budget < 20.0 {
                issues.push(ValidationIssue::warning(
                    "budget",
                    "BUDGET_LIKELY_INSUFFICIENT",
                    "Ultra-high strength alloys rarely cost under $20/kg",
                ));
            }
        }
        issues
    }

    fn compute(&self, input: &InputRecord, library: &DomainLibrary) -> EngineResult<Value> {
        let input = SelectionInput::from_record(input)?;
        to_payload(&calculate(&input, library)?)
    }

    fn example_inputs(&self) -> InputRecord {
        InputRecord::new()
            .with("application", "marine")
            .with("strength_requirement", "medium")
            .with("corrosion_resistance", "high")
            .with("budget", 15.0)
            .with("require_weldability", true)
            .with("max_results", 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(application: Application, strength: StrengthRequirement, corrosion: CorrosionRequirement, budget: f64) -> SelectionInput {
        SelectionInput {
            application,
            strength,
            corrosion,
            budget,
            require_weldability: false,
            max_results: 11,
        }
    }

    fn lib() -> &'static DomainLibrary {
        DomainLibrary::global()
    }

    #[test]
    fn test_structural_medium_picks_low_cost_steel() {
        let result = calculate(
            &input(Application::Structural, StrengthRequirement::Medium, CorrosionRequirement::Mild, 10.0),
            lib(),
        )
        .unwrap();
        let top = result.top().unwrap();
        assert_eq!(top.key, "hsla_steel");
        assert!(top.properties["cost_per_kg"] <= 10.0);
        assert_eq!(result.cost_analysis.budget_fit, BudgetFit::WithinBudget);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_budget_filters_every_candidate() {
        let result = calculate(
            &input(Application::Structural, StrengthRequirement::Medium, CorrosionRequirement::Mild, 10.0),
            lib(),
        )
        .unwrap();
        for option in &result.recommended_materials {
            assert!(option.properties["cost_per_kg"] <= 10.0);
        }
        let excluded: Vec<&str> = result.excluded.iter().map(|e| e.id.as_str()).collect();
        assert!(excluded.contains(&"titanium"));
        assert!(excluded.contains(&"inconel_625"));
        assert!(result.excluded.iter().all(|e| e.constraint == "within_budget"));
    }

    #[test]
    fn test_impossible_budget_is_empty_not_error() {
        let result = calculate(
            &input(Application::Aerospace, StrengthRequirement::UltraHigh, CorrosionRequirement::Extreme, 1.0),
            lib(),
        )
        .unwrap();
        assert!(result.recommended_materials.is_empty());
        assert_eq!(result.cost_analysis.budget_fit, BudgetFit::OverBudget);
        assert!(result.warnings.iter().any(|w| w.code == "NO_MATERIALS_FOUND"));
        assert_eq!(result.excluded.len(), 11);
    }

    fn run_record(application: &str, strength: &str, corrosion: &str, budget: f64) -> Value {
        let input = InputRecord::new()
            .with("application", application)
            .with("strength_requirement", strength)
            .with("corrosion_resistance", corrosion)
            .with("budget", budget);
        let result = crate::registry::global().calculate("material-selection", &input).unwrap();
        assert!(result.success);
        result.data.unwrap()
    }

    #[test]
    fn test_payload_through_registry() {
        let data = run_record("structural", "medium", "mild", 10.0);
        let ranked = data["recommended_materials"].as_array().unwrap();
        assert!(!ranked.is_empty());
        assert!(data.get("materials").is_none());
        assert_eq!(ranked[0]["key"], "hsla_steel");
        assert!(ranked[0]["properties"]["cost_per_kg"].as_f64().unwrap() <= 10.0);
        assert_eq!(data["cost_analysis"]["budget_fit"], "within_budget");

        let data = run_record("aerospace", "ultra_high", "extreme", 1.0);
        assert_eq!(data["recommended_materials"], serde_json::json!([]));
        assert_eq!(data["cost_analysis"]["budget_fit"], "over_budget");
        let codes: Vec<&str> = data["warnings"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|w| w["code"].as_str())
            .collect();
        assert!(codes.contains(&"NO_MATERIALS_FOUND"));
    }

    #[test]
    fn test_scores_within_bounds_and_sorted() {
        let result = calculate(
            &input(Application::Marine, StrengthRequirement::High, CorrosionRequirement::High, 500.0),
            lib(),
        )
        .unwrap();
        assert_eq!(result.recommended_materials.len(), 11);
        for pair in result.recommended_materials.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!(result.recommended_materials.iter().all(|m| (0.0..=100.0).contains(&m.score)));
    }

    #[test]
    fn test_weldability_constraint() {
        let mut request = input(Application::Aerospace, StrengthRequirement::High, CorrosionRequirement::Mild, 100.0);
        request.require_weldability = true;
        let result = calculate(&request, lib()).unwrap();
        assert!(!result.recommended_materials.iter().any(|m| m.key == "aluminum_7075"));
        assert!(result
            .excluded
            .iter()
            .any(|e| e.id == "aluminum_7075" && e.constraint == "weldable"));
        assert!(result.recommendations.iter().any(|r| r.code == "CONSIDER_MECHANICAL_FASTENING"));
    }

    #[test]
    fn test_max_results_truncates() {
        let mut request = input(Application::Structural, StrengthRequirement::Low, CorrosionRequirement::None, 500.0);
        request.max_results = 2;
        let result = calculate(&request, lib()).unwrap();
        assert_eq!(result.recommended_materials.len(), 2);
    }

    #[test]
    fn test_near_budget() {
        // HSLA at $2.00 against a $2.20 budget
        let result = calculate(
            &input(Application::Structural, StrengthRequirement::Medium, CorrosionRequirement::Mild, 2.2),
            lib(),
        )
        .unwrap();
        assert_eq!(result.top().unwrap().key, "hsla_steel");
        assert_eq!(result.cost_analysis.budget_fit, BudgetFit::NearBudget);
    }

    #[test]
    fn test_corrosion_levels() {
        assert_eq!(CorrosionRequirement::None.min_rating(), 1);
        assert_eq!(CorrosionRequirement::Extreme.min_rating(), 5);
    }

    #[test]
    fn test_from_record_defaults() {
        let record = MaterialSelection.default_inputs();
        let parsed = SelectionInput::from_record(&record).unwrap();
        assert_eq!(parsed.application, Application::Structural);
        assert_eq!(parsed.max_results, 5);
        assert!(!parsed.require_weldability);
    }
}

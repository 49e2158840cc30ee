//! # Calculator Registry
//!
//! The single integration point for hosts. A [`Calculator`] is a capability
//! set (schema, cross-field rules, algorithm, samples) registered under a
//! stable id; the [`Registry`] routes every request to it.
//!
//! ## Request Flow
//!
//! ```text
//! calculate(id, input)
//!   ├── get(id)                   → CalculatorNotFound
//!   ├── validate(id, input)       → ValidationFailed (algorithm not run)
//!   ├── compute(input, library)   → Err / panic → success: false
//!   └── compose(...)              → CalculationResult
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::registry;
//!
//! let registry = registry::global();
//! let input = registry.example_inputs("haz-analysis").unwrap();
//! let result = registry.calculate("haz-analysis", &input).unwrap();
//! assert!(result.success);
//! ```

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::calculations;
use crate::compose::{compose, CalculationResult, Invocation};
use crate::errors::{EngineError, EngineResult};
use crate::fields::{FieldSpec, InputRecord};
use crate::materials::DomainLibrary;
use crate::settings::EngineSettings;
use crate::validation::{validate_fields, ValidationIssue, ValidationResult};

/// A registered calculator.
///
/// Implementations are stateless; the same instance serves concurrent
/// requests.
pub trait Calculator: Send + Sync {
    /// Stable kebab-case id (e.g. "haz-analysis")
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Bumped whenever the algorithm changes
    fn version(&self) -> &'static str;

    /// Ordered input schema
    fn field_specs(&self) -> Vec<FieldSpec>;

    /// Calculator-specific rules, run after structural validation passed.
    /// Whatever severity is returned, findings are recorded as warnings.
    fn cross_validate(&self, _input: &InputRecord, _library: &DomainLibrary) -> Vec<ValidationIssue> {
        Vec::new()
    }

    /// Run the algorithm on a validated, default-filled input
    fn compute(&self, input: &InputRecord, library: &DomainLibrary) -> EngineResult<Value>;

    /// A realistic, always-valid sample
    fn example_inputs(&self) -> InputRecord {
        self.default_inputs()
    }

    /// Every field at its declared default
    fn default_inputs(&self) -> InputRecord {
        InputRecord::from_defaults(&self.field_specs())
    }
}

/// Listing entry for a registered calculator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

/// Outcome of [`Registry::self_check`] for one calculator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfCheckReport {
    pub calculator_id: String,
    pub example_valid: bool,
    pub defaults_valid: bool,
    pub example_succeeded: bool,
    /// An invalid input was rejected before compute
    pub rejects_invalid: bool,
    pub problems: Vec<String>,
}

impl SelfCheckReport {
    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}

pub struct Registry {
    calculators: BTreeMap<&'static str, Box<dyn Calculator>>,
    library: &'static DomainLibrary,
    settings: EngineSettings,
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::with_builtin);

/// Process-wide registry with every built-in calculator
pub fn global() -> &'static Registry {
    &GLOBAL
}

impl Registry {
    /// Empty registry with default settings
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Registry {
            calculators: BTreeMap::new(),
            library: DomainLibrary::global(),
            settings,
        }
    }

    /// Registry holding every built-in calculator
    pub fn with_builtin() -> Self {
        Self::builtin_with_settings(EngineSettings::default())
    }

    pub fn builtin_with_settings(settings: EngineSettings) -> Self {
        let mut registry = Self::with_settings(settings);
        for calculator in calculations::builtin() {
            // Built-in ids are distinct; a clash would be a programming error
            if let Err(err) = registry.register(calculator) {
                warn!(error = %err, "skipping built-in calculator");
            }
        }
        registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn register(&mut self, calculator: Box<dyn Calculator>) -> EngineResult<()> {
        let id = calculator.id();
        if self.calculators.contains_key(id) {
            return Err(EngineError::DuplicateCalculator { id: id.to_string() });
        }
        info!(calculator = id, version = calculator.version(), "registered calculator");
        self.calculators.insert(id, calculator);
        Ok(())
    }

    pub fn get(&self, id: &str) -> EngineResult<&dyn Calculator> {
        self.calculators
            .get(id)
            .map(|c| c.as_ref())
            .ok_or_else(|| EngineError::calculator_not_found(id))
    }

    /// All calculators, ordered by id
    pub fn list(&self) -> Vec<CalculatorInfo> {
        self.calculators
            .values()
            .map(|c| CalculatorInfo {
                id: c.id(),
                name: c.name(),
                description: c.description(),
                version: c.version(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }

    /// Structural then cross-field validation
    pub fn validate(&self, id: &str, input: &InputRecord) -> EngineResult<ValidationResult> {
        let calculator = self.get(id)?;
        Ok(self.validate_with(calculator, input))
    }

    fn validate_with(&self, calculator: &dyn Calculator, input: &InputRecord) -> ValidationResult {
        let specs = calculator.field_specs();
        let mut result = validate_fields(&specs, input);
        if result.is_valid {
            let filled = input.retain_declared(&specs).with_defaults(&specs);
            result.add_cross_field(calculator.cross_validate(&filled, self.library));
        }
        debug!(
            calculator = calculator.id(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated input"
        );
        result
    }

    /// Validate, compute and compose.
    ///
    /// Invalid input returns [`EngineError::ValidationFailed`]; the algorithm
    /// is not run. Compute failures are reported inside the result.
    pub fn calculate(&self, id: &str, input: &InputRecord) -> EngineResult<CalculationResult> {
        let calculator = self.get(id)?;
        let validation = self.validate_with(calculator, input);
        if !validation.is_valid {
            return Err(EngineError::ValidationFailed {
                calculator_id: id.to_string(),
                issues: validation.errors,
            });
        }

        // Undeclared keys were reported as UNKNOWN_FIELD; they reach neither
        // the algorithm nor the fingerprint
        let specs = calculator.field_specs();
        let filled = input.retain_declared(&specs).with_defaults(&specs);
        let started = Instant::now();
        let outcome = self.run_compute(calculator, &filled);
        let elapsed = started.elapsed();

        let elapsed_ms = elapsed.as_millis() as u64;
        if elapsed_ms > self.settings.slow_compute_ms {
            warn!(calculator = id, elapsed_ms, "slow computation");
        }
        if let Err(err) = &outcome {
            warn!(calculator = id, error = %err, "computation failed");
        }

        Ok(compose(
            Invocation {
                calculator_id: calculator.id(),
                calculator_version: calculator.version(),
                input: &filled,
                elapsed,
            },
            outcome,
            &validation.warnings,
            &self.settings,
        ))
    }

    fn run_compute(&self, calculator: &dyn Calculator, input: &InputRecord) -> EngineResult<Value> {
        debug!(calculator = calculator.id(), "computing");
        if !self.settings.catch_panics {
            return calculator.compute(input, self.library);
        }
        match catch_unwind(AssertUnwindSafe(|| calculator.compute(input, self.library))) {
            Ok(outcome) => outcome,
            Err(_) => Err(EngineError::Internal {
                message: format!("calculator '{}' failed unexpectedly", calculator.id()),
            }),
        }
    }

    pub fn example_inputs(&self, id: &str) -> EngineResult<InputRecord> {
        Ok(self.get(id)?.example_inputs())
    }

    pub fn default_inputs(&self, id: &str) -> EngineResult<InputRecord> {
        Ok(self.get(id)?.default_inputs())
    }

    /// Exercise every calculator: samples validate, the example computes,
    /// and an input missing every field is refused before compute.
    pub fn self_check(&self) -> Vec<SelfCheckReport> {
        self.calculators
            .values()
            .map(|calculator| self.check_one(calculator.as_ref()))
            .collect()
    }

    fn check_one(&self, calculator: &dyn Calculator) -> SelfCheckReport {
        let id = calculator.id();
        let mut problems = Vec::new();

        let example_valid = self.validate_with(calculator, &calculator.example_inputs()).is_valid;
        if !example_valid {
            problems.push("example inputs fail validation".to_string());
        }
        let defaults_valid = self.validate_with(calculator, &calculator.default_inputs()).is_valid;
        if !defaults_valid {
            problems.push("default inputs fail validation".to_string());
        }

        let example_succeeded = match self.calculate(id, &calculator.example_inputs()) {
            Ok(result) if result.success => true,
            Ok(result) => {
                problems.push(format!("example computation failed: {:?}", result.errors));
                false
            }
            Err(err) => {
                problems.push(format!("example computation rejected: {}", err));
                false
            }
        };

        let has_required = calculator.field_specs().iter().any(|s| s.required);
        let rejects_invalid = !has_required
            || matches!(
                self.calculate(id, &InputRecord::new()),
                Err(EngineError::ValidationFailed { .. })
            );
        if !rejects_invalid {
            problems.push("empty input was not rejected".to_string());
        }

        SelfCheckReport {
            calculator_id: id.to_string(),
            example_valid,
            defaults_valid,
            example_succeeded,
            rejects_invalid,
            problems,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Severity;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Doubler {
        calls: Arc<AtomicUsize>,
    }

    impl Calculator for Doubler {
        fn id(&self) -> &'static str {
            "doubler"
        }
        fn name(&self) -> &'static str {
            "Doubler"
        }
        fn description(&self) -> &'static str {
            "Doubles a number"
        }
        fn version(&self) -> &'static str {
            "1.0.0"
        }
        fn field_specs(&self) -> Vec<FieldSpec> {
            vec![FieldSpec::number("x", "X", 2.0).range(0.0, 10.0)]
        }
        fn cross_validate(&self, input: &InputRecord, _library: &DomainLibrary) -> Vec<ValidationIssue> {
            match input.number("x") {
                Ok(x) if x > 8.0 => vec![ValidationIssue::error("x", "LARGE_X", "x is large")],
                _ => Vec::new(),
            }
        }
        fn compute(&self, input: &InputRecord, _library: &DomainLibrary) -> EngineResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let x = input.number("x")?;
            if x == 0.0 {
                return Err(EngineError::calculation_failed("doubler", "zero"));
            }
            if x == 7.0 {
                panic!("unlucky");
            }
            Ok(json!({ "value": x * 2.0 }))
        }
    }

    fn registry_with_counter() -> (Registry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut r = Registry::new();
        r.register(Box::new(Doubler { calls: Arc::clone(&calls) })).unwrap();
        (r, calls)
    }

    fn registry() -> Registry {
        registry_with_counter().0
    }

    #[test]
    fn test_duplicate_registration() {
        let mut r = registry();
        let err = r
            .register(Box::new(Doubler { calls: Arc::new(AtomicUsize::new(0)) }))
            .unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_CALCULATOR");
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_unknown_id() {
        let r = registry();
        assert!(matches!(r.get("nope"), Err(EngineError::CalculatorNotFound { .. })));
        assert!(matches!(
            r.calculate("nope", &InputRecord::new()),
            Err(EngineError::CalculatorNotFound { .. })
        ));
        assert!(r.validate("nope", &InputRecord::new()).is_err());
        assert!(r.example_inputs("nope").is_err());
    }

    #[test]
    fn test_invalid_input_never_computes() {
        let (r, calls) = registry_with_counter();
        let invalid = InputRecord::new().with("x", 50.0);
        match r.calculate("doubler", &invalid).unwrap_err() {
            EngineError::ValidationFailed { issues, .. } => assert_eq!(issues[0].code, "OUT_OF_RANGE"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        r.calculate("doubler", &InputRecord::new().with("x", 3.0)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cross_field_is_warning_only() {
        let r = registry();
        let v = r.validate("doubler", &InputRecord::new().with("x", 9.0)).unwrap();
        assert!(v.is_valid);
        assert_eq!(v.warnings[0].severity, Severity::Warning);

        let result = r.calculate("doubler", &InputRecord::new().with("x", 9.0)).unwrap();
        assert!(result.success);
        assert!(result.has_warning("LARGE_X"));
    }

    #[test]
    fn test_compute_error_becomes_failed_result() {
        let r = registry();
        let result = r.calculate("doubler", &InputRecord::new().with("x", 0.0)).unwrap();
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.errors.unwrap()[0], "Calculation failed: doubler - zero");
    }

    #[test]
    fn test_panic_is_contained() {
        let r = registry();
        let result = r.calculate("doubler", &InputRecord::new().with("x", 7.0)).unwrap();
        assert!(!result.success);
        let message = &result.errors.unwrap()[0];
        assert!(message.contains("failed unexpectedly"));
        assert!(!message.contains("unlucky"));
    }

    #[test]
    fn test_optional_defaults_and_fingerprint() {
        let r = registry();
        let result = r.calculate("doubler", &InputRecord::new().with("x", 3.0)).unwrap();
        assert_eq!(result.data.unwrap()["value"], json!(6.0));
        assert_eq!(
            result.metadata.input_fingerprint,
            InputRecord::new().with("x", 3.0).fingerprint(16)
        );
    }

    #[test]
    fn test_undeclared_keys_do_not_change_fingerprint() {
        let r = registry();
        let plain = r.calculate("doubler", &InputRecord::new().with("x", 3.0)).unwrap();
        let noisy = r
            .calculate("doubler", &InputRecord::new().with("x", 3.0).with("junk", 1.0))
            .unwrap();
        assert!(noisy.has_warning("UNKNOWN_FIELD"));
        assert_eq!(plain.metadata.input_fingerprint, noisy.metadata.input_fingerprint);
        assert_eq!(plain.data.unwrap()["value"], noisy.data.unwrap()["value"]);
    }

    #[test]
    fn test_default_inputs_from_specs() {
        let r = registry();
        let defaults = r.default_inputs("doubler").unwrap();
        assert_eq!(defaults.number("x").unwrap(), 2.0);
    }

    #[test]
    fn test_self_check_passes_for_test_calculator() {
        let reports = registry().self_check();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].passed(), "{:?}", reports[0].problems);
    }

    #[test]
    fn test_builtin_registry() {
        let r = global();
        let ids: Vec<&str> = r.list().iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec![
                "architectural-panel",
                "cutting-cost",
                "haz-analysis",
                "material-selection",
                "power-speed-matching",
                "quality-prediction",
            ]
        );
    }

    #[test]
    fn test_builtin_self_check() {
        for report in global().self_check() {
            assert!(report.passed(), "{}: {:?}", report.calculator_id, report.problems);
        }
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Registry>();
    }

    #[test]
    fn test_concurrent_calculations_agree() {
        let r = global();
        let ids = ["haz-analysis", "power-speed-matching", "cutting-cost"];

        let expected: Vec<Value> = ids
            .iter()
            .map(|id| {
                let input = r.example_inputs(id).unwrap();
                r.calculate(id, &input).unwrap().data.unwrap()
            })
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|worker| {
                    let id = ids[worker % ids.len()];
                    scope.spawn(move || {
                        let input = r.example_inputs(id).unwrap();
                        (worker % ids.len(), r.calculate(id, &input).unwrap())
                    })
                })
                .collect();

            for handle in handles {
                let (slot, result) = handle.join().unwrap();
                assert!(result.success);
                assert_eq!(result.data.unwrap(), expected[slot]);
            }
        });
    }
}

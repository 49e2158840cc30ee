//! # Input Validation
//!
//! Two passes run over every input record:
//!
//! 1. **Structural**: each [`FieldSpec`] is checked for presence, JSON type,
//!    numeric bounds and option membership. Violations are errors.
//! 2. **Cross-field**: calculator-specific rules (heat input thresholds, gas
//!    compatibility, ...). These only ever add warnings, since the
//!    computation stays well-defined.
//!
//! Validation never fails: it always returns a [`ValidationResult`] with one
//! issue per violated constraint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::{FieldKind, FieldSpec, InputRecord};

/// Issue severity. Errors block computation; warnings are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// One violated constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field id the issue refers to
    pub field: String,
    pub message: String,
    /// Machine-readable code (e.g. "OUT_OF_RANGE", "HIGH_HEAT_INPUT")
    pub code: String,
    pub severity: Severity,
}

impl ValidationIssue {
    pub fn error(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of `validate()`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues.into_iter().partition(|i| i.is_error());
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Append cross-field findings. Whatever severity they carry, they are
    /// recorded as warnings.
    pub fn add_cross_field(&mut self, issues: Vec<ValidationIssue>) {
        self.warnings.extend(issues.into_iter().map(|mut issue| {
            issue.severity = Severity::Warning;
            issue
        }));
    }

    /// Look up a warning by code
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Look up an error by code
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// Structural validation of `input` against `specs`.
///
/// # Example
///
/// ```rust
/// use calc_engine::fields::{FieldSpec, InputRecord};
/// use calc_engine::validation::validate_fields;
///
/// let specs = vec![FieldSpec::number("thickness", "Thickness", 5.0).range(0.1, 50.0)];
///
/// let result = validate_fields(&specs, &InputRecord::new().with("thickness", 80.0));
/// assert!(!result.is_valid);
/// assert!(result.has_error("OUT_OF_RANGE"));
/// ```
pub fn validate_fields(specs: &[FieldSpec], input: &InputRecord) -> ValidationResult {
    let mut issues = Vec::new();

    for spec in specs {
        match input.get(spec.id) {
            None if spec.required => issues.push(ValidationIssue::error(
                spec.id,
                "MISSING_FIELD",
                format!("{} is required", spec.label),
            )),
            None => {}
            Some(value) => check_value(spec, value, &mut issues),
        }
    }

    for key in input.keys() {
        if !specs.iter().any(|s| s.id == key) {
            issues.push(ValidationIssue::warning(
                key,
                "UNKNOWN_FIELD",
                format!("'{}' is not an input of this calculator and was ignored", key),
            ));
        }
    }

    ValidationResult::from_issues(issues)
}

fn check_value(spec: &FieldSpec, value: &Value, issues: &mut Vec<ValidationIssue>) {
    let type_error = || {
        ValidationIssue::error(
            spec.id,
            "INVALID_TYPE",
            format!("{} must be a {}, got {}", spec.label, spec.kind.type_name(), value),
        )
    };

    match spec.kind {
        FieldKind::Number => {
            let Some(n) = value.as_f64() else {
                issues.push(type_error());
                return;
            };
            if let Some(min) = spec.min {
                if n < min {
                    issues.push(out_of_range(spec, n));
                    return;
                }
            }
            if let Some(max) = spec.max {
                if n > max {
                    issues.push(out_of_range(spec, n));
                }
            }
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                issues.push(type_error());
            }
        }
        FieldKind::String => {
            if !value.is_string() {
                issues.push(type_error());
            }
        }
        FieldKind::Enum => {
            let Some(s) = value.as_str() else {
                issues.push(type_error());
                return;
            };
            if !spec.allowed_values.iter().any(|allowed| *allowed == s) {
                let message = format!(
                    "'{}' is not a valid {} (expected one of: {})",
                    s,
                    spec.label,
                    spec.allowed_values.join(", ")
                );
                if spec.lenient {
                    issues.push(ValidationIssue::warning(
                        spec.id,
                        "UNKNOWN_KEY",
                        format!("{}; the documented default will be used", message),
                    ));
                } else {
                    issues.push(ValidationIssue::error(spec.id, "INVALID_OPTION", message));
                }
            }
        }
    }
}

fn out_of_range(spec: &FieldSpec, value: f64) -> ValidationIssue {
    let unit = spec.unit.map(|u| format!(" {}", u)).unwrap_or_default();
    let bounds = match (spec.min, spec.max) {
        (Some(min), Some(max)) => format!("between {}{} and {}{}", min, unit, max, unit),
        (Some(min), None) => format!("at least {}{}", min, unit),
        (None, Some(max)) => format!("at most {}{}", max, unit),
        (None, None) => "within bounds".to_string(),
    };
    ValidationIssue::error(
        spec.id,
        "OUT_OF_RANGE",
        format!("{} must be {} (got {})", spec.label, bounds, value),
    )
}

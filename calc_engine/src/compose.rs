//! # Result Composition
//!
//! Wraps the raw output of a calculator into the [`CalculationResult`]
//! envelope returned to hosts: success flag, payload or error messages, and
//! invocation metadata.
//!
//! Validation warnings are merged into the payload's `warnings` array as
//! [`Advisory`] entries. They never become errors and never flip `success`.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::EngineResult;
use crate::fields::InputRecord;
use crate::materials::LIBRARY_VERSION;
use crate::settings::{EngineSettings, ENGINE_VERSION};
use crate::validation::ValidationIssue;

/// Advisory priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// A warning or recommendation attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub code: String,
    pub message: String,
    pub priority: Priority,
}

impl Advisory {
    pub fn new(code: impl Into<String>, message: impl Into<String>, priority: Priority) -> Self {
        Advisory {
            code: code.into(),
            message: message.into(),
            priority,
        }
    }

    pub fn high(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, Priority::High)
    }

    pub fn medium(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, Priority::Medium)
    }

    pub fn low(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, Priority::Low)
    }
}

impl From<&ValidationIssue> for Advisory {
    fn from(issue: &ValidationIssue) -> Self {
        Advisory::medium(issue.code.clone(), issue.message.clone())
    }
}

/// Coarse confidence of an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    /// Band for a 0-1 confidence value (≥ 0.85 high, ≥ 0.70 medium)
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.85 {
            ConfidenceBand::High
        } else if confidence >= 0.70 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Invocation metadata, present on every result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub timestamp: DateTime<Utc>,
    /// Wall time of the compute stage only
    pub calculation_time_ms: f64,
    /// Calculator version
    pub version: String,
    /// Leading hex digits of SHA-256 over the canonical input JSON
    pub input_fingerprint: String,
    pub calculator_id: String,
    pub engine_version: String,
    pub library_version: String,
    pub request_id: Uuid,
}

/// Final envelope handed to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub metadata: Metadata,
}

impl CalculationResult {
    /// Codes of every advisory in `data.warnings`
    pub fn warning_codes(&self) -> Vec<String> {
        self.data
            .as_ref()
            .and_then(|d| d.get("warnings"))
            .and_then(Value::as_array)
            .map(|warnings| {
                warnings
                    .iter()
                    .filter_map(|w| w.get("code").and_then(Value::as_str).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warning_codes().iter().any(|c| c == code)
    }
}

/// What the registry knows about one invocation
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub calculator_id: &'a str,
    pub calculator_version: &'a str,
    /// Input after defaults were applied
    pub input: &'a InputRecord,
    pub elapsed: Duration,
}

/// Build the result envelope.
///
/// A failed `outcome` yields `success: false` with the error's display text
/// and no data. Validation warnings go in front of the calculator's own.
pub fn compose(
    invocation: Invocation<'_>,
    outcome: EngineResult<Value>,
    validation_warnings: &[ValidationIssue],
    settings: &EngineSettings,
) -> CalculationResult {
    let metadata = Metadata {
        timestamp: Utc::now(),
        calculation_time_ms: invocation.elapsed.as_secs_f64() * 1000.0,
        version: invocation.calculator_version.to_string(),
        input_fingerprint: invocation.input.fingerprint(settings.fingerprint_len),
        calculator_id: invocation.calculator_id.to_string(),
        engine_version: ENGINE_VERSION.to_string(),
        library_version: LIBRARY_VERSION.to_string(),
        request_id: Uuid::new_v4(),
    };

    match outcome {
        Ok(mut data) => {
            merge_warnings(&mut data, validation_warnings);
            CalculationResult {
                success: true,
                data: Some(data),
                errors: None,
                metadata,
            }
        }
        Err(err) => CalculationResult {
            success: false,
            data: None,
            errors: Some(vec![err.to_string()]),
            metadata,
        },
    }
}

fn merge_warnings(data: &mut Value, validation_warnings: &[ValidationIssue]) {
    let Some(object) = data.as_object_mut() else {
        return;
    };

    let mut merged: Vec<Value> = validation_warnings
        .iter()
        .map(Advisory::from)
        .filter_map(|a| serde_json::to_value(a).ok())
        .collect();

    if let Some(Value::Array(existing)) = object.remove("warnings") {
        merged.extend(existing);
    }

    // One entry per code; the first occurrence wins
    let mut seen = BTreeSet::new();
    merged.retain(|w| match w.get("code").and_then(Value::as_str) {
        Some(code) => seen.insert(code.to_string()),
        None => true,
    });
    object.insert("warnings".to_string(), Value::Array(merged));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use serde_json::json;

    fn invocation(input: &InputRecord) -> Invocation<'_> {
        Invocation {
            calculator_id: "haz-analysis",
            calculator_version: "1.2.0",
            input,
            elapsed: Duration::from_micros(1500),
        }
    }

    #[test]
    fn test_success_carries_metadata() {
        let input = InputRecord::new().with("thickness", 5.0);
        let result = compose(invocation(&input), Ok(json!({"width": 1.0})), &[], &EngineSettings::default());

        assert!(result.success);
        assert!(result.errors.is_none());
        assert_eq!(result.metadata.version, "1.2.0");
        assert_eq!(result.metadata.input_fingerprint.len(), 16);
        assert_eq!(result.metadata.input_fingerprint, input.fingerprint(16));
        assert!((result.metadata.calculation_time_ms - 1.5).abs() < 1e-9);
        assert_eq!(result.metadata.library_version, LIBRARY_VERSION);
    }

    #[test]
    fn test_failure_has_no_data() {
        let input = InputRecord::new();
        let result = compose(
            invocation(&input),
            Err(EngineError::calculation_failed("haz", "non-finite width")),
            &[],
            &EngineSettings::default(),
        );
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(
            result.errors,
            Some(vec!["Calculation failed: haz - non-finite width".to_string()])
        );
    }

    #[test]
    fn test_validation_warnings_merged_first() {
        let input = InputRecord::new();
        let data = json!({"warnings": [{"code": "POWER_LIMITED", "message": "m", "priority": "high"}]});
        let issues = vec![ValidationIssue::warning("assist_gas", "SUBOPTIMAL_GAS", "poor pairing")];
        let result = compose(invocation(&input), Ok(data), &issues, &EngineSettings::default());

        assert_eq!(result.warning_codes(), vec!["SUBOPTIMAL_GAS", "POWER_LIMITED"]);
        assert!(result.success);
    }

    #[test]
    fn test_duplicate_codes_collapse() {
        let input = InputRecord::new();
        let data = json!({"warnings": [
            {"code": "HIGH_HEAT_INPUT", "message": "from compute", "priority": "high"},
            {"code": "POWER_LIMITED", "message": "m", "priority": "high"}
        ]});
        let issues = vec![ValidationIssue::warning("laser_power", "HIGH_HEAT_INPUT", "from validation")];
        let result = compose(invocation(&input), Ok(data), &issues, &EngineSettings::default());

        assert_eq!(result.warning_codes(), vec!["HIGH_HEAT_INPUT", "POWER_LIMITED"]);
        let warnings = result.data.unwrap()["warnings"].clone();
        assert_eq!(warnings[0]["message"], "from validation");
    }

    #[test]
    fn test_warnings_array_created_when_absent() {
        let input = InputRecord::new();
        let issues = vec![ValidationIssue::warning("x", "UNKNOWN_FIELD", "ignored")];
        let result = compose(invocation(&input), Ok(json!({})), &issues, &EngineSettings::default());
        assert!(result.has_warning("UNKNOWN_FIELD"));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let input = InputRecord::new();
        let a = compose(invocation(&input), Ok(json!({})), &[], &EngineSettings::default());
        let b = compose(invocation(&input), Ok(json!({})), &[], &EngineSettings::default());
        assert_ne!(a.metadata.request_id, b.metadata.request_id);
    }

    #[test]
    fn test_confidence_bands() {
        assert_eq!(ConfidenceBand::from_confidence(0.9), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(0.75), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(0.4), ConfidenceBand::Low);
    }
}

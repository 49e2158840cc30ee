//! # Error Types
//!
//! Structured error types for calc_engine. Errors carry enough context for a
//! host application to map them onto its own responses (HTTP 404 for an
//! unknown calculator, 400 for failed validation, 500 for the rest) without
//! parsing message text.
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::errors::{EngineError, EngineResult};
//!
//! fn check_thickness(thickness_mm: f64) -> EngineResult<()> {
//!     if thickness_mm <= 0.0 {
//!         return Err(EngineError::invalid_input(
//!             "thickness",
//!             thickness_mm.to_string(),
//!             "Thickness must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_thickness(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Result type alias for calc_engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Structured error type for engine operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EngineError {
    /// No calculator is registered under this id
    #[error("Calculator not found: {id}")]
    CalculatorNotFound { id: String },

    /// A calculator with this id is already registered
    #[error("Calculator already registered: {id}")]
    DuplicateCalculator { id: String },

    /// Input failed validation; the algorithm was not run
    #[error("Validation failed for '{calculator_id}' ({} error(s))", .issues.len())]
    ValidationFailed {
        calculator_id: String,
        issues: Vec<ValidationIssue>,
    },

    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Calculation failed (precondition violated, non-finite result, ...)
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    /// Create a CalculatorNotFound error
    pub fn calculator_not_found(id: impl Into<String>) -> Self {
        EngineError::CalculatorNotFound { id: id.into() }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        EngineError::MissingField {
            field: field.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        EngineError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check whether the caller can fix this error by changing the input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::CalculatorNotFound { .. }
                | EngineError::ValidationFailed { .. }
                | EngineError::InvalidInput { .. }
                | EngineError::MissingField { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::CalculatorNotFound { .. } => "CALCULATOR_NOT_FOUND",
            EngineError::DuplicateCalculator { .. } => "DUPLICATE_CALCULATOR",
            EngineError::ValidationFailed { .. } => "VALIDATION_FAILED",
            EngineError::InvalidInput { .. } => "INVALID_INPUT",
            EngineError::MissingField { .. } => "MISSING_FIELD",
            EngineError::CalculationFailed { .. } => "CALCULATION_FAILED",
            EngineError::FileError { .. } => "FILE_ERROR",
            EngineError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EngineError::VersionMismatch { .. } => "VERSION_MISMATCH",
            EngineError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = EngineError::invalid_input("thickness", "-5.0", "Thickness must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: EngineError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EngineError::missing_field("power").error_code(), "MISSING_FIELD");
        assert_eq!(
            EngineError::calculator_not_found("nope").error_code(),
            "CALCULATOR_NOT_FOUND"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(EngineError::calculator_not_found("x").is_client_error());
        assert!(!EngineError::calculation_failed("haz", "nan").is_client_error());
    }

    #[test]
    fn test_validation_failed_display() {
        let err = EngineError::ValidationFailed {
            calculator_id: "haz-analysis".to_string(),
            issues: vec![ValidationIssue::error("thickness", "OUT_OF_RANGE", "too thick")],
        };
        assert_eq!(err.to_string(), "Validation failed for 'haz-analysis' (1 error(s))");
    }
}

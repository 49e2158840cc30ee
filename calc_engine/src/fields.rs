//! # Field Schema and Input Records
//!
//! Every calculator declares its inputs as an ordered list of [`FieldSpec`]s.
//! The host renders forms from them, the validator checks records against
//! them, and `default_inputs` is derived from their defaults.
//!
//! An [`InputRecord`] is the per-invocation mapping from field id to JSON
//! value. It is backed by a `BTreeMap`, so its JSON form is key-ordered and
//! the input fingerprint does not depend on insertion order.
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::fields::{FieldSpec, InputRecord};
//!
//! let power = FieldSpec::number("laser_power", "Laser power", 3000.0)
//!     .range(100.0, 20000.0)
//!     .step(10.0)
//!     .unit("W");
//! assert!(power.required);
//!
//! let input = InputRecord::new().with("laser_power", 3000.0);
//! assert_eq!(input.number("laser_power").unwrap(), 3000.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::{EngineError, EngineResult};

/// Value kind of an input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Number,
    Enum,
    Boolean,
    String,
}

impl FieldKind {
    /// JSON type name used in validation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Enum => "option",
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
        }
    }
}

/// Declarative description of one input parameter.
///
/// Specs are built once, at registration time, and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Field id, the key in the input record
    pub id: &'static str,
    /// Human-readable label for forms
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// UI increment hint; not enforced by validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<&'static str>,
    /// Always-valid default, used for optional fields and `default_inputs`
    pub default: Value,
    /// Enum backed by a lookup table: unknown keys warn instead of failing
    pub lenient: bool,
}

impl FieldSpec {
    fn base(id: &'static str, label: &'static str, kind: FieldKind, default: Value) -> Self {
        FieldSpec {
            id,
            label,
            kind,
            required: true,
            min: None,
            max: None,
            step: None,
            unit: None,
            allowed_values: Vec::new(),
            default,
            lenient: false,
        }
    }

    /// Numeric field with a default value
    pub fn number(id: &'static str, label: &'static str, default: f64) -> Self {
        Self::base(id, label, FieldKind::Number, Value::from(default))
    }

    /// Enumerated field; `default` must be one of `allowed`
    pub fn enumeration(
        id: &'static str,
        label: &'static str,
        allowed: &[&'static str],
        default: &'static str,
    ) -> Self {
        let mut spec = Self::base(id, label, FieldKind::Enum, Value::from(default));
        spec.allowed_values = allowed.to_vec();
        spec
    }

    /// Boolean field
    pub fn boolean(id: &'static str, label: &'static str, default: bool) -> Self {
        Self::base(id, label, FieldKind::Boolean, Value::from(default))
    }

    /// Free-text field
    pub fn text(id: &'static str, label: &'static str, default: &'static str) -> Self {
        Self::base(id, label, FieldKind::String, Value::from(default))
    }

    /// Inclusive numeric bounds (builder pattern)
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Mark the field optional; absent values take the default
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Mark an enum field as a lookup-table key (see [`crate::materials`])
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }
}

/// Per-invocation input: field id → JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputRecord(BTreeMap<String, Value>);

impl InputRecord {
    pub fn new() -> Self {
        InputRecord(BTreeMap::new())
    }

    /// Build the record of all field defaults
    pub fn from_defaults(specs: &[FieldSpec]) -> Self {
        InputRecord(
            specs
                .iter()
                .map(|spec| (spec.id.to_string(), spec.default.clone()))
                .collect(),
        )
    }

    /// Add or replace a value (builder pattern)
    pub fn with(mut self, id: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(id.into(), value.into());
        self
    }

    /// Set a value (mutable)
    pub fn set(&mut self, id: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(id.into(), value.into());
    }

    /// Raw value; JSON `null` counts as absent
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id).filter(|v| !v.is_null())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with every absent field filled from its spec default
    pub fn with_defaults(&self, specs: &[FieldSpec]) -> Self {
        let mut filled = self.clone();
        for spec in specs {
            if !filled.contains(spec.id) {
                filled.0.insert(spec.id.to_string(), spec.default.clone());
            }
        }
        filled
    }

    /// Copy holding only the fields `specs` declare
    pub fn retain_declared(&self, specs: &[FieldSpec]) -> Self {
        InputRecord(
            self.0
                .iter()
                .filter(|(id, _)| specs.iter().any(|spec| spec.id == id.as_str()))
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        )
    }

    /// Numeric value of a field
    pub fn number(&self, id: &str) -> EngineResult<f64> {
        match self.get(id) {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| EngineError::invalid_input(id, n.to_string(), "Not representable as f64")),
            Some(other) => Err(EngineError::invalid_input(id, other.to_string(), "Expected a number")),
            None => Err(EngineError::missing_field(id)),
        }
    }

    /// String value of an enum or text field
    pub fn text(&self, id: &str) -> EngineResult<&str> {
        match self.get(id) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(EngineError::invalid_input(id, other.to_string(), "Expected a string")),
            None => Err(EngineError::missing_field(id)),
        }
    }

    /// Boolean value of a field
    pub fn flag(&self, id: &str) -> EngineResult<bool> {
        match self.get(id) {
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(EngineError::invalid_input(id, other.to_string(), "Expected a boolean")),
            None => Err(EngineError::missing_field(id)),
        }
    }

    /// Stable hex fingerprint of the record (SHA-256 of its canonical JSON).
    ///
    /// `len` is clamped to the 64 hex characters of the digest.
    pub fn fingerprint(&self, len: usize) -> String {
        let canonical = serde_json::to_string(&self.0).unwrap_or_default();
        let digest = Sha256::digest(canonical.as_bytes());
        let encoded = hex::encode(digest);
        encoded[..len.min(encoded.len())].to_string()
    }
}

impl From<BTreeMap<String, Value>> for InputRecord {
    fn from(map: BTreeMap<String, Value>) -> Self {
        InputRecord(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::number("thickness", "Thickness", 5.0).range(0.1, 50.0).unit("mm"),
            FieldSpec::enumeration("gas", "Assist gas", &["oxygen", "nitrogen"], "nitrogen").optional(),
            FieldSpec::boolean("pulsed", "Pulsed", false).optional(),
        ]
    }

    #[test]
    fn test_builder() {
        let spec = FieldSpec::number("power", "Power", 1000.0).range(100.0, 2000.0).step(10.0).unit("W");
        assert_eq!(spec.min, Some(100.0));
        assert_eq!(spec.max, Some(2000.0));
        assert_eq!(spec.step, Some(10.0));
        assert!(spec.required);
        assert!(!spec.lenient);
    }

    #[test]
    fn test_defaults_fill_missing_only() {
        let input = InputRecord::new().with("thickness", 2.0);
        let filled = input.with_defaults(&specs());
        assert_eq!(filled.number("thickness").unwrap(), 2.0);
        assert_eq!(filled.text("gas").unwrap(), "nitrogen");
        assert!(!filled.flag("pulsed").unwrap());
    }

    #[test]
    fn test_null_is_absent() {
        let input = InputRecord::new().with("thickness", Value::Null);
        assert!(!input.contains("thickness"));
        assert!(matches!(input.number("thickness"), Err(EngineError::MissingField { .. })));
    }

    #[test]
    fn test_typed_getters_reject_wrong_type() {
        let input = InputRecord::new().with("thickness", "thick");
        assert!(matches!(input.number("thickness"), Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_fingerprint_is_order_independent() {
        let a = InputRecord::new().with("a", 1.0).with("b", "x");
        let b = InputRecord::new().with("b", "x").with("a", 1.0);
        assert_eq!(a.fingerprint(16), b.fingerprint(16));
        assert_eq!(a.fingerprint(16).len(), 16);

        let c = a.clone().with("a", 2.0);
        assert_ne!(a.fingerprint(16), c.fingerprint(16));
    }

    #[test]
    fn test_fingerprint_full_digest() {
        let input = InputRecord::new().with("a", 1.0);
        let full = input.fingerprint(usize::MAX);
        assert_eq!(full.len(), 64);
        assert!(full.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(full.starts_with(&input.fingerprint(16)));
    }

    #[test]
    fn test_retain_declared_drops_extras() {
        let input = InputRecord::new().with("thickness", 2.0).with("junk", 1.0);
        let kept = input.retain_declared(&specs());
        assert_eq!(kept.len(), 1);
        assert!(!kept.contains("junk"));
        assert_eq!(kept.fingerprint(16), InputRecord::new().with("thickness", 2.0).fingerprint(16));
    }

    #[test]
    fn test_spec_serialization_skips_empty() {
        let spec = FieldSpec::boolean("pulsed", "Pulsed", false);
        let json = serde_json::to_string(&spec).unwrap();
        assert!(!json.contains("allowed_values"));
        assert!(json.contains("\"kind\":\"boolean\""));
    }
}

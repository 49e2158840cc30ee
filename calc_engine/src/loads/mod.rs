//! Panel loads and load combinations
//!
//! - [`LoadType`]: dead, live and wind categories
//! - [`LoadCase`]: unfactored line loads for one panel strip
//! - [`LoadCombination`]: factor sets, applied to a case
//!
//! # Example
//!
//! ```
//! use calc_engine::loads::{find_governing_combination, strength_combinations, LoadCase, LoadType};
//!
//! let strip = LoadCase::new("Facade strip")
//!     .with_load(LoadType::Dead, 0.4)   // N/mm
//!     .with_load(LoadType::Live, 1.5)
//!     .with_load(LoadType::Wind, 0.5);
//!
//! let governing = find_governing_combination(&strip, &strength_combinations());
//! assert_eq!(governing.name, "LRFD-2");
//! ```

pub mod combinations;
pub mod load_types;

pub use combinations::{
    find_governing_combination, service_combinations, strength_combinations, GoverningCombination,
    LoadCombination,
};
pub use load_types::LoadType;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// Unfactored loads by type. Units are the caller's (N/mm line loads for
/// panels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCase {
    pub label: String,
    pub loads: BTreeMap<LoadType, f64>,
}

impl LoadCase {
    pub fn new(label: impl Into<String>) -> Self {
        LoadCase {
            label: label.into(),
            loads: BTreeMap::new(),
        }
    }

    /// Add or update a load value (builder pattern)
    pub fn with_load(mut self, load_type: LoadType, value: f64) -> Self {
        self.loads.insert(load_type, value);
        self
    }

    /// Load value, 0.0 when not set
    pub fn get(&self, load_type: LoadType) -> f64 {
        self.loads.get(&load_type).copied().unwrap_or(0.0)
    }

    /// Loads are magnitudes; negative values are rejected
    pub fn validate(&self) -> EngineResult<()> {
        for (load_type, value) in &self.loads {
            if *value < 0.0 || !value.is_finite() {
                return Err(EngineError::invalid_input(
                    format!("load_{}", load_type.code()),
                    value.to_string(),
                    format!("{} must be a non-negative magnitude", load_type.description()),
                ));
            }
        }
        Ok(())
    }

    /// Results of every combination, in input order
    pub fn combination_results(&self, combinations: &[LoadCombination]) -> Vec<(String, f64)> {
        combinations
            .iter()
            .map(|combo| (combo.name.clone(), combo.apply(self)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_defaults() {
        let case = LoadCase::new("Strip").with_load(LoadType::Dead, 0.5);
        assert_eq!(case.get(LoadType::Dead), 0.5);
        assert_eq!(case.get(LoadType::Wind), 0.0);
    }

    #[test]
    fn test_negative_load_rejected() {
        let case = LoadCase::new("Strip").with_load(LoadType::Wind, -1.0);
        assert!(case.validate().is_err());
        assert!(LoadCase::new("Strip").with_load(LoadType::Live, 2.0).validate().is_ok());
    }

    #[test]
    fn test_combination_results_keep_order() {
        let case = LoadCase::new("Strip").with_load(LoadType::Dead, 1.0);
        let results = case.combination_results(&strength_combinations());
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].0, "LRFD-1");
        assert!((results[0].1 - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_case_serialization() {
        let case = LoadCase::new("Strip").with_load(LoadType::Live, 2.0);
        let json = serde_json::to_string(&case).unwrap();
        let parsed: LoadCase = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, case);
    }
}

//! Panel Load Combinations
//!
//! Strength (LRFD) combinations size the panel against yield; service
//! combinations drive the deflection check. Wind is entered as a positive
//! magnitude and treated as acting on the same face as the live load, which
//! is the governing direction for a simply supported strip.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::load_types::LoadType;
use super::LoadCase;

/// A named set of load factors.
///
/// # Example
/// ```
/// use calc_engine::loads::{LoadCase, LoadCombination, LoadType};
///
/// let combo = LoadCombination::new("LRFD-2", "1.2D + 1.6L")
///     .with_factor(LoadType::Dead, 1.2)
///     .with_factor(LoadType::Live, 1.6);
///
/// let case = LoadCase::new("Panel")
///     .with_load(LoadType::Dead, 10.0)
///     .with_load(LoadType::Live, 5.0);
///
/// assert!((combo.apply(&case) - 20.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Identifier (e.g. "LRFD-3", "SLS-2")
    pub name: String,
    /// Display equation (e.g. "1.2D + 1.0W + L")
    pub equation: String,
    pub factors: BTreeMap<LoadType, f64>,
}

impl LoadCombination {
    pub fn new(name: impl Into<String>, equation: impl Into<String>) -> Self {
        LoadCombination {
            name: name.into(),
            equation: equation.into(),
            factors: BTreeMap::new(),
        }
    }

    /// Add a load factor (builder pattern)
    pub fn with_factor(mut self, load_type: LoadType, factor: f64) -> Self {
        self.factors.insert(load_type, factor);
        self
    }

    /// Total factored load. Types missing from either side count as zero.
    pub fn apply(&self, case: &LoadCase) -> f64 {
        self.factors
            .iter()
            .map(|(load_type, factor)| factor * case.get(*load_type))
            .sum()
    }
}

/// LRFD strength combinations for panel design
pub fn strength_combinations() -> Vec<LoadCombination> {
    vec![
        LoadCombination::new("LRFD-1", "1.4D").with_factor(LoadType::Dead, 1.4),
        LoadCombination::new("LRFD-2", "1.2D + 1.6L")
            .with_factor(LoadType::Dead, 1.2)
            .with_factor(LoadType::Live, 1.6),
        LoadCombination::new("LRFD-3", "1.2D + 1.0W + L")
            .with_factor(LoadType::Dead, 1.2)
            .with_factor(LoadType::Wind, 1.0)
            .with_factor(LoadType::Live, 1.0),
        LoadCombination::new("LRFD-4", "0.9D + 1.0W")
            .with_factor(LoadType::Dead, 0.9)
            .with_factor(LoadType::Wind, 1.0),
    ]
}

/// Unfactored service combinations for the deflection check
pub fn service_combinations() -> Vec<LoadCombination> {
    vec![
        LoadCombination::new("SLS-1", "D + L")
            .with_factor(LoadType::Dead, 1.0)
            .with_factor(LoadType::Live, 1.0),
        LoadCombination::new("SLS-2", "D + 0.6W")
            .with_factor(LoadType::Dead, 1.0)
            .with_factor(LoadType::Wind, 0.6),
        LoadCombination::new("SLS-3", "D + 0.75L + 0.45W")
            .with_factor(LoadType::Dead, 1.0)
            .with_factor(LoadType::Live, 0.75)
            .with_factor(LoadType::Wind, 0.45),
    ]
}

/// The combination producing the largest factored load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoverningCombination {
    pub name: String,
    pub equation: String,
    pub load: f64,
}

/// Apply every combination and keep the maximum.
///
/// Ties keep the earlier combination. An empty slice yields a zero load with
/// an empty name.
pub fn find_governing_combination(case: &LoadCase, combinations: &[LoadCombination]) -> GoverningCombination {
    let mut governing = GoverningCombination {
        name: String::new(),
        equation: String::new(),
        load: 0.0,
    };
    let mut first = true;
    for combo in combinations {
        let load = combo.apply(case);
        if first || load > governing.load {
            governing = GoverningCombination {
                name: combo.name.clone(),
                equation: combo.equation.clone(),
                load,
            };
            first = false;
        }
    }
    governing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(dead: f64, live: f64, wind: f64) -> LoadCase {
        LoadCase::new("Panel")
            .with_load(LoadType::Dead, dead)
            .with_load(LoadType::Live, live)
            .with_load(LoadType::Wind, wind)
    }

    #[test]
    fn test_dead_only_governed_by_1_4d() {
        let g = find_governing_combination(&case(10.0, 0.0, 0.0), &strength_combinations());
        assert_eq!(g.name, "LRFD-1");
        assert!((g.load - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_live_governs() {
        let g = find_governing_combination(&case(1.0, 5.0, 1.0), &strength_combinations());
        // 1.2 + 8.0 = 9.2 vs 1.2 + 1.0 + 5.0 = 7.2
        assert_eq!(g.name, "LRFD-2");
        assert!((g.load - 9.2).abs() < 1e-9);
    }

    #[test]
    fn test_wind_governs() {
        let g = find_governing_combination(&case(1.0, 1.0, 8.0), &strength_combinations());
        assert_eq!(g.name, "LRFD-3");
        assert!((g.load - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_service_combinations() {
        let g = find_governing_combination(&case(1.0, 2.0, 2.0), &service_combinations());
        // D+L = 3.0, D+0.6W = 2.2, D+0.75L+0.45W = 3.4
        assert_eq!(g.name, "SLS-3");
        assert!((g.load - 3.4).abs() < 1e-9);
    }

    #[test]
    fn test_empty_combinations() {
        let g = find_governing_combination(&case(1.0, 1.0, 1.0), &[]);
        assert_eq!(g.load, 0.0);
        assert!(g.name.is_empty());
    }

    #[test]
    fn test_missing_factor_is_zero() {
        let combo = LoadCombination::new("X", "D").with_factor(LoadType::Dead, 1.0);
        let only_wind = LoadCase::new("Wind").with_load(LoadType::Wind, 3.0);
        assert_eq!(combo.apply(&only_wind), 0.0);
    }
}

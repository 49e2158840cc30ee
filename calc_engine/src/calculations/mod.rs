//! # Laser Process Calculations
//!
//! Each calculator module follows the same pattern:
//!
//! - `*Input`: typed parameters, built from an [`InputRecord`] by
//!   `from_record`
//! - `*Result`: the JSON payload returned to the host
//! - `calculate(&input, &library) -> EngineResult<*Result>`: a pure function
//! - a unit struct implementing [`Calculator`], which is what gets registered
//!
//! ## Available Calculators
//!
//! | id | module |
//! | --- | --- |
//! | `haz-analysis` | [`haz`] |
//! | `architectural-panel` | [`architectural_panel`] |
//! | `material-selection` | [`material_selection`] |
//! | `power-speed-matching` | [`power_speed`] |
//! | `quality-prediction` | [`quality_prediction`] |
//! | `cutting-cost` | [`cutting_cost`] |
//!
//! Material, gas and laser keys are resolved leniently: an unknown key falls
//! back to the table default and the result carries a `DEFAULT_RECORD_USED`
//! warning.

pub mod architectural_panel;
pub mod cutting_cost;
pub mod haz;
pub mod material_selection;
pub mod power_speed;
pub mod quality_prediction;

pub use architectural_panel::{ArchitecturalPanel, PanelInput, PanelResult};
pub use cutting_cost::{CostInput, CostResult, CuttingCost};
pub use haz::{HazAnalysis, HazInput, HazResult};
pub use material_selection::{MaterialSelection, SelectionInput, SelectionResult};
pub use power_speed::{PowerSpeedInput, PowerSpeedMatching, PowerSpeedResult};
pub use quality_prediction::{QualityInput, QualityPrediction, QualityResult};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::compose::Advisory;
use crate::errors::{EngineError, EngineResult};
use crate::materials::{AssistGas, CutMaterial, LaserSource, Resolved, Table, TableKey};
use crate::registry::Calculator;

/// Every built-in calculator, ready to register
pub fn builtin() -> Vec<Box<dyn Calculator>> {
    vec![
        Box::new(HazAnalysis),
        Box::new(ArchitecturalPanel),
        Box::new(MaterialSelection),
        Box::new(PowerSpeedMatching),
        Box::new(QualityPrediction),
        Box::new(CuttingCost),
    ]
}

/// Resolve a raw key against `table`, recording a warning when the default
/// record stands in for an unknown key.
pub(crate) fn resolve_key<'a, K: TableKey, V>(
    table: &'a Table<K, V>,
    field: &'static str,
    requested: &'a str,
    warnings: &mut Vec<Advisory>,
) -> Resolved<'a, K, V> {
    let resolved = table.resolve(requested);
    if resolved.used_default {
        warn!(
            table = table.name,
            requested,
            default = resolved.key.key(),
            "unknown key, using default record"
        );
        warnings.push(Advisory::medium(
            "DEFAULT_RECORD_USED",
            format!(
                "Unknown {} '{}'; properties of '{}' were used instead",
                field,
                requested,
                resolved.key.key()
            ),
        ));
    }
    resolved
}

/// Enum keys offered by the lenient material/gas/laser fields
pub(crate) fn cut_material_keys() -> Vec<&'static str> {
    CutMaterial::keys()
}

pub(crate) fn gas_keys() -> Vec<&'static str> {
    AssistGas::keys()
}

pub(crate) fn laser_keys() -> Vec<&'static str> {
    LaserSource::keys()
}

/// Serialize a result struct into the JSON payload
pub(crate) fn to_payload<T: Serialize>(result: &T) -> EngineResult<Value> {
    Ok(serde_json::to_value(result)?)
}

/// Reject non-finite intermediate values instead of emitting NaN
pub(crate) fn ensure_finite(calculation: &'static str, name: &str, value: f64) -> EngineResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::calculation_failed(
            calculation,
            format!("{} is not a finite number", name),
        ))
    }
}

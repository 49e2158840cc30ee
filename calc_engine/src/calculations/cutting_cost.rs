//! # Cutting Cost
//!
//! Per-part cost of a laser-cut profile, split into machine time, electrical
//! energy, assist gas and sheet material.
//!
//! ## Model
//!
//! ```text
//! time      = cut_length / speed + pierces × pierce_time(t)
//! energy    = P / wall_plug_efficiency × time × electricity_rate
//! gas       = consumption × time × gas price
//! machine   = time × (machine_rate + source maintenance)
//! material  = part_area × t × density × price
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::calculations::cutting_cost::{calculate, CostInput};
//! use calc_engine::materials::DomainLibrary;
//!
//! let input = CostInput {
//!     material: "steel".to_string(),
//!     thickness_mm: 3.0,
//!     cut_length_mm: 5000.0,
//!     pierce_count: 10,
//!     laser_power_w: 3000.0,
//!     cutting_speed_mm_min: 3000.0,
//!     laser_source: "fiber".to_string(),
//!     assist_gas: "nitrogen".to_string(),
//!     part_area_mm2: 250_000.0,
//!     electricity_rate: 0.15,
//!     machine_rate: 80.0,
//! };
//!
//! let result = calculate(&input, DomainLibrary::global()).unwrap();
//! assert!(result.total_cost_usd > 0.0);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{cut_material_keys, ensure_finite, gas_keys, laser_keys, resolve_key, to_payload};
use crate::compose::Advisory;
use crate::errors::{EngineError, EngineResult};
use crate::fields::{FieldSpec, InputRecord};
use crate::materials::{AssistGas, DomainLibrary, TableKey};
use crate::registry::Calculator;
use crate::units::{round_to, Millimeters, MmPerMin, Watts};
use crate::validation::ValidationIssue;

const CALC: &str = "cutting-cost";

/// Share of total cost above which gas is flagged as dominant (%)
pub const GAS_DOMINANT_SHARE_PCT: f64 = 40.0;

/// Share of cut time spent piercing above which pierces are flagged (%)
const PIERCE_HEAVY_SHARE_PCT: f64 = 30.0;

/// Seconds to pierce a sheet of thickness `t` mm
pub fn pierce_time_s(thickness_mm: f64) -> f64 {
    0.1 + 0.05 * thickness_mm + 0.01 * thickness_mm.powi(2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostInput {
    pub material: String,
    pub thickness_mm: f64,
    pub cut_length_mm: f64,
    pub pierce_count: u32,
    pub laser_power_w: f64,
    pub cutting_speed_mm_min: f64,
    pub laser_source: String,
    pub assist_gas: String,
    pub part_area_mm2: f64,
    /// USD/kWh
    pub electricity_rate: f64,
    /// USD/h, operator and depreciation
    pub machine_rate: f64,
}

impl CostInput {
    pub fn from_record(record: &InputRecord) -> EngineResult<Self> {
        Ok(CostInput {
            material: record.text("material")?.to_string(),
            thickness_mm: record.number("thickness")?,
            cut_length_mm: record.number("cut_length")?,
            pierce_count: record.number("pierce_count")?.max(0.0).round() as u32,
            laser_power_w: record.number("laser_power")?,
            cutting_speed_mm_min: record.number("cutting_speed")?,
            laser_source: record.text("laser_source")?.to_string(),
            assist_gas: record.text("assist_gas")?.to_string(),
            part_area_mm2: record.number("part_area")?,
            electricity_rate: record.number("electricity_rate")?,
            machine_rate: record.number("machine_rate")?,
        })
    }

    fn check(&self) -> EngineResult<()> {
        for (field, value) in [
            ("thickness", self.thickness_mm),
            ("cut_length", self.cut_length_mm),
            ("laser_power", self.laser_power_w),
            ("cutting_speed", self.cutting_speed_mm_min),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(EngineError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        for (field, value) in [
            ("part_area", self.part_area_mm2),
            ("electricity_rate", self.electricity_rate),
            ("machine_rate", self.machine_rate),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(EngineError::invalid_input(field, value.to_string(), "Must not be negative"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Machine,
    Energy,
    Gas,
    Material,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub category: CostCategory,
    pub cost_usd: f64,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    pub material: String,
    pub laser_source: String,
    pub assist_gas: String,
    pub cutting_time_s: f64,
    pub pierce_time_s: f64,
    pub total_time_s: f64,
    pub electrical_power_kw: f64,
    pub energy_kwh: f64,
    pub gas_volume_m3: f64,
    pub part_mass_kg: f64,
    /// Largest share first
    pub breakdown: Vec<CostItem>,
    pub total_cost_usd: f64,
    /// Process cost (total minus material) per metre of cut
    pub cost_per_meter_usd: f64,
    pub warnings: Vec<Advisory>,
    pub recommendations: Vec<Advisory>,
}

impl CostResult {
    pub fn item(&self, category: CostCategory) -> Option<&CostItem> {
        self.breakdown.iter().find(|item| item.category == category)
    }
}

pub fn calculate(input: &CostInput, library: &DomainLibrary) -> EngineResult<CostResult> {
    input.check()?;

    let mut warnings = Vec::new();
    let material = resolve_key(&library.cut_materials, "material", &input.material, &mut warnings);
    let laser = resolve_key(&library.lasers, "laser_source", &input.laser_source, &mut warnings);
    let gas = resolve_key(&library.gases, "assist_gas", &input.assist_gas, &mut warnings);

    // === Time ===
    let cutting_time = MmPerMin(input.cutting_speed_mm_min).travel_time_s(Millimeters(input.cut_length_mm));
    let pierce_time = input.pierce_count as f64 * pierce_time_s(input.thickness_mm);
    let total_time = ensure_finite(CALC, "total_time", cutting_time + pierce_time)?;
    let hours = total_time / 3600.0;

    // === Cost items ===
    let electrical_kw = Watts(input.laser_power_w).kilowatts() / laser.record.wall_plug_efficiency;
    let energy_kwh = electrical_kw * hours;
    let energy_cost = energy_kwh * input.electricity_rate;

    let gas_m3 = gas.record.consumption_l_min * (total_time / 60.0) / 1000.0;
    let gas_cost = gas_m3 * gas.record.cost_per_m3;

    let machine_cost = hours * (input.machine_rate + laser.record.maintenance_per_hour);

    let part_mass = input.part_area_mm2 * input.thickness_mm * material.record.density_kg_m3 * 1e-9;
    let material_cost = part_mass * material.record.cost_per_kg;

    let total = energy_cost + gas_cost + machine_cost + material_cost;
    let share = |cost: f64| if total > 0.0 { cost / total * 100.0 } else { 0.0 };

    let mut breakdown: Vec<CostItem> = [
        (CostCategory::Machine, machine_cost),
        (CostCategory::Energy, energy_cost),
        (CostCategory::Gas, gas_cost),
        (CostCategory::Material, material_cost),
    ]
    .into_iter()
    .map(|(category, cost)| CostItem {
        category,
        cost_usd: round_to(cost, 4),
        share_pct: round_to(share(cost), 1),
    })
    .collect();
    breakdown.sort_by(|a, b| b.cost_usd.total_cmp(&a.cost_usd));

    let process_cost = total - material_cost;
    let cost_per_meter = process_cost / (input.cut_length_mm / 1000.0);

    // === Advisories ===
    let mut recommendations = Vec::new();
    let gas_share = share(gas_cost);
    if gas_share > GAS_DOMINANT_SHARE_PCT {
        warnings.push(Advisory::medium(
            "GAS_COST_DOMINANT",
            format!("{} accounts for {:.0}% of the part cost", gas.record.name, gas_share),
        ));
        let air = AssistGas::Air.properties();
        if gas.key != AssistGas::Air && air.is_recommended_for(material.key) {
            recommendations.push(Advisory::medium(
                "CONSIDER_COMPRESSED_AIR",
                format!(
                    "Compressed air is rated {}/5 for {} at a fraction of the gas cost",
                    air.rating(material.key),
                    material.record.name
                ),
            ));
        }
    }
    if total_time > 0.0 && pierce_time / total_time * 100.0 > PIERCE_HEAVY_SHARE_PCT {
        recommendations.push(Advisory::low(
            "REDUCE_PIERCES",
            format!(
                "Piercing takes {:.0}% of the cycle; common-line cutting or fewer lead-ins would help",
                pierce_time / total_time * 100.0
            ),
        ));
    }

    Ok(CostResult {
        material: material.key.key().to_string(),
        laser_source: laser.key.key().to_string(),
        assist_gas: gas.key.key().to_string(),
        cutting_time_s: round_to(cutting_time, 2),
        pierce_time_s: round_to(pierce_time, 2),
        total_time_s: round_to(total_time, 2),
        electrical_power_kw: round_to(electrical_kw, 2),
        energy_kwh: round_to(energy_kwh, 4),
        gas_volume_m3: round_to(gas_m3, 4),
        part_mass_kg: round_to(part_mass, 3),
        breakdown,
        total_cost_usd: round_to(total, 2),
        cost_per_meter_usd: round_to(cost_per_meter, 3),
        warnings,
        recommendations,
    })
}

fn fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::enumeration("material", "Material", &cut_material_keys(), "steel").lenient(),
        FieldSpec::number("thickness", "Thickness", 3.0)
            .range(0.5, 30.0)
            .step(0.5)
            .unit("mm"),
        FieldSpec::number("cut_length", "Total cut length", 5000.0)
            .range(1.0, 10_000_000.0)
            .unit("mm"),
        FieldSpec::number("pierce_count", "Pierces", 10.0)
            .range(0.0, 10_000.0)
            .step(1.0),
        FieldSpec::number("laser_power", "Laser power", 3000.0)
            .range(100.0, 20000.0)
            .step(100.0)
            .unit("W"),
        FieldSpec::number("cutting_speed", "Cutting speed", 3000.0)
            .range(10.0, 50000.0)
            .step(10.0)
            .unit("mm/min"),
        FieldSpec::enumeration("laser_source", "Laser source", &laser_keys(), "fiber").lenient(),
        FieldSpec::enumeration("assist_gas", "Assist gas", &gas_keys(), "nitrogen").lenient(),
        FieldSpec::number("part_area", "Part blank area", 250_000.0)
            .range(0.0, 100_000_000.0)
            .unit("mm²")
            .optional(),
        FieldSpec::number("electricity_rate", "Electricity rate", 0.15)
            .range(0.0, 5.0)
            .step(0.01)
            .unit("USD/kWh")
            .optional(),
        FieldSpec::number("machine_rate", "Machine rate", 80.0)
            .range(0.0, 1000.0)
            .step(1.0)
            .unit("USD/h")
            .optional(),
    ]
}

/// `cutting-cost` calculator
pub struct CuttingCost;

impl Calculator for CuttingCost {
    fn id(&self) -> &'static str {
        CALC
    }

    fn name(&self) -> &'static str {
        "Cutting Cost Estimate"
    }

    fn description(&self) -> &'static str {
        "Machine, energy, gas and material cost of a laser-cut part"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn field_specs(&self) -> Vec<FieldSpec> {
        fields()
    }

    fn cross_validate(&self, input: &InputRecord, _library: &DomainLibrary) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let (Ok(length), Ok(area)) = (input.number("cut_length"), input.number("part_area")) {
            // A closed outline of length L encloses at most L²/4π
            if area > length * length / (4.0 * std::f64::consts::PI) {
                issues.push(ValidationIssue::warning(
                    "part_area",
                    "AREA_EXCEEDS_OUTLINE",
                    "Part area is larger than the cut length can enclose; check units",
                ));
            }
        }
        issues
    }

    fn compute(&self, input: &InputRecord, library: &DomainLibrary) -> EngineResult<Value> {
        let input = CostInput::from_record(input)?;
        to_payload(&calculate(&input, library)?)
    }

    fn example_inputs(&self) -> InputRecord {
        InputRecord::new()
            .with("material", "stainless_steel")
            .with("thickness", 2.0)
            .with("cut_length", 12_000.0)
            .with("pierce_count", 24.0)
            .with("laser_power", 4000.0)
            .with("cutting_speed", 5000.0)
            .with("laser_source", "fiber")
            .with("assist_gas", "nitrogen")
            .with("part_area", 400_000.0)
            .with("electricity_rate", 0.2)
            .with("machine_rate", 95.0)
    }
}

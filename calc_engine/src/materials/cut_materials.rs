//! Cut Materials (thermal properties)
//!
//! Thermophysical and cutting data for sheet metals processed by laser.
//! Values are room-temperature handbook figures; absorptivity is quoted for
//! ~1 µm (fiber / disk / Nd:YAG) radiation.
//!
//! Diffusivity is stored precomputed (α = k / ρc, converted to mm²/s) so the
//! thermal model does not repeat the unit conversion per call.

use serde::{Deserialize, Serialize};

use super::TableKey;

/// Sheet material categories known to the cutting calculators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutMaterial {
    /// Mild / carbon steel (S235, A36)
    Steel,
    /// Austenitic stainless (304)
    StainlessSteel,
    /// Aluminum 6061-T6
    #[serde(rename = "aluminum_6061")]
    Aluminum6061,
    /// Aluminum 5052-H32
    #[serde(rename = "aluminum_5052")]
    Aluminum5052,
    /// Copper C110
    Copper,
    /// Brass C260
    Brass,
    /// Ti-6Al-4V
    Titanium,
    /// Hot-dip galvanized steel
    GalvanizedSteel,
}

impl TableKey for CutMaterial {
    const ALL: &'static [CutMaterial] = &[
        CutMaterial::Steel,
        CutMaterial::StainlessSteel,
        CutMaterial::Aluminum6061,
        CutMaterial::Aluminum5052,
        CutMaterial::Copper,
        CutMaterial::Brass,
        CutMaterial::Titanium,
        CutMaterial::GalvanizedSteel,
    ];

    fn key(&self) -> &'static str {
        match self {
            CutMaterial::Steel => "steel",
            CutMaterial::StainlessSteel => "stainless_steel",
            CutMaterial::Aluminum6061 => "aluminum_6061",
            CutMaterial::Aluminum5052 => "aluminum_5052",
            CutMaterial::Copper => "copper",
            CutMaterial::Brass => "brass",
            CutMaterial::Titanium => "titanium",
            CutMaterial::GalvanizedSteel => "galvanized_steel",
        }
    }
}

/// Thermal and process properties of a cut material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalProperties {
    pub name: &'static str,
    /// Thermal conductivity k (W/m·K)
    pub thermal_conductivity_w_mk: f64,
    /// Density ρ (kg/m³)
    pub density_kg_m3: f64,
    /// Specific heat c (J/kg·K)
    pub specific_heat_j_kgk: f64,
    /// Thermal diffusivity α (mm²/s)
    pub thermal_diffusivity_mm2_s: f64,
    /// Melting point / solidus (°C)
    pub melting_point_c: f64,
    /// Temperature above which microstructure changes; the HAZ boundary (°C)
    pub transformation_temp_c: f64,
    /// Fraction of incident 1 µm radiation absorbed
    pub absorptivity: f64,
    /// Empirical HAZ width multiplier
    pub haz_factor: f64,
    /// Relative power demand versus mild steel (1.0)
    pub cut_difficulty: f64,
    /// Best achievable edge quality score (0-100)
    pub base_edge_quality: f64,
    /// Optimal line energy per mm of thickness (J/mm²)
    pub optimal_energy_density: f64,
    /// Sheet price (USD/kg)
    pub cost_per_kg: f64,
    /// Back-reflection risk for the optics
    pub highly_reflective: bool,
    /// What happens inside the HAZ
    pub metallurgical_effects: &'static [&'static str],
}

impl CutMaterial {
    /// Bundled property record
    pub fn properties(self) -> ThermalProperties {
        match self {
            CutMaterial::Steel => ThermalProperties {
                name: "Mild Steel",
                thermal_conductivity_w_mk: 50.0,
                density_kg_m3: 7850.0,
                specific_heat_j_kgk: 490.0,
                thermal_diffusivity_mm2_s: 13.0,
                melting_point_c: 1510.0,
                transformation_temp_c: 723.0,
                absorptivity: 0.40,
                haz_factor: 1.0,
                cut_difficulty: 1.0,
                base_edge_quality: 85.0,
                optimal_energy_density: 18.0,
                cost_per_kg: 0.9,
                highly_reflective: false,
                metallurgical_effects: &[
                    "Martensite formation near the cut edge raises hardness",
                    "Grain coarsening in the high-temperature band",
                ],
            },
            CutMaterial::StainlessSteel => ThermalProperties {
                name: "Stainless Steel 304",
                thermal_conductivity_w_mk: 16.2,
                density_kg_m3: 8000.0,
                specific_heat_j_kgk: 500.0,
                thermal_diffusivity_mm2_s: 4.05,
                melting_point_c: 1450.0,
                transformation_temp_c: 500.0,
                absorptivity: 0.38,
                haz_factor: 0.9,
                cut_difficulty: 1.2,
                base_edge_quality: 82.0,
                optimal_energy_density: 20.0,
                cost_per_kg: 3.5,
                highly_reflective: false,
                metallurgical_effects: &[
                    "Chromium carbide precipitation (sensitization) in the 500-800 °C band",
                    "Local loss of corrosion resistance along the edge",
                ],
            },
            CutMaterial::Aluminum6061 => ThermalProperties {
                name: "Aluminum 6061-T6",
                thermal_conductivity_w_mk: 167.0,
                density_kg_m3: 2700.0,
                specific_heat_j_kgk: 896.0,
                thermal_diffusivity_mm2_s: 69.0,
                melting_point_c: 652.0,
                transformation_temp_c: 250.0,
                absorptivity: 0.12,
                haz_factor: 1.4,
                cut_difficulty: 1.5,
                base_edge_quality: 75.0,
                optimal_energy_density: 24.0,
                cost_per_kg: 3.2,
                highly_reflective: true,
                metallurgical_effects: &[
                    "Over-aging of Mg2Si precipitates softens the T6 temper",
                    "Strength loss of up to 40% inside the HAZ",
                ],
            },
            CutMaterial::Aluminum5052 => ThermalProperties {
                name: "Aluminum 5052-H32",
                thermal_conductivity_w_mk: 138.0,
                density_kg_m3: 2680.0,
                specific_heat_j_kgk: 880.0,
                thermal_diffusivity_mm2_s: 58.5,
                melting_point_c: 607.0,
                transformation_temp_c: 300.0,
                absorptivity: 0.12,
                haz_factor: 1.3,
                cut_difficulty: 1.4,
                base_edge_quality: 76.0,
                optimal_energy_density: 23.0,
                cost_per_kg: 2.9,
                highly_reflective: true,
                metallurgical_effects: &["Recovery and partial annealing of the strain-hardened temper"],
            },
            CutMaterial::Copper => ThermalProperties {
                name: "Copper C110",
                thermal_conductivity_w_mk: 398.0,
                density_kg_m3: 8960.0,
                specific_heat_j_kgk: 385.0,
                thermal_diffusivity_mm2_s: 115.4,
                melting_point_c: 1085.0,
                transformation_temp_c: 300.0,
                absorptivity: 0.05,
                haz_factor: 1.8,
                cut_difficulty: 2.2,
                base_edge_quality: 65.0,
                optimal_energy_density: 35.0,
                cost_per_kg: 9.5,
                highly_reflective: true,
                metallurgical_effects: &[
                    "Recrystallization and softening of cold-worked grain",
                    "Surface oxidation when cut with oxygen",
                ],
            },
            CutMaterial::Brass => ThermalProperties {
                name: "Brass C260",
                thermal_conductivity_w_mk: 120.0,
                density_kg_m3: 8530.0,
                specific_heat_j_kgk: 380.0,
                thermal_diffusivity_mm2_s: 37.0,
                melting_point_c: 930.0,
                transformation_temp_c: 350.0,
                absorptivity: 0.08,
                haz_factor: 1.5,
                cut_difficulty: 1.8,
                base_edge_quality: 70.0,
                optimal_energy_density: 30.0,
                cost_per_kg: 7.0,
                highly_reflective: true,
                metallurgical_effects: &[
                    "Zinc evaporation (dezincification) at the edge",
                    "Annealing of cold-worked temper",
                ],
            },
            CutMaterial::Titanium => ThermalProperties {
                name: "Titanium Ti-6Al-4V",
                thermal_conductivity_w_mk: 6.7,
                density_kg_m3: 4430.0,
                specific_heat_j_kgk: 526.0,
                thermal_diffusivity_mm2_s: 2.88,
                melting_point_c: 1660.0,
                transformation_temp_c: 700.0,
                absorptivity: 0.45,
                haz_factor: 0.8,
                cut_difficulty: 1.3,
                base_edge_quality: 80.0,
                optimal_energy_density: 16.0,
                cost_per_kg: 28.0,
                highly_reflective: false,
                metallurgical_effects: &[
                    "Alpha-case formation from oxygen and nitrogen pickup",
                    "Embrittlement of the edge layer",
                ],
            },
            CutMaterial::GalvanizedSteel => ThermalProperties {
                name: "Galvanized Steel",
                thermal_conductivity_w_mk: 50.0,
                density_kg_m3: 7850.0,
                specific_heat_j_kgk: 490.0,
                thermal_diffusivity_mm2_s: 13.0,
                melting_point_c: 1510.0,
                transformation_temp_c: 723.0,
                absorptivity: 0.35,
                haz_factor: 1.05,
                cut_difficulty: 1.1,
                base_edge_quality: 78.0,
                optimal_energy_density: 19.0,
                cost_per_kg: 1.2,
                highly_reflective: false,
                metallurgical_effects: &[
                    "Zinc coating burn-back beside the kerf",
                    "Martensite formation near the cut edge",
                ],
            },
        }
    }
}

impl std::fmt::Display for CutMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.properties().name)
    }
}

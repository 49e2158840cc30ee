//! Structural Materials
//!
//! Mechanical, cost and durability data for plate and sheet stock, used by
//! panel design and material selection.
//!
//! Ratings (`corrosion_rating`, `weldability`) run from 1 (poor) to 5
//! (excellent). Stiffness is stored in GPa as published; the panel check
//! converts to MPa.

use serde::{Deserialize, Serialize};

use super::TableKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralMaterial {
    MildSteel,
    HslaSteel,
    #[serde(rename = "stainless_304")]
    Stainless304,
    #[serde(rename = "stainless_316")]
    Stainless316,
    #[serde(rename = "aluminum_6061")]
    Aluminum6061,
    #[serde(rename = "aluminum_7075")]
    Aluminum7075,
    Titanium,
    Copper,
    Brass,
    Corten,
    #[serde(rename = "inconel_625")]
    Inconel625,
}

impl TableKey for StructuralMaterial {
    const ALL: &'static [StructuralMaterial] = &[
        StructuralMaterial::MildSteel,
        StructuralMaterial::HslaSteel,
        StructuralMaterial::Stainless304,
        StructuralMaterial::Stainless316,
        StructuralMaterial::Aluminum6061,
        StructuralMaterial::Aluminum7075,
        StructuralMaterial::Titanium,
        StructuralMaterial::Copper,
        StructuralMaterial::Brass,
        StructuralMaterial::Corten,
        StructuralMaterial::Inconel625,
    ];

    fn key(&self) -> &'static str {
        match self {
            StructuralMaterial::MildSteel => "mild_steel",
            StructuralMaterial::HslaSteel => "hsla_steel",
            StructuralMaterial::Stainless304 => "stainless_304",
            StructuralMaterial::Stainless316 => "stainless_316",
            StructuralMaterial::Aluminum6061 => "aluminum_6061",
            StructuralMaterial::Aluminum7075 => "aluminum_7075",
            StructuralMaterial::Titanium => "titanium",
            StructuralMaterial::Copper => "copper",
            StructuralMaterial::Brass => "brass",
            StructuralMaterial::Corten => "corten",
            StructuralMaterial::Inconel625 => "inconel_625",
        }
    }
}

/// End use a material is suited to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Application {
    Structural,
    Aerospace,
    Automotive,
    Marine,
    Architectural,
    FoodProcessing,
    Electrical,
    Decorative,
}

impl TableKey for Application {
    const ALL: &'static [Application] = &[
        Application::Structural,
        Application::Aerospace,
        Application::Automotive,
        Application::Marine,
        Application::Architectural,
        Application::FoodProcessing,
        Application::Electrical,
        Application::Decorative,
    ];

    fn key(&self) -> &'static str {
        match self {
            Application::Structural => "structural",
            Application::Aerospace => "aerospace",
            Application::Automotive => "automotive",
            Application::Marine => "marine",
            Application::Architectural => "architectural",
            Application::FoodProcessing => "food_processing",
            Application::Electrical => "electrical",
            Application::Decorative => "decorative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanicalProperties {
    pub name: &'static str,
    /// Alloy family (carbon_steel, stainless, aluminum, ...)
    pub family: &'static str,
    /// Modulus of elasticity E (GPa)
    pub elastic_modulus_gpa: f64,
    pub density_kg_m3: f64,
    /// Fy (MPa)
    pub yield_strength_mpa: f64,
    /// Fu (MPa)
    pub tensile_strength_mpa: f64,
    pub corrosion_rating: u8,
    pub weldability: u8,
    /// Plate price (USD/kg)
    pub cost_per_kg: f64,
    pub applications: &'static [Application],
    pub pros: &'static [&'static str],
    pub cons: &'static [&'static str],
}

impl MechanicalProperties {
    /// E in MPa (N/mm²)
    pub fn elastic_modulus_mpa(&self) -> f64 {
        self.elastic_modulus_gpa * 1000.0
    }

    pub fn suits(&self, application: Application) -> bool {
        self.applications.contains(&application)
    }
}

impl StructuralMaterial {
    pub fn properties(self) -> MechanicalProperties {
        use Application::*;
        match self {
            StructuralMaterial::MildSteel => MechanicalProperties {
                name: "Mild Steel (A36)",
                family: "carbon_steel",
                elastic_modulus_gpa: 200.0,
                density_kg_m3: 7850.0,
                yield_strength_mpa: 250.0,
                tensile_strength_mpa: 400.0,
                corrosion_rating: 1,
                weldability: 5,
                cost_per_kg: 1.2,
                applications: &[Structural, Automotive, Architectural],
                pros: &["Lowest cost", "Excellent weldability", "Widely stocked"],
                cons: &["Needs coating against corrosion", "Heavy"],
            },
            StructuralMaterial::HslaSteel => MechanicalProperties {
                name: "HSLA Structural Steel (S355)",
                family: "carbon_steel",
                elastic_modulus_gpa: 205.0,
                density_kg_m3: 7850.0,
                yield_strength_mpa: 355.0,
                tensile_strength_mpa: 510.0,
                corrosion_rating: 2,
                weldability: 4,
                cost_per_kg: 2.0,
                applications: &[Structural, Automotive],
                pros: &["High strength for the price", "Good weldability"],
                cons: &["Still requires corrosion protection"],
            },
            StructuralMaterial::Stainless304 => MechanicalProperties {
                name: "Stainless Steel 304",
                family: "stainless",
                elastic_modulus_gpa: 193.0,
                density_kg_m3: 8000.0,
                yield_strength_mpa: 205.0,
                tensile_strength_mpa: 515.0,
                corrosion_rating: 4,
                weldability: 4,
                cost_per_kg: 4.5,
                applications: &[FoodProcessing, Architectural, Decorative],
                pros: &["Good corrosion resistance", "Hygienic finish"],
                cons: &["Moderate yield strength", "Chloride pitting"],
            },
            StructuralMaterial::Stainless316 => MechanicalProperties {
                name: "Stainless Steel 316",
                family: "stainless",
                elastic_modulus_gpa: 193.0,
                density_kg_m3: 8000.0,
                yield_strength_mpa: 290.0,
                tensile_strength_mpa: 580.0,
                corrosion_rating: 5,
                weldability: 4,
                cost_per_kg: 6.0,
                applications: &[Marine, FoodProcessing],
                pros: &["Resists chlorides and sea water", "Good weldability"],
                cons: &["Higher cost than 304"],
            },
            StructuralMaterial::Aluminum6061 => MechanicalProperties {
                name: "Aluminum 6061-T6",
                family: "aluminum",
                elastic_modulus_gpa: 68.9,
                density_kg_m3: 2700.0,
                yield_strength_mpa: 276.0,
                tensile_strength_mpa: 310.0,
                corrosion_rating: 3,
                weldability: 3,
                cost_per_kg: 4.0,
                applications: &[Structural, Aerospace, Automotive, Marine, Architectural],
                pros: &["One third the weight of steel", "Good general corrosion resistance"],
                cons: &["Low stiffness", "Weld zone loses temper"],
            },
            StructuralMaterial::Aluminum7075 => MechanicalProperties {
                name: "Aluminum 7075-T6",
                family: "aluminum",
                elastic_modulus_gpa: 71.7,
                density_kg_m3: 2810.0,
                yield_strength_mpa: 503.0,
                tensile_strength_mpa: 572.0,
                corrosion_rating: 2,
                weldability: 1,
                cost_per_kg: 8.0,
                applications: &[Aerospace],
                pros: &["Very high strength-to-weight"],
                cons: &["Practically unweldable", "Stress corrosion cracking"],
            },
            StructuralMaterial::Titanium => MechanicalProperties {
                name: "Titanium Ti-6Al-4V",
                family: "titanium",
                elastic_modulus_gpa: 114.0,
                density_kg_m3: 4430.0,
                yield_strength_mpa: 880.0,
                tensile_strength_mpa: 950.0,
                corrosion_rating: 5,
                weldability: 3,
                cost_per_kg: 35.0,
                applications: &[Aerospace, Marine],
                pros: &["Exceptional strength-to-weight", "Immune to sea water"],
                cons: &["Very expensive", "Welding needs inert shielding"],
            },
            StructuralMaterial::Copper => MechanicalProperties {
                name: "Copper C110",
                family: "copper",
                elastic_modulus_gpa: 117.0,
                density_kg_m3: 8960.0,
                yield_strength_mpa: 69.0,
                tensile_strength_mpa: 220.0,
                corrosion_rating: 3,
                weldability: 2,
                cost_per_kg: 9.0,
                applications: &[Electrical, Decorative],
                pros: &["Best electrical conductivity", "Attractive patina"],
                cons: &["Low strength", "Expensive"],
            },
            StructuralMaterial::Brass => MechanicalProperties {
                name: "Brass C260",
                family: "copper",
                elastic_modulus_gpa: 100.0,
                density_kg_m3: 8530.0,
                yield_strength_mpa: 110.0,
                tensile_strength_mpa: 340.0,
                corrosion_rating: 3,
                weldability: 2,
                cost_per_kg: 7.0,
                applications: &[Decorative, Electrical],
                pros: &["Decorative finish", "Easy to machine"],
                cons: &["Low strength", "Dezincification in some waters"],
            },
            StructuralMaterial::Corten => MechanicalProperties {
                name: "Weathering Steel (Corten A)",
                family: "carbon_steel",
                elastic_modulus_gpa: 200.0,
                density_kg_m3: 7850.0,
                yield_strength_mpa: 345.0,
                tensile_strength_mpa: 485.0,
                corrosion_rating: 3,
                weldability: 4,
                cost_per_kg: 2.5,
                applications: &[Architectural, Structural],
                pros: &["Self-protecting patina", "No painting required"],
                cons: &["Rust run-off stains adjacent surfaces", "Unsuited to marine spray"],
            },
            StructuralMaterial::Inconel625 => MechanicalProperties {
                name: "Inconel 625",
                family: "nickel_alloy",
                elastic_modulus_gpa: 205.0,
                density_kg_m3: 8440.0,
                yield_strength_mpa: 517.0,
                tensile_strength_mpa: 930.0,
                corrosion_rating: 5,
                weldability: 4,
                cost_per_kg: 60.0,
                applications: &[Aerospace, Marine],
                pros: &["Extreme corrosion and heat resistance"],
                cons: &["Highest cost in the catalog", "Hard to machine"],
            },
        }
    }
}

impl std::fmt::Display for StructuralMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.properties().name)
    }
}

//! Assist Gases
//!
//! Price, consumption and material compatibility of the gases blown through
//! the cutting nozzle. Compatibility is rated 1 (avoid) to 5 (preferred).

use serde::{Deserialize, Serialize};

use super::{CutMaterial, TableKey};

/// Rating below which a gas/material pairing is flagged as suboptimal
pub const MIN_RECOMMENDED_RATING: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistGas {
    Oxygen,
    Nitrogen,
    Air,
    Argon,
}

impl TableKey for AssistGas {
    const ALL: &'static [AssistGas] = &[AssistGas::Oxygen, AssistGas::Nitrogen, AssistGas::Air, AssistGas::Argon];

    fn key(&self) -> &'static str {
        match self {
            AssistGas::Oxygen => "oxygen",
            AssistGas::Nitrogen => "nitrogen",
            AssistGas::Air => "air",
            AssistGas::Argon => "argon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GasProperties {
    pub name: &'static str,
    /// Price (USD/m³)
    pub cost_per_m3: f64,
    /// Consumption at typical pressure (L/min)
    pub consumption_l_min: f64,
    /// Typical nozzle pressure (bar)
    pub typical_pressure_bar: f64,
    /// Extra heat released by reaction with the melt (1.0 = inert)
    pub heat_factor: f64,
    /// Optimal focus position as a fraction of thickness (negative = below surface)
    pub focus_ratio: f64,
    /// Compatibility rating per material, 1-5
    pub ratings: &'static [(CutMaterial, u8)],
}

impl GasProperties {
    /// Compatibility rating for a material (1 when unrated)
    pub fn rating(&self, material: CutMaterial) -> u8 {
        self.ratings
            .iter()
            .find(|(m, _)| *m == material)
            .map(|(_, r)| *r)
            .unwrap_or(1)
    }

    /// Whether this pairing reaches the recommended rating
    pub fn is_recommended_for(&self, material: CutMaterial) -> bool {
        self.rating(material) >= MIN_RECOMMENDED_RATING
    }
}

impl AssistGas {
    pub fn properties(self) -> GasProperties {
        use CutMaterial::*;
        match self {
            AssistGas::Oxygen => GasProperties {
                name: "Oxygen",
                cost_per_m3: 0.80,
                consumption_l_min: 15.0,
                typical_pressure_bar: 1.0,
                heat_factor: 1.3,
                focus_ratio: 0.0,
                ratings: &[
                    (Steel, 5),
                    (StainlessSteel, 2),
                    (Aluminum6061, 1),
                    (Aluminum5052, 1),
                    (Copper, 3),
                    (Brass, 2),
                    (Titanium, 1),
                    (GalvanizedSteel, 3),
                ],
            },
            AssistGas::Nitrogen => GasProperties {
                name: "Nitrogen",
                cost_per_m3: 0.60,
                consumption_l_min: 250.0,
                typical_pressure_bar: 15.0,
                heat_factor: 1.0,
                focus_ratio: -0.3,
                ratings: &[
                    (Steel, 4),
                    (StainlessSteel, 5),
                    (Aluminum6061, 5),
                    (Aluminum5052, 5),
                    (Copper, 4),
                    (Brass, 5),
                    (Titanium, 2),
                    (GalvanizedSteel, 4),
                ],
            },
            AssistGas::Air => GasProperties {
                name: "Compressed Air",
                cost_per_m3: 0.05,
                consumption_l_min: 200.0,
                typical_pressure_bar: 10.0,
                heat_factor: 1.05,
                focus_ratio: -0.2,
                ratings: &[
                    (Steel, 3),
                    (StainlessSteel, 3),
                    (Aluminum6061, 4),
                    (Aluminum5052, 4),
                    (Copper, 2),
                    (Brass, 3),
                    (Titanium, 1),
                    (GalvanizedSteel, 4),
                ],
            },
            AssistGas::Argon => GasProperties {
                name: "Argon",
                cost_per_m3: 3.50,
                consumption_l_min: 220.0,
                typical_pressure_bar: 12.0,
                heat_factor: 1.0,
                focus_ratio: -0.3,
                ratings: &[
                    (Steel, 2),
                    (StainlessSteel, 4),
                    (Aluminum6061, 3),
                    (Aluminum5052, 3),
                    (Copper, 3),
                    (Brass, 3),
                    (Titanium, 5),
                    (GalvanizedSteel, 2),
                ],
            },
        }
    }

    /// Highest-rated gas for a material (first wins on ties)
    pub fn best_for(material: CutMaterial) -> AssistGas {
        let mut best = AssistGas::Nitrogen;
        let mut best_rating = 0;
        for gas in AssistGas::ALL {
            let rating = gas.properties().rating(material);
            if rating > best_rating {
                best = *gas;
                best_rating = rating;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_material_rated() {
        for gas in AssistGas::ALL {
            let props = gas.properties();
            for material in CutMaterial::ALL {
                let r = props.rating(*material);
                assert!((1..=5).contains(&r));
            }
            assert_eq!(props.ratings.len(), CutMaterial::ALL.len());
        }
    }

    #[test]
    fn test_best_gas() {
        assert_eq!(AssistGas::best_for(CutMaterial::Steel), AssistGas::Oxygen);
        assert_eq!(AssistGas::best_for(CutMaterial::StainlessSteel), AssistGas::Nitrogen);
        assert_eq!(AssistGas::best_for(CutMaterial::Titanium), AssistGas::Argon);
    }

    #[test]
    fn test_suboptimal_pairing() {
        let oxygen = AssistGas::Oxygen.properties();
        assert!(!oxygen.is_recommended_for(CutMaterial::Aluminum6061));
        assert!(oxygen.is_recommended_for(CutMaterial::Steel));
    }
}

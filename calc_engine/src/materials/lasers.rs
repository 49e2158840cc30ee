//! Laser Sources
//!
//! Resonator types and how they shift the power/speed baseline relative to a
//! fiber laser at the same nominal power.

use serde::{Deserialize, Serialize};

use super::TableKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaserSource {
    Fiber,
    Co2,
    NdYag,
    Disk,
}

impl TableKey for LaserSource {
    const ALL: &'static [LaserSource] = &[LaserSource::Fiber, LaserSource::Co2, LaserSource::NdYag, LaserSource::Disk];

    fn key(&self) -> &'static str {
        match self {
            LaserSource::Fiber => "fiber",
            LaserSource::Co2 => "co2",
            LaserSource::NdYag => "nd_yag",
            LaserSource::Disk => "disk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaserProperties {
    pub name: &'static str,
    pub wavelength_um: f64,
    /// Power needed relative to fiber for the same cut
    pub power_factor: f64,
    /// Achievable speed relative to fiber
    pub speed_factor: f64,
    /// Electrical-to-optical efficiency
    pub wall_plug_efficiency: f64,
    /// Edge quality offset in score points
    pub quality_offset: f64,
    /// Consumables and service (USD/h of beam-on time)
    pub maintenance_per_hour: f64,
    /// Whether copper/brass/aluminum can be cut without back-reflection risk
    pub handles_reflective: bool,
}

impl LaserSource {
    pub fn properties(self) -> LaserProperties {
        match self {
            LaserSource::Fiber => LaserProperties {
                name: "Fiber Laser",
                wavelength_um: 1.07,
                power_factor: 1.0,
                speed_factor: 1.0,
                wall_plug_efficiency: 0.35,
                quality_offset: 0.0,
                maintenance_per_hour: 2.0,
                handles_reflective: true,
            },
            LaserSource::Co2 => LaserProperties {
                name: "CO2 Laser",
                wavelength_um: 10.6,
                power_factor: 1.3,
                speed_factor: 0.8,
                wall_plug_efficiency: 0.10,
                quality_offset: 2.0,
                maintenance_per_hour: 6.0,
                handles_reflective: false,
            },
            LaserSource::NdYag => LaserProperties {
                name: "Nd:YAG Laser",
                wavelength_um: 1.064,
                power_factor: 1.15,
                speed_factor: 0.85,
                wall_plug_efficiency: 0.08,
                quality_offset: -3.0,
                maintenance_per_hour: 5.0,
                handles_reflective: true,
            },
            LaserSource::Disk => LaserProperties {
                name: "Disk Laser",
                wavelength_um: 1.03,
                power_factor: 0.95,
                speed_factor: 1.05,
                wall_plug_efficiency: 0.25,
                quality_offset: 1.0,
                maintenance_per_hour: 3.0,
                handles_reflective: true,
            },
        }
    }
}

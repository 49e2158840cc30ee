//! # Domain Model Library
//!
//! Immutable, process-wide tables of material and process properties used by
//! every calculator.
//!
//! ## Tables
//!
//! - **Cut materials** ([`CutMaterial`]): thermal and cutting behaviour of
//!   sheet metals under a laser beam
//! - **Structural materials** ([`StructuralMaterial`]): mechanical, cost and
//!   corrosion data for panel design and material selection
//! - **Assist gases** ([`AssistGas`]): price, consumption and per-material
//!   compatibility ratings
//! - **Laser sources** ([`LaserSource`]): power/speed factors and wall-plug
//!   efficiency per resonator type
//!
//! ## Default Records
//!
//! Every table declares a default key. Resolving an unknown key never fails:
//! it yields the default record with [`Resolved::used_default`] set, and the
//! calculators turn that flag into a `DEFAULT_RECORD_USED` warning. Both
//! material tables fall back to `aluminum_6061`.
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::materials::{CutMaterial, DomainLibrary};
//!
//! let library = DomainLibrary::global();
//!
//! let steel = library.cut_materials.resolve("steel");
//! assert_eq!(steel.key, CutMaterial::Steel);
//! assert!(!steel.used_default);
//!
//! let unknown = library.cut_materials.resolve("unobtainium");
//! assert_eq!(unknown.key, CutMaterial::Aluminum6061);
//! assert!(unknown.used_default);
//! ```

pub mod cut_materials;
pub mod gases;
pub mod lasers;
pub mod structural;

pub use cut_materials::{CutMaterial, ThermalProperties};
pub use gases::{AssistGas, GasProperties};
pub use lasers::{LaserProperties, LaserSource};
pub use structural::{Application, MechanicalProperties, StructuralMaterial};

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Version of the bundled property tables
pub const LIBRARY_VERSION: &str = "2024.2";

/// Enum key of a lookup table.
///
/// Keys map to stable snake_case strings, the form used in input records.
pub trait TableKey: Copy + Ord + std::fmt::Debug + 'static {
    /// Every key, in display order
    const ALL: &'static [Self];

    /// Stable string key (e.g. "stainless_steel")
    fn key(&self) -> &'static str;

    /// Parse a string key; `None` for unknown keys
    fn from_key(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.iter().copied().find(|k| k.key() == normalized)
    }

    /// All string keys, in display order
    fn keys() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.key()).collect()
    }
}

/// Outcome of resolving a raw key against a table
#[derive(Debug)]
pub struct Resolved<'a, K, V> {
    /// Key actually used
    pub key: K,
    pub record: &'a V,
    /// Key as supplied by the caller
    pub requested: &'a str,
    /// True when `requested` was unknown and the default record was used
    pub used_default: bool,
}

/// Immutable, versioned lookup table
#[derive(Debug)]
pub struct Table<K: TableKey, V> {
    pub name: &'static str,
    pub version: &'static str,
    pub default_key: K,
    rows: BTreeMap<K, V>,
    default_row: V,
}

impl<K: TableKey, V> Table<K, V> {
    /// Build a table by evaluating `row` for every key.
    pub fn build(name: &'static str, default_key: K, row: fn(K) -> V) -> Self {
        Table {
            name,
            version: LIBRARY_VERSION,
            default_key,
            rows: K::ALL.iter().map(|k| (*k, row(*k))).collect(),
            default_row: row(default_key),
        }
    }

    /// Record for a typed key
    pub fn get(&self, key: K) -> &V {
        self.rows.get(&key).unwrap_or(&self.default_row)
    }

    /// Resolve a raw string key, falling back to the documented default
    pub fn resolve<'a>(&'a self, requested: &'a str) -> Resolved<'a, K, V> {
        match K::from_key(requested) {
            Some(key) => Resolved {
                key,
                record: self.get(key),
                requested,
                used_default: false,
            },
            None => Resolved {
                key: self.default_key,
                record: &self.default_row,
                requested,
                used_default: true,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.rows.iter()
    }
}

/// Table category for the generic [`DomainLibrary::lookup`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CutMaterial,
    StructuralMaterial,
    AssistGas,
    LaserSource,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::CutMaterial,
        Category::StructuralMaterial,
        Category::AssistGas,
        Category::LaserSource,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::CutMaterial => "cut_material",
            Category::StructuralMaterial => "structural_material",
            Category::AssistGas => "assist_gas",
            Category::LaserSource => "laser_source",
        }
    }

    /// Parse from "cut_material", "structural-material", etc.
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "cut_material" | "cut" | "thermal" => Some(Category::CutMaterial),
            "structural_material" | "structural" | "selection" => Some(Category::StructuralMaterial),
            "assist_gas" | "gas" => Some(Category::AssistGas),
            "laser_source" | "laser" => Some(Category::LaserSource),
            _ => None,
        }
    }
}

/// A record from any table, for category-keyed lookups
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "category", content = "record", rename_all = "snake_case")]
pub enum PropertyRecord<'a> {
    CutMaterial(&'a ThermalProperties),
    StructuralMaterial(&'a MechanicalProperties),
    AssistGas(&'a GasProperties),
    LaserSource(&'a LaserProperties),
}

/// Result of a category-keyed lookup
#[derive(Debug, Clone, Serialize)]
pub struct PropertyLookup<'a> {
    pub category: Category,
    pub key: &'static str,
    pub requested: &'a str,
    pub used_default: bool,
    pub record: PropertyRecord<'a>,
}

/// All property tables
#[derive(Debug)]
pub struct DomainLibrary {
    pub cut_materials: Table<CutMaterial, ThermalProperties>,
    pub structural_materials: Table<StructuralMaterial, MechanicalProperties>,
    pub gases: Table<AssistGas, GasProperties>,
    pub lasers: Table<LaserSource, LaserProperties>,
}

static LIBRARY: Lazy<DomainLibrary> = Lazy::new(DomainLibrary::load);

impl DomainLibrary {
    /// Build every table from the bundled data
    pub fn load() -> Self {
        DomainLibrary {
            cut_materials: Table::build("cut_materials", CutMaterial::Aluminum6061, CutMaterial::properties),
            structural_materials: Table::build(
                "structural_materials",
                StructuralMaterial::Aluminum6061,
                StructuralMaterial::properties,
            ),
            gases: Table::build("assist_gases", AssistGas::Air, AssistGas::properties),
            lasers: Table::build("laser_sources", LaserSource::Fiber, LaserSource::properties),
        }
    }

    /// Process-wide shared instance, built on first use
    pub fn global() -> &'static DomainLibrary {
        &LIBRARY
    }

    /// Category-keyed lookup; unknown keys resolve to the table default
    pub fn lookup<'a>(&'a self, category: Category, key: &'a str) -> PropertyLookup<'a> {
        match category {
            Category::CutMaterial => {
                let r = self.cut_materials.resolve(key);
                PropertyLookup {
                    category,
                    key: r.key.key(),
                    requested: r.requested,
                    used_default: r.used_default,
                    record: PropertyRecord::CutMaterial(r.record),
                }
            }
            Category::StructuralMaterial => {
                let r = self.structural_materials.resolve(key);
                PropertyLookup {
                    category,
                    key: r.key.key(),
                    requested: r.requested,
                    used_default: r.used_default,
                    record: PropertyRecord::StructuralMaterial(r.record),
                }
            }
            Category::AssistGas => {
                let r = self.gases.resolve(key);
                PropertyLookup {
                    category,
                    key: r.key.key(),
                    requested: r.requested,
                    used_default: r.used_default,
                    record: PropertyRecord::AssistGas(r.record),
                }
            }
            Category::LaserSource => {
                let r = self.lasers.resolve(key);
                PropertyLookup {
                    category,
                    key: r.key.key(),
                    requested: r.requested,
                    used_default: r.used_default,
                    record: PropertyRecord::LaserSource(r.record),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_complete() {
        let lib = DomainLibrary::global();
        assert_eq!(lib.cut_materials.len(), CutMaterial::ALL.len());
        assert_eq!(lib.structural_materials.len(), StructuralMaterial::ALL.len());
        assert_eq!(lib.gases.len(), AssistGas::ALL.len());
        assert_eq!(lib.lasers.len(), LaserSource::ALL.len());
    }

    #[test]
    fn test_default_fallback_is_flagged() {
        let lib = DomainLibrary::global();
        let r = lib.structural_materials.resolve("vibranium");
        assert!(r.used_default);
        assert_eq!(r.key, StructuralMaterial::Aluminum6061);
        assert_eq!(r.requested, "vibranium");
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(CutMaterial::from_key("Stainless-Steel"), Some(CutMaterial::StainlessSteel));
        assert_eq!(AssistGas::from_key(" NITROGEN "), Some(AssistGas::Nitrogen));
        assert_eq!(LaserSource::from_key("nd yag"), Some(LaserSource::NdYag));
    }

    #[test]
    fn test_generic_lookup() {
        let lib = DomainLibrary::global();
        let found = lib.lookup(Category::AssistGas, "oxygen");
        assert_eq!(found.key, "oxygen");
        assert!(!found.used_default);
        assert!(matches!(found.record, PropertyRecord::AssistGas(_)));

        let fallback = lib.lookup(Category::LaserSource, "maser");
        assert_eq!(fallback.key, "fiber");
        assert!(fallback.used_default);
    }

    #[test]
    fn test_lookup_serializes() {
        let lib = DomainLibrary::global();
        let json = serde_json::to_string(&lib.lookup(Category::CutMaterial, "copper")).unwrap();
        assert!(json.contains("\"category\":\"cut_material\""));
        assert!(json.contains("\"used_default\":false"));
    }

    #[test]
    fn test_category_keys_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_str_flexible(category.key()), Some(category));
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(Category::from_str_flexible("gas"), Some(Category::AssistGas));
        assert_eq!(Category::from_str_flexible("structural-material"), Some(Category::StructuralMaterial));
        assert_eq!(Category::from_str_flexible("wood"), None);
    }

    #[test]
    fn test_library_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<DomainLibrary>();
    }
}

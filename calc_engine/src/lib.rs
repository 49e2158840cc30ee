//! # calc_engine - Laser Process Calculation Engine
//!
//! `calc_engine` estimates laser cutting outcomes (heat affected zone, power
//! and speed, edge quality, cost) and checks laser-cut architectural panels.
//! Every calculator is a pure function behind a common interface: inputs are
//! validated against declared fields, results come back as JSON with
//! metadata attached.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: calculators hold no state; the domain tables are
//!   immutable statics shared by every call
//! - **JSON-First**: inputs, results and errors all serialize
//! - **Rich Errors**: structured [`EngineError`] with stable error codes
//! - **Degrade, don't fail**: unknown material keys fall back to documented
//!   defaults and say so in the warnings
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_engine::{registry, InputRecord};
//!
//! let engine = registry::global();
//! let input = InputRecord::new()
//!     .with("material", "steel")
//!     .with("thickness", 5.0)
//!     .with("laser_power", 3000.0)
//!     .with("cutting_speed", 2000.0)
//!     .with("assist_gas", "oxygen");
//!
//! let result = engine.calculate("haz-analysis", &input).unwrap();
//! assert!(result.success);
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`registry`] - Calculator trait, registry, self-check
//! - [`calculations`] - The six built-in calculators
//! - [`fields`] / [`validation`] - Input declarations and checking
//! - [`compose`] - Result envelope and metadata
//! - [`scoring`] - Constraint filtering and weighted ranking
//! - [`materials`] - Cut materials, structural materials, gases, lasers
//! - [`equations`] / [`loads`] - Shared formulas and load combinations
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types
//! - [`settings`] / [`file_io`] - Configuration and file operations

pub mod calculations;
pub mod compose;
pub mod equations;
pub mod errors;
pub mod fields;
pub mod file_io;
pub mod loads;
pub mod materials;
pub mod registry;
pub mod scoring;
pub mod settings;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use compose::{Advisory, CalculationResult, Metadata};
pub use errors::{EngineError, EngineResult};
pub use fields::{FieldSpec, InputRecord};
pub use materials::DomainLibrary;
pub use registry::{Calculator, Registry};
pub use settings::EngineSettings;
pub use validation::{ValidationIssue, ValidationResult};

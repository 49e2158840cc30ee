//! # Shared Engineering Equations
//!
//! Closed-form formulas used by more than one calculator, kept in one place
//! so each can be checked against its reference in isolation.
//!
//! ## Modules
//!
//! - [`beam`]: simply supported strip under uniform load
//! - [`section`]: rectangular and perforated strip properties
//! - [`thermal`]: heat input, diffusion and temperature decay at a cut
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 8.1
//! - Steen & Mazumder, Laser Material Processing, 4th Edition, Ch. 4

pub mod beam;
pub mod section;
pub mod thermal;

pub use beam::{bending_stress, uniform_load_max_deflection, uniform_load_max_moment};
pub use section::SectionProperties;
pub use thermal::{diffusion_length, heat_input, interaction_time};

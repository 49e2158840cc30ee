//! # Engine Settings
//!
//! Runtime knobs shared by every calculator. Settings are plain data: the
//! host builds them (or loads them with [`crate::file_io::load_settings`])
//! and hands them to [`crate::registry::Registry::with_settings`].
//!
//! ## Example
//!
//! ```rust
//! use calc_engine::settings::EngineSettings;
//!
//! let settings: EngineSettings = serde_json::from_str(r#"{"slow_compute_ms": 50}"#).unwrap();
//! assert_eq!(settings.slow_compute_ms, 50);
//! assert_eq!(settings.fingerprint_len, 16); // omitted fields keep their defaults
//! ```

use serde::{Deserialize, Serialize};

/// Current schema version for settings and saved result files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Crate version reported in result metadata
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Schema version of the file these settings came from
    pub schema_version: String,

    /// Computations slower than this are logged at warn level (ms)
    pub slow_compute_ms: u64,

    /// Hex characters of the SHA-256 input digest kept in metadata
    pub fingerprint_len: usize,

    /// Convert calculator panics into failed results instead of unwinding
    pub catch_panics: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            schema_version: SCHEMA_VERSION.to_string(),
            slow_compute_ms: 100,
            fingerprint_len: 16,
            catch_panics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.slow_compute_ms, 100);
        assert_eq!(settings.fingerprint_len, 16);
        assert!(settings.catch_panics);
        assert_eq!(settings.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let settings: EngineSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, EngineSettings::default());
    }
}

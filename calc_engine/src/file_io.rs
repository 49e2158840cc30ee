//! # File I/O Module
//!
//! Reading inputs and settings, and saving results:
//! - **Atomic saves**: write to `.tmp`, sync, rename, so a crash never leaves
//!   a half-written result
//! - **Version validation**: settings and saved results carry a schema
//!   version that must be compatible with [`SCHEMA_VERSION`]
//!
//! Nothing here is used by the calculators themselves; the engine performs no
//! I/O during a calculation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calc_engine::file_io::{load_input, save_result, SavedResult};
//! use calc_engine::registry;
//! use std::path::Path;
//!
//! let input = load_input(Path::new("haz.json"))?;
//! let result = registry::global().calculate("haz-analysis", &input)?;
//!
//! let saved = SavedResult::new("haz-analysis", input, result);
//! save_result(&saved, Path::new("haz-result.json"))?;
//! # Ok::<(), calc_engine::errors::EngineError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compose::CalculationResult;
use crate::errors::{EngineError, EngineResult};
use crate::fields::InputRecord;
use crate::settings::{EngineSettings, SCHEMA_VERSION};

/// A calculation result as written to disk, with the input that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResult {
    pub schema_version: String,
    pub calculator_id: String,
    pub saved_at: DateTime<Utc>,
    pub input: InputRecord,
    pub result: CalculationResult,
}

impl SavedResult {
    pub fn new(calculator_id: impl Into<String>, input: InputRecord, result: CalculationResult) -> Self {
        SavedResult {
            schema_version: SCHEMA_VERSION.to_string(),
            calculator_id: calculator_id.into(),
            saved_at: Utc::now(),
            input,
            result,
        }
    }
}

fn read_to_string(path: &Path) -> EngineResult<String> {
    let mut file =
        File::open(path).map_err(|e| EngineError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| EngineError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Load an input record (a JSON object of field id → value).
///
/// Values are not validated here; pass the record to
/// [`crate::registry::Registry::validate`] or `calculate`.
pub fn load_input(path: &Path) -> EngineResult<InputRecord> {
    let contents = read_to_string(path)?;
    let input: InputRecord = serde_json::from_str(&contents)
        .map_err(|e| EngineError::serialization(format!("Invalid input JSON in {}: {}", path.display(), e)))?;
    debug!(path = %path.display(), fields = input.len(), "loaded input record");
    Ok(input)
}

/// Load engine settings. Omitted fields keep their defaults.
///
/// # Errors
///
/// * `EngineError::VersionMismatch` - `schema_version` is incompatible
/// * `EngineError::SerializationError` - invalid JSON
/// * `EngineError::FileError` - I/O error
pub fn load_settings(path: &Path) -> EngineResult<EngineSettings> {
    let contents = read_to_string(path)?;
    let settings: EngineSettings = serde_json::from_str(&contents)
        .map_err(|e| EngineError::serialization(format!("Invalid settings JSON in {}: {}", path.display(), e)))?;
    validate_version(&settings.schema_version)?;
    debug!(path = %path.display(), ?settings, "loaded settings");
    Ok(settings)
}

/// Save a result with atomic write semantics.
///
/// 1. Serialize to pretty JSON
/// 2. Write to `<path>.tmp`
/// 3. Sync to disk (fsync)
/// 4. Rename over `path`
pub fn save_result(saved: &SavedResult, path: &Path) -> EngineResult<()> {
    let json = serde_json::to_string_pretty(saved)?;
    write_atomic(path, json.as_bytes())?;
    debug!(path = %path.display(), calculator = %saved.calculator_id, "saved result");
    Ok(())
}

/// Load a saved result, checking its schema version.
pub fn load_result(path: &Path) -> EngineResult<SavedResult> {
    let contents = read_to_string(path)?;
    let saved: SavedResult = serde_json::from_str(&contents)
        .map_err(|e| EngineError::serialization(format!("Invalid result JSON in {}: {}", path.display(), e)))?;
    validate_version(&saved.schema_version)?;
    Ok(saved)
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> EngineResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        EngineError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file
        .write_all(bytes)
        .map_err(|e| EngineError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| EngineError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        EngineError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Check a file's schema version against [`SCHEMA_VERSION`].
///
/// Major versions must match. While the major version is 0, a file with a
/// newer minor version is also rejected.
pub fn validate_version(file_version: &str) -> EngineResult<()> {
    let mismatch = || EngineError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("calc_engine_test_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_result_save_and_load() {
        let path = temp_path("result");
        let registry = Registry::with_builtin();
        let input = registry.default_inputs("cutting-cost").unwrap();
        let result = registry.calculate("cutting-cost", &input).unwrap();

        let saved = SavedResult::new("cutting-cost", input.clone(), result.clone());
        save_result(&saved, &path).unwrap();

        let loaded = load_result(&path).unwrap();
        assert_eq!(loaded.calculator_id, "cutting-cost");
        assert_eq!(loaded.input, input);
        assert!(loaded.result.success);
        assert_eq!(
            loaded.result.data.as_ref().map(|d| d["material"].clone()),
            result.data.as_ref().map(|d| d["material"].clone())
        );
        assert_eq!(loaded.result.metadata.request_id, result.metadata.request_id);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_path("atomic");
        let registry = Registry::with_builtin();
        let input = registry.default_inputs("haz-analysis").unwrap();
        let result = registry.calculate("haz-analysis", &input).unwrap();
        save_result(&SavedResult::new("haz-analysis", input, result), &path).unwrap();

        assert!(path.exists());
        assert!(!tmp_path_for(&path).exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_tmp_path_keeps_extension() {
        let tmp = tmp_path_for(Path::new("/data/out.json"));
        assert_eq!(tmp, Path::new("/data/out.json.tmp"));
    }

    #[test]
    fn test_load_input() {
        let path = temp_path("input");
        fs::write(&path, r#"{"material": "steel", "thickness": 5}"#).unwrap();

        let input = load_input(&path).unwrap();
        assert_eq!(input.text("material").unwrap(), "steel");
        assert_eq!(input.number("thickness").unwrap(), 5.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_input_rejects_non_object() {
        let path = temp_path("bad_input");
        fs::write(&path, "[1, 2, 3]").unwrap();
        let err = load_input(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_settings_with_partial_file() {
        let path = temp_path("settings");
        fs::write(&path, r#"{"schema_version": "0.1.2", "slow_compute_ms": 25}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.slow_compute_ms, 25);
        assert_eq!(settings.fingerprint_len, 16);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_settings_rejects_newer_schema() {
        let path = temp_path("settings_new");
        fs::write(&path, r#"{"schema_version": "1.0.0"}"#).unwrap();
        let err = load_settings(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = load_input(Path::new("/nonexistent/calc_engine/input.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}

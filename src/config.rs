//! Editor configuration module.
//!
//! Handles loading, validating, and merging `retouch.toml`. The file is
//! sparse: stock defaults are the base layer and the user file only
//! overrides the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [history]
//! max_entries = 50          # Undo snapshots kept per session (1-1000)
//!
//! [mosaic]
//! block_size = 15           # Redaction tile edge in pixels (5-50)
//! brush_size = 40           # Brush radius in display pixels (10-100)
//!
//! [export]
//! format = "webp"           # png, jpg, webp, avif, bmp, gif
//! quality = 90              # Lossy quality (0-100)
//!
//! [filters]
//! intensity = 100           # Default preset strength in percent (10-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::mosaic::{BLOCK_SIZE_RANGE, BRUSH_SIZE_RANGE};
use crate::imaging::{ExportFormat, MosaicSettings, Quality};
use crate::presets::{DEFAULT_INTENSITY, INTENSITY_RANGE};
use crate::session::SessionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Upper bound for `history.max_entries`.
pub const MAX_HISTORY_ENTRIES: usize = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `retouch.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub mosaic: MosaicConfig,
    pub export: ExportConfig,
    pub filters: FiltersConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_HISTORY_ENTRIES).contains(&self.history.max_entries) {
            return Err(ConfigError::Validation(format!(
                "history.max_entries must be 1-{MAX_HISTORY_ENTRIES}"
            )));
        }
        check_range("mosaic.block_size", self.mosaic.block_size, BLOCK_SIZE_RANGE)?;
        check_range("mosaic.brush_size", self.mosaic.brush_size, BRUSH_SIZE_RANGE)?;
        if self.export.quality > 100 {
            return Err(ConfigError::Validation(
                "export.quality must be 0-100".into(),
            ));
        }
        check_range("filters.intensity", self.filters.intensity, INTENSITY_RANGE)?;
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_history: self.history.max_entries,
            mosaic: MosaicSettings::new(self.mosaic.block_size, self.mosaic.brush_size),
        }
    }

    pub fn export_quality(&self) -> Quality {
        Quality::new(self.export.quality)
    }
}

fn check_range(key: &str, value: u32, (min, max): (u32, u32)) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must be {min}-{max}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Undo snapshots kept per session; the oldest are evicted first.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: crate::history::DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MosaicConfig {
    pub block_size: u32,
    pub brush_size: u32,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        let settings = MosaicSettings::default();
        Self {
            block_size: settings.block_size(),
            brush_size: settings.brush_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Container used when neither the command line nor the output
    /// extension names one.
    pub format: ExportFormat,
    /// Lossy encoding quality (0 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            quality: Quality::default().value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    /// Preset strength in percent when a recipe does not give one.
    pub intensity: u32,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            intensity: DEFAULT_INTENSITY,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(EditorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EditorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file, or stock defaults when `path` is `None`.
///
/// A path that was given but cannot be read is an error.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    let overlay = match path {
        Some(p) => {
            let content = fs::read_to_string(p)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `retouch.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Retouch Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass the file with `retouch --config retouch.toml <command>`.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Undo history
# ---------------------------------------------------------------------------
[history]
# Adjustment snapshots kept per image (1-1000). The oldest are dropped first.
max_entries = 50

# ---------------------------------------------------------------------------
# Mosaic (redaction) tool
# ---------------------------------------------------------------------------
[mosaic]
# Edge length of each redaction tile, in image pixels (5-50).
block_size = 15

# Brush radius in display pixels (10-100).
brush_size = 40

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Default container: png, jpg, webp, avif, bmp or gif.
# gif is written as PNG.
format = "webp"

# Lossy encoding quality (0 = worst, 100 = best). Used by jpg and avif.
quality = 90

# ---------------------------------------------------------------------------
# Preset filters
# ---------------------------------------------------------------------------
[filters]
# Default preset strength in percent (10-100).
intensity = 100
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = EditorConfig::default();
        assert_eq!(config.history.max_entries, 50);
        assert_eq!(config.mosaic.block_size, 15);
        assert_eq!(config.mosaic.brush_size, 40);
        assert_eq!(config.export.format, ExportFormat::Webp);
        assert_eq!(config.export.quality, 90);
        assert_eq!(config.filters.intensity, 100);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[export]
format = "jpg"
"#;
        let config: EditorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.export.format, ExportFormat::Jpeg);
        // Defaults preserved
        assert_eq!(config.export.quality, 90);
        assert_eq!(config.mosaic.block_size, 15);
    }

    #[test]
    fn session_options_follow_config() {
        let config: EditorConfig = toml::from_str(
            r#"
[history]
max_entries = 7

[mosaic]
block_size = 20
brush_size = 12
"#,
        )
        .unwrap();
        let options = config.session_options();
        assert_eq!(options.max_history, 7);
        assert_eq!(options.mosaic.block_size(), 20);
        assert_eq!(options.mosaic.brush_size(), 12);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_without_path_is_default() {
        assert_eq!(load_config(None).unwrap(), EditorConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("retouch.toml");
        fs::write(
            &path,
            r#"
[export]
quality = 70

[filters]
intensity = 40
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.export.quality, 70);
        assert_eq!(config.filters.intensity, 40);
        assert_eq!(config.export.format, ExportFormat::Webp);
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("retouch.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[mosaic]
block_size = 15
brush_size = 40
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[mosaic]
block_size = 30
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let mosaic = merged.get("mosaic").unwrap();
        assert_eq!(mosaic.get("block_size").unwrap().as_integer(), Some(30));
        assert_eq!(mosaic.get("brush_size").unwrap().as_integer(), Some(40));
    }

    #[test]
    fn merge_toml_scalar_replaces() {
        let base: toml::Value = toml::from_str(r#"a = [1, 2]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"a = 3"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").unwrap().as_integer(), Some(3));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<EditorConfig, _> = toml::from_str("[export]\nqualty = 90\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<EditorConfig, _> = toml::from_str("[thumbnails]\nsize = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let result: Result<EditorConfig, _> = toml::from_str("[export]\nformat = \"tiff\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_bounds() {
        let cases = [
            "[history]\nmax_entries = 0",
            "[history]\nmax_entries = 1001",
            "[mosaic]\nblock_size = 4",
            "[mosaic]\nbrush_size = 101",
            "[export]\nquality = 101",
            "[filters]\nintensity = 5",
        ];
        for case in cases {
            let overlay: toml::Value = toml::from_str(case).unwrap();
            let result = resolve_config(stock_defaults_value(), Some(overlay));
            assert!(
                matches!(result, Err(ConfigError::Validation(_))),
                "{case} should fail validation"
            );
        }
    }

    #[test]
    fn validate_boundaries_accepted() {
        let overlay: toml::Value = toml::from_str(
            r#"
[history]
max_entries = 1000
[mosaic]
block_size = 5
brush_size = 100
[export]
quality = 0
[filters]
intensity = 10
"#,
        )
        .unwrap();
        assert!(resolve_config(stock_defaults_value(), Some(overlay)).is_ok());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: EditorConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[history]", "[mosaic]", "[export]", "[filters]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["history", "mosaic", "export", "filters"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}

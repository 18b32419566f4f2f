//! Analysis configuration loaded from TOML.
//!
//! Every field has a default, so an empty file and a missing file both
//! give [`AnalysisConfig::default()`].
//!
//! ```toml
//! formula_dir = "formulas"
//! domination_cp = 100
//!
//! [thresholds]
//! inaccuracy_cp = 50
//! mistake_cp = 100
//! blunder_cp = 200
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SeverityThresholds;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Threshold cutoffs are out of order.
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}

/// Settings for the move classifier and the formula evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Directory holding the `<index>.formula` files.
    pub formula_dir: PathBuf,
    /// Severity cutoffs.
    pub thresholds: SeverityThresholds,
    /// A side dominates a position when its best score exceeds this.
    pub domination_cp: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            formula_dir: PathBuf::from("formulas"),
            thresholds: SeverityThresholds::default(),
            domination_cp: 100,
        }
    }
}

impl AnalysisConfig {
    /// Loads the configuration from `path`.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] if it contains invalid TOML, or
    /// [`ConfigError::InvalidThresholds`] if the cutoffs are out of order.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses and validates a configuration held in memory.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.thresholds.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_valid_toml_config() {
        let toml_content = r#"
formula_dir = "/usr/share/review/formulas"
domination_cp = 150

[thresholds]
inaccuracy_cp = 20
mistake_cp = 50
blunder_cp = 150
very_good_depth = 12
"#;
        let config = AnalysisConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.formula_dir, PathBuf::from("/usr/share/review/formulas"));
        assert_eq!(config.domination_cp, 150);
        assert_eq!(config.thresholds.mistake_cp, 50);
        assert_eq!(config.thresholds.very_good_depth, 12);
        // Unset fields keep their defaults.
        assert_eq!(config.thresholds.blunder_mate, 10);
        assert_eq!(config.thresholds.good_depth, 5);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.formula_dir, PathBuf::from("formulas"));
        assert_eq!(config.thresholds.inaccuracy_cp, 50);
    }

    #[test]
    fn test_invalid_toml() {
        let result = AnalysisConfig::from_toml_str("domination_cp = \"lots\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_out_of_order_thresholds() {
        let result = AnalysisConfig::from_toml_str("[thresholds]\nmistake_cp = 300\n");
        assert!(matches!(result, Err(ConfigError::InvalidThresholds(_))));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::load(&dir.path().join("review.toml")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "domination_cp = 80").unwrap();
        let config = AnalysisConfig::load(file.path()).unwrap();
        assert_eq!(config.domination_cp, 80);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidThresholds("depth".to_string());
        assert!(format!("{}", err).contains("Invalid thresholds"));
    }
}

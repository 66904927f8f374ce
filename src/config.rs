//! Engine configuration.
//!
//! This module handles the `config.yaml` file in the data directory, which
//! stores user-level defaults for the engine. A missing file means
//! defaults; a file that exists but cannot be parsed is an error.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name within the data directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// User-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Default for the completion-reset flag UIs pass when copying a
    /// subtree into another partition. The flag on the operation itself
    /// stays explicit; this only seeds what callers offer.
    #[serde(default = "default_reset_completion_on_copy")]
    pub reset_completion_on_copy: bool,

    /// Whether mutating engine operations are appended to the debug
    /// operation log.
    #[serde(default)]
    pub debug_logging: bool,

    /// Override for the database location.
    /// None means the default path under the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

const fn default_reset_completion_on_copy() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reset_completion_on_copy: true,
            debug_logging: false,
            database_path: None,
        }
    }
}

impl EngineConfig {
    /// Load config from the data directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Option<Self>> {
        match crate::paths::data_dir() {
            Some(dir) => Self::load_from(&dir),
            None => Ok(None),
        }
    }

    /// Load config from a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(base_dir: &Path) -> Result<Option<Self>> {
        let config_path = base_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(config_path)?;
        Ok(Some(serde_yaml::from_str(&contents)?))
    }

    /// Load config from the data directory, falling back to defaults when
    /// the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default() -> Result<Self> {
        Ok(Self::load()?.unwrap_or_default())
    }

    /// Save config to a specific base directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(base_dir)?;
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(base_dir.join(CONFIG_FILE_NAME), contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.reset_completion_on_copy);
        assert!(!config.debug_logging);
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(EngineConfig::load_from(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            reset_completion_on_copy: false,
            debug_logging: true,
            database_path: Some(PathBuf::from("/tmp/custom.sqlite3")),
        };
        config.save_to(dir.path()).unwrap();

        let loaded = EngineConfig::load_from(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "debug_logging: true\n").unwrap();

        let loaded = EngineConfig::load_from(dir.path()).unwrap().unwrap();
        assert!(loaded.debug_logging);
        assert!(loaded.reset_completion_on_copy);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "debug_logging: [oops\n").unwrap();
        assert!(EngineConfig::load_from(dir.path()).is_err());
    }
}

//! Configuration for the vault location and task index ceilings.

use crate::error::{Result, ZettelError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default maximum number of tasks held by the index.
pub const DEFAULT_MAX_TASKS: usize = 100_000;

/// Default maximum number of notes tracked by the index.
pub const DEFAULT_MAX_NOTES: usize = 10_000;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "ZETTEL_CONFIG";

/// Environment variable that overrides the vault location.
pub const VAULT_ENV: &str = "ZETTEL_VAULT";

/// Environment variable holding a `tracing` filter for the binary.
pub const LOG_ENV: &str = "ZETTEL_LOG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default vault root.
    pub vault: Option<PathBuf>,
    /// Task index settings.
    pub index: IndexConfig,
}

/// Ceilings enforced by the task index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub max_tasks: usize,
    pub max_notes: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_tasks: DEFAULT_MAX_TASKS,
            max_notes: DEFAULT_MAX_NOTES,
        }
    }
}

impl Config {
    /// Load configuration from `$ZETTEL_CONFIG` or the platform config
    /// directory. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ZettelError::io(path, e))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Location of the config file, if one can be determined.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("zettel").join("config.toml"))
    }

    /// Resolve the vault root: flag, then `$ZETTEL_VAULT`, then config.
    pub fn resolve_vault_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(VAULT_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        self.vault.clone().ok_or(ZettelError::NoVaultConfigured)
    }

    fn validate(&self) -> Result<()> {
        if self.index.max_tasks == 0 {
            return Err(ZettelError::Config(
                "index.max_tasks must be greater than zero".to_string(),
            ));
        }
        if self.index.max_notes == 0 {
            return Err(ZettelError::Config(
                "index.max_notes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

//! Error types and exit codes for zettel.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes used by the `zettel` binary.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const VAULT_NOT_FOUND: i32 = 2;
    pub const INDEX_UNAVAILABLE: i32 = 3;
    pub const CAPACITY_EXCEEDED: i32 = 4;
    pub const INVALID_CONFIG: i32 = 5;
}

/// Which index ceiling was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    Tasks,
    Notes,
}

impl std::fmt::Display for Ceiling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ceiling::Tasks => f.write_str("task"),
            Ceiling::Notes => f.write_str("tracked note"),
        }
    }
}

/// Main error type for zettel operations.
#[derive(Error, Debug)]
pub enum ZettelError {
    #[error("Task index is not available")]
    Unavailable,

    #[error("Task index has been closed")]
    Closed,

    #[error("Task index {what} ceiling exceeded: {actual} > {limit}")]
    CapacityExceeded {
        what: Ceiling,
        limit: usize,
        actual: usize,
    },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file disappeared between being queued and being read.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Vault not found at: {0}")]
    VaultNotFound(PathBuf),

    #[error("No vault configured (use --vault, ZETTEL_VAULT or the config file)")]
    NoVaultConfigured,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl ZettelError {
    /// Wrap an IO error with the path it happened at. A missing file becomes
    /// [`ZettelError::NotFound`] so callers can tell a vanished file apart.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ZettelError::NotFound(path)
        } else {
            ZettelError::Io { path, source }
        }
    }

    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ZettelError::VaultNotFound(_) | ZettelError::NoVaultConfigured => {
                exit_code::VAULT_NOT_FOUND
            }
            ZettelError::Unavailable | ZettelError::Closed => exit_code::INDEX_UNAVAILABLE,
            ZettelError::CapacityExceeded { .. } => exit_code::CAPACITY_EXCEEDED,
            ZettelError::Config(_) | ZettelError::TomlParse(_) => exit_code::INVALID_CONFIG,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for zettel operations.
pub type Result<T> = std::result::Result<T, ZettelError>;

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    GeneralError,
}

impl ExitCode {
    /// Convert to exit code integer.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => exit_code::SUCCESS,
            ExitCode::GeneralError => exit_code::GENERAL_ERROR,
        }
    }
}

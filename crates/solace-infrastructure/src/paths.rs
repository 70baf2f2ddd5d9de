//! Unified path management for Solace files.
//!
//! Platform directories come from the `dirs` crate. A base directory can be
//! supplied instead, in which case everything lives under it (used by tests
//! and the `--home` flag of the REPL).

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

const APP_DIR: &str = "solace";

/// Path resolver for Solace.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/solace/            # Config directory
/// └── config.toml              # Engine configuration
///
/// ~/.local/share/solace/       # Data directory
/// ├── store/                   # Durable key/value store, one JSON file per key
/// └── logs/                    # Application logs
///     └── solace.log.YYYY-MM-DD
/// ```
///
/// With a base directory, `config.toml`, `store/` and `logs/` all sit directly
/// under it.
#[derive(Debug, Clone, Default)]
pub struct SolacePaths {
    base: Option<PathBuf>,
}

impl SolacePaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the data directory (store and logs).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the directory that backs the durable store.
    pub fn store_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("store"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}

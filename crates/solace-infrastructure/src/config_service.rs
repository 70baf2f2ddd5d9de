//! Configuration service implementation.
//!
//! Loads the engine configuration from `config.toml` (by default
//! `~/.config/solace/config.toml`) and caches it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use solace_core::config::EngineConfig;
use solace_core::error::{Result, SolaceError};

use crate::paths::SolacePaths;

/// Configuration service that loads and caches the engine configuration.
///
/// A missing file is created with the defaults. A file that cannot be read or
/// parsed is logged and replaced by the defaults in memory; it is not
/// overwritten, so the user can fix it.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<EngineConfig>>>,
}

impl ConfigService {
    /// Creates a service for the config file under `paths`.
    pub fn new(paths: &SolacePaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| SolaceError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service for an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> EngineConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load_config();

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn load_config(&self) -> EngineConfig {
        match fs::read_to_string(&self.path) {
            Ok(source) => match EngineConfig::from_toml_str(&source) {
                Ok(config) => {
                    tracing::debug!(path = %self.path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Invalid configuration, using defaults");
                    EngineConfig::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = EngineConfig::default();
                if let Err(e) = self.write_default(&config) {
                    tracing::warn!(path = %self.path.display(), error = %e, "Could not create default configuration");
                }
                config
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable configuration, using defaults");
                EngineConfig::default()
            }
        }
    }

    fn write_default(&self, config: &EngineConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, config.to_toml_string()?)?;
        tracing::info!(path = %self.path.display(), "Created default configuration");
        Ok(())
    }
}

//! Configuration loading.
//!
//! Reads [`AppConfig`] from `~/.config/tallyup/config.toml`. A missing file
//! yields the defaults; a malformed one is reported, not ignored.

use std::path::{Path, PathBuf};

use tallyup_core::config::AppConfig;
use tallyup_core::error::{Result, TallyError};

use crate::paths::TallyPaths;

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the platform config file location.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: TallyPaths::config_file()?,
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", self.path);
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            TallyError::config(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            TallyError::config(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Loads from the platform location, or the defaults when the platform
    /// has no config directory (e.g. `HOME` unset).
    pub fn load_platform() -> Result<AppConfig> {
        Self::load_or_default(Self::new())
    }

    fn load_or_default(service: Result<Self>) -> Result<AppConfig> {
        match service {
            Ok(service) => service.load(),
            Err(e) => {
                tracing::debug!("{}, using default config", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Directory the ledger lives in: configured value or platform default.
    pub fn resolve_data_dir(config: &AppConfig) -> Result<PathBuf> {
        match &config.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => TallyPaths::data_dir(),
        }
    }
}

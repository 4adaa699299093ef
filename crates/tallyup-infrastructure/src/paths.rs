//! Path resolution for tallyup files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tallyup/           # Config directory
//! └── config.toml              # AppConfig
//!
//! ~/.local/share/tallyup/      # Data directory (unless overridden)
//! ├── ledger.toml              # Groups, expenses, settlements
//! └── ledger.lock              # Writer lock
//! ```

use std::path::PathBuf;

use tallyup_core::error::{Result, TallyError};

const APP_DIR: &str = "tallyup";

pub struct TallyPaths;

impl TallyPaths {
    /// Returns the tallyup configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| TallyError::config("cannot determine config directory"))
    }

    /// Returns the default data directory holding the ledger.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| TallyError::config("cannot determine data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

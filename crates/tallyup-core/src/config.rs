use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration loaded from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding the ledger file. Platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Default tracing filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig =
            toml::from_str("data_dir = \"/tmp/tally\"\nlog_level = \"debug\"\n").unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/tally")));
        assert_eq!(config.log_level, "debug");
    }
}

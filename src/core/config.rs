//! Catalog configuration loaded from `.catalog/catalog.toml`.

use crate::core::error::CatalogError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "catalog.toml";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Database file name inside the store root.
    pub db_name: String,
    /// Office used when `--office` is not given.
    pub default_office: Option<String>,
    pub busy_timeout_secs: u64,
    /// Append one audit line per broker operation.
    pub audit: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_name: schemas::CATALOG_DB_NAME.to_string(),
            default_office: None,
            busy_timeout_secs: 5,
            audit: true,
        }
    }
}

impl CatalogConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

pub fn parse_config(content: &str) -> Result<CatalogConfig, CatalogError> {
    toml::from_str(content).map_err(|e| CatalogError::ConfigError(e.to_string()))
}

/// Load config from an explicit file, or from `<store_root>/catalog.toml`.
///
/// An explicit path must exist. The implicit file is optional; without it the
/// defaults apply.
pub fn load_config(store_root: &Path, explicit: Option<&Path>) -> Result<CatalogConfig, CatalogError> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        return parse_config(&content);
    }

    let config_path = store_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(CatalogError::IoError)?;
        return parse_config(&content);
    }

    Ok(CatalogConfig::default())
}

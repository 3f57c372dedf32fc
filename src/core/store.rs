//! Store handle for the catalog's on-disk state.

use crate::core::config::{self, CatalogConfig};
use crate::core::error::CatalogError;
use std::path::{Path, PathBuf};

/// Directory under the project root that holds the database, config and audit log.
pub const STORE_DIR_NAME: &str = ".catalog";

/// A Store is the directory holding the catalog database and its audit log,
/// together with the configuration that governs access to it.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the store root directory
    pub root: PathBuf,
    pub config: CatalogConfig,
}

impl Store {
    pub fn new(root: PathBuf, config: CatalogConfig) -> Self {
        Self { root, config }
    }

    /// Resolve `<project_root>/.catalog` and load its configuration.
    pub fn open(project_root: &Path, config_path: Option<&Path>) -> Result<Self, CatalogError> {
        let root = project_root.join(STORE_DIR_NAME);
        let config = config::load_config(&root, config_path)?;
        Ok(Self { root, config })
    }
}

use std::path::{Path, PathBuf};

use maptile_shared::{MaptileError, MaptileResult};

/// Directory structure constants
pub mod dirs {
    /// Configuration directory
    pub const CONFIG_DIR: &str = "config";

    /// Downloaded data and scratch space
    pub const DATA_DIR: &str = "data";

    /// Temporary downloads, inside the data directory
    pub const TEMP_DIR: &str = "tmp";
}

/// File naming patterns
pub mod filenames {
    pub const CONFIG_FILE: &str = "config.yaml";
    pub const CONFIG_TEMPLATE: &str = "config.example.yaml";
    pub const ENV_FILE: &str = ".env";
    pub const ENV_TEMPLATE: &str = ".env.example";
}

// ============================================================================
// PROJECT LAYOUT (one downloader deployment)
// ============================================================================

/// Filesystem layout of a downloader project directory.
///
/// ```text
/// {root}/
/// ├── config/
/// │   ├── config.example.yaml   # packaged template
/// │   └── config.yaml           # created once by bootstrap
/// ├── data/                     # opened up to 0777 by bootstrap
/// │   └── tmp/
/// ├── .env.example              # packaged template
/// └── .env                      # created once by bootstrap
/// ```
#[derive(Clone, Debug)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(dirs::CONFIG_DIR)
    }

    /// Downloader configuration: {root}/config/config.yaml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join(filenames::CONFIG_FILE)
    }

    pub fn config_template(&self) -> PathBuf {
        self.config_dir().join(filenames::CONFIG_TEMPLATE)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(dirs::DATA_DIR)
    }

    /// Temporary downloads: {root}/data/tmp
    pub fn temp_dir(&self) -> PathBuf {
        self.data_dir().join(dirs::TEMP_DIR)
    }

    /// Process environment overrides: {root}/.env
    pub fn env_file(&self) -> PathBuf {
        self.root.join(filenames::ENV_FILE)
    }

    pub fn env_template(&self) -> PathBuf {
        self.root.join(filenames::ENV_TEMPLATE)
    }

    /// Create the configuration and temporary-data directories.
    ///
    /// Existing directories are left as they are.
    pub fn prepare(&self) -> MaptileResult<()> {
        std::fs::create_dir_all(self.config_dir())
            .map_err(|e| MaptileError::Storage(format!("failed to create config dir: {e}")))?;

        std::fs::create_dir_all(self.temp_dir())
            .map_err(|e| MaptileError::Storage(format!("failed to create temp dir: {e}")))?;

        Ok(())
    }
}

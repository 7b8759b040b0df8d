//! Type definitions for the readiness pipeline.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use maptile_shared::constants::{defaults, storage};
use maptile_shared::{MaptileError, MaptileResult};
use tempfile::TempPath;

use crate::settings::StorageSettings;
use crate::storage::{AliasRegistry, HealthProbe, ObjectStore, StoreConnector};

/// Outcome of a successful readiness check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadinessReport {
    /// The alias was registered by this run (it did not exist before).
    pub alias_registered: bool,
    /// Bucket contents observed right after the smoke-test upload.
    pub listing: Vec<String>,
    /// Non-fatal problems (listing or cleanup failures).
    pub warnings: Vec<String>,
}

/// Readiness pipeline context.
///
/// Inputs are set at construction; steps fill in `store`, `smoke_file` and
/// `report` as they go.
pub struct ReadinessContext {
    pub settings: StorageSettings,
    pub probe: Box<dyn HealthProbe>,
    pub aliases: AliasRegistry,
    pub connector: Box<dyn StoreConnector>,
    pub scratch_dir: PathBuf,
    /// Deadline for each listing and cleanup call.
    pub call_timeout: Duration,

    pub store: Option<Arc<dyn ObjectStore>>,
    pub smoke_file: Option<SmokeFile>,
    pub report: ReadinessReport,
}

impl ReadinessContext {
    pub fn new(
        settings: StorageSettings,
        probe: Box<dyn HealthProbe>,
        aliases: AliasRegistry,
        connector: Box<dyn StoreConnector>,
    ) -> Self {
        Self {
            settings,
            probe,
            aliases,
            connector,
            scratch_dir: std::env::temp_dir(),
            call_timeout: Duration::from_secs(defaults::STEP_TIMEOUT_SECS),
            store: None,
            smoke_file: None,
            report: ReadinessReport::default(),
        }
    }

    /// The connected store; the bucket step must have run.
    pub fn store(&self) -> MaptileResult<Arc<dyn ObjectStore>> {
        self.store
            .clone()
            .ok_or_else(|| MaptileError::Internal("bucket step must run first".into()))
    }
}

/// Local smoke-test file.
///
/// Created exclusively under a random name in the scratch directory and
/// removed when dropped. Uploaded under the fixed key [`SmokeFile::key`].
#[derive(Debug)]
pub struct SmokeFile {
    path: TempPath,
}

impl SmokeFile {
    /// Write the literal smoke-test content into a new file in `dir`.
    pub fn write(dir: &Path) -> MaptileResult<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            MaptileError::Storage(format!("failed to create {}: {e}", dir.display()))
        })?;

        let mut file = tempfile::Builder::new()
            .prefix("readiness-check")
            .suffix(".txt")
            .tempfile_in(dir)
            .map_err(|e| {
                MaptileError::Storage(format!(
                    "failed to create smoke-test file in {}: {e}",
                    dir.display()
                ))
            })?;

        let written = file
            .write_all(storage::SMOKE_CONTENT.as_bytes())
            .and_then(|_| file.flush());
        if let Err(e) = written {
            return Err(MaptileError::Storage(format!(
                "failed to write {}: {e}",
                file.path().display()
            )));
        }

        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Object key the file is uploaded under.
    pub fn key(&self) -> &'static str {
        storage::SMOKE_OBJECT
    }

    /// Delete the file now, reporting failure. An already missing file is
    /// not an error.
    pub fn remove(self) -> std::io::Result<()> {
        match self.path.close() {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

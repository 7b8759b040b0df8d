//! Downloader configuration document: load, rewrite storage fields, save.
//!
//! The bootstrap workflow parses the packaged template into [`AppConfig`],
//! assigns the storage destination fields from [`StorageSettings`], validates
//! and serializes the result. No line-based text substitution is involved.

mod document;
mod validate;

pub use document::{
    AppConfig, Bounds, Destination, GlobalConfig, IpPoolConfig, MbtilesConfig, MinioDestination,
    OutputConfig, SourceConfig, StrategyConfig,
};

use std::path::Path;

use maptile_shared::{MaptileError, MaptileResult};

use crate::settings::StorageSettings;
use crate::util::write_atomic;

impl AppConfig {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> MaptileResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MaptileError::Config(format!(
                "failed to read configuration {}: {e}",
                path.display()
            ))
        })?;

        Self::from_yaml_str(&text).map_err(|e| match e {
            MaptileError::Config(msg) => {
                MaptileError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_yaml_str(text: &str) -> MaptileResult<Self> {
        serde_yaml::from_str(text).map_err(|e| MaptileError::Config(format!("invalid YAML: {e}")))
    }

    pub fn to_yaml_string(&self) -> MaptileResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| MaptileError::Internal(format!("failed to serialize configuration: {e}")))
    }

    /// Serialize and write atomically to `path`.
    pub fn save(&self, path: &Path) -> MaptileResult<()> {
        let text = self.to_yaml_string()?;
        write_atomic(path, text.as_bytes())
    }

    /// Point every MinIO destination at the configured storage service.
    ///
    /// Appends a MinIO destination when the document has none. Fails if the
    /// settings are invalid (e.g. an empty bucket name).
    pub fn apply_storage(&mut self, settings: &StorageSettings) -> MaptileResult<()> {
        settings.validate()?;

        let endpoint = settings.host_port()?;
        let secure = settings.is_secure()?;

        let mut applied = 0usize;
        for destination in &mut self.output.destinations {
            if let Destination::Minio(minio) = destination {
                minio.endpoint = endpoint.clone();
                minio.secure = secure;
                minio.access_key = settings.access_key.clone();
                minio.secret_key = settings.secret_key.clone();
                minio.bucket_name = settings.bucket.clone();
                applied += 1;
            }
        }

        if applied == 0 {
            tracing::debug!("Configuration has no MinIO destination, appending one");
            self.output
                .destinations
                .push(Destination::Minio(MinioDestination {
                    endpoint,
                    secure,
                    access_key: settings.access_key.clone(),
                    secret_key: settings.secret_key.clone(),
                    bucket_name: settings.bucket.clone(),
                    region: None,
                }));
            applied = 1;
        }

        tracing::debug!(
            destinations = applied,
            bucket = %settings.bucket,
            "Applied storage settings to configuration"
        );
        Ok(())
    }

    /// MinIO destinations in document order.
    pub fn minio_destinations(&self) -> impl Iterator<Item = &MinioDestination> {
        self.output.destinations.iter().filter_map(|d| match d {
            Destination::Minio(m) => Some(m),
            Destination::Local { .. } => None,
        })
    }
}

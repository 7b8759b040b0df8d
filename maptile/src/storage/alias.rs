//! Storage client alias registry.
//!
//! Aliases are kept in the MinIO client's JSON configuration so that `mc`
//! and this tool share them:
//!
//! ```json
//! { "version": "10",
//!   "aliases": { "local": { "url": "http://localhost:9000", "accessKey": "...",
//!                           "secretKey": "...", "api": "s3v4", "path": "auto" } } }
//! ```
//!
//! Entries and top-level keys this tool does not know about are preserved.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use maptile_shared::{MaptileError, MaptileResult};
use serde::{Deserialize, Serialize};

use crate::settings::StorageSettings;
use crate::util::write_atomic;

const FILE_VERSION: &str = "10";

/// Endpoint and credentials registered under an alias name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub url: String,

    #[serde(rename = "accessKey")]
    pub access_key: String,

    #[serde(rename = "secretKey")]
    pub secret_key: String,

    #[serde(default = "default_api")]
    pub api: String,

    #[serde(default = "default_path")]
    pub path: String,
}

fn default_api() -> String {
    "s3v4".to_string()
}

fn default_path() -> String {
    "auto".to_string()
}

impl AliasEntry {
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self {
            url: settings.endpoint.clone(),
            access_key: settings.access_key.clone(),
            secret_key: settings.secret_key.clone(),
            api: default_api(),
            path: default_path(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AliasFile {
    #[serde(default = "default_version")]
    version: String,

    #[serde(default)]
    aliases: BTreeMap<String, AliasEntry>,

    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

fn default_version() -> String {
    FILE_VERSION.to_string()
}

impl Default for AliasFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            aliases: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// File-backed alias registry.
#[derive(Clone, Debug)]
pub struct AliasRegistry {
    path: PathBuf,
}

impl AliasRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The MinIO client's default location: `~/.mc/config.json`.
    pub fn default_path() -> MaptileResult<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".mc").join("config.json"))
            .ok_or_else(|| {
                MaptileError::Config("cannot determine home directory for alias file".into())
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All registered aliases. A missing file means none.
    pub fn list(&self) -> MaptileResult<BTreeMap<String, AliasEntry>> {
        Ok(self.read()?.aliases)
    }

    pub fn get(&self, name: &str) -> MaptileResult<Option<AliasEntry>> {
        Ok(self.read()?.aliases.remove(name))
    }

    /// Register `entry` under `name` unless that name is already taken.
    ///
    /// Returns `true` if the alias was added. An existing alias is never
    /// overwritten.
    pub fn register(&self, name: &str, entry: AliasEntry) -> MaptileResult<bool> {
        let mut file = self.read()?;

        if let Some(existing) = file.aliases.get(name) {
            if existing.url != entry.url {
                tracing::warn!(
                    alias = name,
                    registered = %existing.url,
                    configured = %entry.url,
                    "Alias already registered with a different URL, keeping it"
                );
            } else {
                tracing::debug!(alias = name, "Alias already registered");
            }
            return Ok(false);
        }

        tracing::info!(alias = name, url = %entry.url, path = %self.path.display(), "Registering alias");
        file.aliases.insert(name.to_string(), entry);
        self.write(&file)?;
        Ok(true)
    }

    fn read(&self) -> MaptileResult<AliasFile> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AliasFile::default()),
            Err(e) => {
                return Err(MaptileError::Config(format!(
                    "failed to read alias file {}: {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&text).map_err(|e| {
            MaptileError::Config(format!(
                "invalid alias file {}: {e}",
                self.path.display()
            ))
        })
    }

    fn write(&self, file: &AliasFile) -> MaptileResult<()> {
        let text = serde_json::to_string_pretty(file)
            .map_err(|e| MaptileError::Internal(format!("failed to serialize aliases: {e}")))?;
        write_atomic(&self.path, text.as_bytes())
    }
}

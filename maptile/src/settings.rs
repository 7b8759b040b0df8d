//! Storage settings.
//!
//! Resolved once at process start from environment lookups with documented
//! fallbacks, then passed explicitly to every workflow step.

use std::path::Path;

use maptile_shared::constants::{defaults, envs, storage};
use maptile_shared::{MaptileError, MaptileResult};
use reqwest::Url;

/// Endpoint, credentials and target bucket of the object storage service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageSettings {
    /// Service URL, e.g. `http://localhost:9000`.
    pub endpoint: String,
    /// Access key (the service's root username).
    pub access_key: String,
    /// Secret key (the service's root password).
    pub secret_key: String,
    /// Target bucket.
    pub bucket: String,
    /// Name under which the storage client knows this service.
    pub alias: String,
    pub region: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            endpoint: defaults::ENDPOINT.to_string(),
            access_key: defaults::ROOT_USER.to_string(),
            secret_key: defaults::ROOT_PASSWORD.to_string(),
            bucket: defaults::BUCKET.to_string(),
            alias: defaults::ALIAS.to_string(),
            region: defaults::REGION.to_string(),
        }
    }
}

/// Explicit values that take precedence over the environment.
#[derive(Clone, Debug, Default)]
pub struct SettingsOverrides {
    pub endpoint: Option<String>,
    pub bucket: Option<String>,
    pub alias: Option<String>,
}

impl StorageSettings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> MaptileResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through `lookup`.
    ///
    /// Unset and empty variables fall back to the defaults. The bucket
    /// variable holds a list; its first non-empty entry is the target.
    pub fn from_lookup<F>(lookup: F) -> MaptileResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str, fallback: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        let bucket = lookup(envs::DEFAULT_BUCKETS)
            .and_then(|list| first_bucket(&list))
            .unwrap_or_else(|| defaults::BUCKET.to_string());

        let settings = Self {
            endpoint: value(envs::ENDPOINT, defaults::ENDPOINT),
            access_key: value(envs::ROOT_USER, defaults::ROOT_USER),
            secret_key: value(envs::ROOT_PASSWORD, defaults::ROOT_PASSWORD),
            bucket,
            alias: value(envs::ALIAS, defaults::ALIAS),
            region: value(envs::REGION, defaults::REGION),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Apply explicit overrides and re-validate.
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> MaptileResult<Self> {
        if let Some(endpoint) = overrides.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(bucket) = overrides.bucket {
            self.bucket = bucket;
        }
        if let Some(alias) = overrides.alias {
            self.alias = alias;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> MaptileResult<()> {
        self.endpoint_url()?;
        validate_bucket_name(&self.bucket)?;

        if self.access_key.is_empty() {
            return Err(MaptileError::Config("access key must not be empty".into()));
        }
        if self.secret_key.is_empty() {
            return Err(MaptileError::Config("secret key must not be empty".into()));
        }
        if self.alias.trim().is_empty() {
            return Err(MaptileError::Config("alias name must not be empty".into()));
        }
        Ok(())
    }

    pub fn endpoint_url(&self) -> MaptileResult<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| {
            MaptileError::Config(format!("invalid endpoint '{}': {e}", self.endpoint))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(MaptileError::Config(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }
        if url.host_str().is_none() {
            return Err(MaptileError::Config(format!(
                "endpoint '{}' has no host",
                self.endpoint
            )));
        }
        Ok(url)
    }

    /// `host[:port]` form used by the downloader's configuration document.
    pub fn host_port(&self) -> MaptileResult<String> {
        let url = self.endpoint_url()?;
        let host = url.host_str().unwrap_or_default();
        Ok(match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    pub fn is_secure(&self) -> MaptileResult<bool> {
        Ok(self.endpoint_url()?.scheme() == "https")
    }

    /// Liveness endpoint of the service, below any path the endpoint has.
    pub fn health_url(&self) -> MaptileResult<Url> {
        let mut base = self.endpoint_url()?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(storage::HEALTH_LIVE_PATH.trim_start_matches('/'))
            .map_err(|e| MaptileError::Config(format!("invalid health URL: {e}")))
    }
}

/// Load variables from an environment file, if it exists.
///
/// Variables already present in the process environment are kept.
pub fn load_env_file(path: &Path) -> MaptileResult<bool> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No environment file");
        return Ok(false);
    }

    dotenvy::from_path(path).map_err(|e| {
        MaptileError::Config(format!(
            "failed to load environment file {}: {e}",
            path.display()
        ))
    })?;

    tracing::debug!(path = %path.display(), "Loaded environment file");
    Ok(true)
}

fn first_bucket(list: &str) -> Option<String> {
    list.split(',')
        .map(str::trim)
        .find(|b| !b.is_empty())
        .map(str::to_string)
}

/// Check S3 bucket naming rules: 3-63 chars of lowercase letters, digits,
/// `-` and `.`, starting and ending with a letter or digit.
pub fn validate_bucket_name(name: &str) -> MaptileResult<()> {
    if name.is_empty() {
        return Err(MaptileError::Config("bucket name must not be empty".into()));
    }

    let valid_len = (3..=63).contains(&name.len());
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_edges = name
        .chars()
        .next()
        .zip(name.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if !(valid_len && valid_chars && valid_edges) {
        return Err(MaptileError::Config(format!(
            "invalid bucket name '{name}'"
        )));
    }
    Ok(())
}

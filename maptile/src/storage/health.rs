//! HTTP liveness probe.

use std::time::Duration;

use async_trait::async_trait;
use maptile_shared::{MaptileError, MaptileResult};
use reqwest::Url;

use super::HealthProbe;
use crate::settings::StorageSettings;

/// Probes `{endpoint}/minio/health/live`.
///
/// The client carries an explicit timeout so a hung service fails the
/// probe instead of blocking the check.
#[derive(Clone, Debug)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    url: Url,
}

impl HttpHealthProbe {
    pub fn new(settings: &StorageSettings, timeout: Duration) -> MaptileResult<Self> {
        let url = settings.health_url()?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| MaptileError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn probe(&self) -> MaptileResult<()> {
        tracing::debug!(url = %self.url, "Probing storage liveness");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| MaptileError::Unavailable(format!("{} did not respond: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MaptileError::Unavailable(format!(
                "{} returned {status}",
                self.url
            )));
        }

        tracing::debug!(url = %self.url, %status, "Storage is live");
        Ok(())
    }

    fn target(&self) -> String {
        self.url.to_string()
    }
}

//! S3 API client for MinIO and other S3-compatible services.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use maptile_shared::{MaptileError, MaptileResult};

use super::{AliasEntry, ObjectStore, StoreConnector};

/// [`ObjectStore`] backed by the AWS SDK.
///
/// Uses path-style addressing, which MinIO requires unless virtual-host
/// buckets are configured.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    /// Create a client for `alias` with static credentials.
    pub async fn connect(alias: &AliasEntry, region: &str) -> MaptileResult<Self> {
        if alias.api != "s3v4" {
            tracing::warn!(api = %alias.api, "Alias uses a non-s3v4 signature, using s3v4 anyway");
        }

        let credentials = Credentials::new(
            &alias.access_key,
            &alias.secret_key,
            None,
            None,
            "maptile-alias",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.to_string()))
            .endpoint_url(alias.url.clone())
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: S3Client::from_conf(s3_config),
        })
    }

    /// Wrap a pre-configured client.
    pub fn from_client(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_buckets(&self) -> MaptileResult<Vec<String>> {
        let output = self.client.list_buckets().send().await.map_err(|e| {
            MaptileError::Operation(format!("list buckets: {}", DisplayErrorContext(&e)))
        })?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> MaptileResult<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                MaptileError::Operation(format!(
                    "put {bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::debug!(bucket, key, size, "Uploaded object");
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> MaptileResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| {
                    MaptileError::Operation(format!(
                        "list objects in {bucket}: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|o| o.key().map(str::to_string)),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> MaptileResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                MaptileError::Operation(format!(
                    "delete {bucket}/{key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::debug!(bucket, key, "Deleted object");
        Ok(())
    }
}

/// Connects [`S3ObjectStore`]s from aliases.
#[derive(Clone, Debug, Default)]
pub struct S3Connector;

#[async_trait]
impl StoreConnector for S3Connector {
    async fn connect(
        &self,
        alias: &AliasEntry,
        region: &str,
    ) -> MaptileResult<Arc<dyn ObjectStore>> {
        let store = S3ObjectStore::connect(alias, region).await?;
        Ok(Arc::new(store))
    }
}

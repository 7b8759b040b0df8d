//! Object storage seams.
//!
//! The readiness check talks to the storage service through three traits so
//! that each step can be exercised against fakes:
//!
//! - [`HealthProbe`]: liveness gate (HTTP in production)
//! - [`StoreConnector`]: turns a registered alias into an [`ObjectStore`]
//! - [`ObjectStore`]: bucket and object operations (S3 API in production)

pub mod alias;
pub mod health;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use maptile_shared::MaptileResult;

pub use alias::{AliasEntry, AliasRegistry};
pub use health::HttpHealthProbe;
pub use s3::{S3Connector, S3ObjectStore};

/// Liveness check of the storage service.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// `Ok` when the service reports itself live.
    async fn probe(&self) -> MaptileResult<()>;

    /// Human-readable probe target, for logs and messages.
    fn target(&self) -> String;
}

/// Bucket and object operations against one storage service.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_buckets(&self) -> MaptileResult<Vec<String>>;

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> MaptileResult<()>;

    /// Keys of all objects in `bucket`.
    async fn list_objects(&self, bucket: &str) -> MaptileResult<Vec<String>>;

    async fn delete_object(&self, bucket: &str, key: &str) -> MaptileResult<()>;
}

/// Builds an [`ObjectStore`] from a registered alias.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, alias: &AliasEntry, region: &str)
    -> MaptileResult<Arc<dyn ObjectStore>>;
}

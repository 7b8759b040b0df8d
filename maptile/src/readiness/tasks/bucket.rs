//! Task: Bucket existence check.
//!
//! Connects through the registered alias and looks the target bucket up in
//! the bucket listing. A missing bucket is reported, never created.

use async_trait::async_trait;
use maptile_shared::{MaptileError, MaptileResult};

use crate::pipeline::PipelineTask;
use crate::readiness::ReadinessContext;

pub struct BucketTask;

#[async_trait]
impl PipelineTask<ReadinessContext> for BucketTask {
    async fn run(&self, ctx: &mut ReadinessContext) -> MaptileResult<()> {
        let alias = &ctx.settings.alias;
        let entry = ctx.aliases.get(alias)?.ok_or_else(|| {
            MaptileError::Internal(format!("alias '{alias}' missing after registration"))
        })?;

        let store = ctx.connector.connect(&entry, &ctx.settings.region).await?;
        let buckets = store.list_buckets().await?;
        tracing::debug!(alias = %alias, ?buckets, "Listed buckets");

        let bucket = &ctx.settings.bucket;
        if !buckets.iter().any(|b| b == bucket) {
            let available = if buckets.is_empty() {
                "none".to_string()
            } else {
                buckets.join(", ")
            };
            return Err(MaptileError::NotFound(format!(
                "bucket '{bucket}' does not exist on '{alias}' (available: {available})"
            )));
        }

        tracing::info!(bucket = %bucket, "Bucket exists");
        ctx.store = Some(store);
        Ok(())
    }

    fn name(&self) -> &str {
        "bucket"
    }
}

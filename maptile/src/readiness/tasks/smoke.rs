//! Tasks: Smoke-test object round trip.
//!
//! upload → list → cleanup. Only the upload can fail the check; listing and
//! cleanup problems, including calls that time out, end up in the report's
//! warnings.

use std::time::Duration;

use async_trait::async_trait;
use maptile_shared::{MaptileError, MaptileResult};

use crate::pipeline::PipelineTask;
use crate::readiness::{ReadinessContext, SmokeFile};

/// Write the local smoke-test file and upload it under the same name.
pub struct UploadTask;

#[async_trait]
impl PipelineTask<ReadinessContext> for UploadTask {
    async fn run(&self, ctx: &mut ReadinessContext) -> MaptileResult<()> {
        let store = ctx.store()?;
        let bucket = ctx.settings.bucket.clone();

        // Dropped (and removed) on any error below.
        let file = SmokeFile::write(&ctx.scratch_dir)?;
        let body = std::fs::read(file.path()).map_err(|e| {
            MaptileError::Storage(format!("failed to read {}: {e}", file.path().display()))
        })?;

        store
            .put_object(&bucket, file.key(), body)
            .await
            .map_err(into_operation)?;

        tracing::info!(bucket = %bucket, key = file.key(), "Uploaded smoke-test object");
        ctx.smoke_file = Some(file);
        Ok(())
    }

    fn name(&self) -> &str {
        "upload"
    }
}

/// List the bucket contents for the operator. Not asserted.
pub struct ListTask;

#[async_trait]
impl PipelineTask<ReadinessContext> for ListTask {
    async fn run(&self, ctx: &mut ReadinessContext) -> MaptileResult<()> {
        let store = ctx.store()?;
        let bucket = &ctx.settings.bucket;

        let listed = tokio::time::timeout(ctx.call_timeout, store.list_objects(bucket))
            .await
            .unwrap_or_else(|_| Err(elapsed(ctx.call_timeout)));

        match listed {
            Ok(keys) => {
                tracing::info!(bucket = %bucket, objects = keys.len(), "Listed bucket contents");
                for key in &keys {
                    tracing::debug!(bucket = %bucket, key = %key, "Object");
                }
                ctx.report.listing = keys;
            }
            Err(e) => {
                tracing::warn!(bucket = %bucket, "Failed to list bucket contents: {}", e);
                ctx.report.warnings.push(format!("listing {bucket}: {e}"));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "list"
    }

    fn enforces_own_deadline(&self) -> bool {
        true
    }
}

/// Delete the uploaded object and the local file.
pub struct CleanupTask;

#[async_trait]
impl PipelineTask<ReadinessContext> for CleanupTask {
    async fn run(&self, ctx: &mut ReadinessContext) -> MaptileResult<()> {
        if ctx.smoke_file.is_none() {
            return Err(MaptileError::Internal("upload step must run first".into()));
        }
        remove_smoke_artifacts(ctx).await;

        tracing::info!(
            bucket = %ctx.settings.bucket,
            warnings = ctx.report.warnings.len(),
            "Cleaned up smoke-test artifacts"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "cleanup"
    }

    fn enforces_own_deadline(&self) -> bool {
        true
    }
}

/// Delete the smoke-test object and local file, if an upload happened.
///
/// Never fails: problems are logged and recorded as report warnings.
pub(crate) async fn remove_smoke_artifacts(ctx: &mut ReadinessContext) {
    let Some(file) = ctx.smoke_file.take() else {
        return;
    };
    let bucket = ctx.settings.bucket.clone();
    let key = file.key();

    if let Some(store) = ctx.store.clone() {
        let deleted = tokio::time::timeout(ctx.call_timeout, store.delete_object(&bucket, key))
            .await
            .unwrap_or_else(|_| Err(elapsed(ctx.call_timeout)));

        if let Err(e) = deleted {
            tracing::warn!(bucket = %bucket, key, "Failed to delete smoke-test object: {}", e);
            ctx.report
                .warnings
                .push(format!("deleting {bucket}/{key}: {e}"));
        }
    }

    let path = file.path().to_path_buf();
    if let Err(e) = file.remove() {
        tracing::warn!(path = %path.display(), "Failed to remove smoke-test file: {}", e);
        ctx.report
            .warnings
            .push(format!("removing {}: {e}", path.display()));
    }
}

fn elapsed(limit: Duration) -> MaptileError {
    MaptileError::Timeout(format!("no answer within {}s", limit.as_secs_f64()))
}

fn into_operation(err: MaptileError) -> MaptileError {
    match err {
        MaptileError::Operation(_) => err,
        other => MaptileError::Operation(format!("upload failed: {other}")),
    }
}

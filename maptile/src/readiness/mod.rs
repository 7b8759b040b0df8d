//! Storage readiness check.
//!
//! End-to-end smoke test of the object storage service, run after
//! deployment. Linear, no loops, no retries:
//!
//! ```text
//! START → liveness ──fail──→ ABORT (Unavailable)
//!           │
//!           ▼
//!         alias (register if absent)
//!           │
//!           ▼
//!         bucket ──missing──→ ABORT (NotFound)
//!           │
//!           ▼
//!         upload ──fail──→ ABORT (Operation)
//!           │
//!           ▼
//!         list → cleanup → SUCCESS
//! ```
//!
//! The check verifies, it does not provision: a missing bucket is a failure,
//! never created here. Listing and cleanup problems are reported as warnings
//! and do not fail the check. If a step fails after the upload, the
//! smoke-test object is still deleted.

mod tasks;
mod types;

pub use types::{ReadinessContext, ReadinessReport, SmokeFile};

use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::{Pipeline, StepFailure};
use crate::settings::StorageSettings;
use crate::storage::{AliasRegistry, HealthProbe, StoreConnector};
use tasks::{
    AliasTask, BucketTask, CleanupTask, ListTask, LivenessTask, UploadTask, remove_smoke_artifacts,
};

pub fn readiness_pipeline() -> Pipeline<ReadinessContext> {
    Pipeline::new("readiness")
        .then(LivenessTask)
        .then(AliasTask)
        .then(BucketTask)
        .then(UploadTask)
        .then(ListTask)
        .then(CleanupTask)
}

/// Builder and runner for one readiness check.
///
/// # Example
///
/// ```ignore
/// let report = ReadinessCheck::new(settings, Box::new(probe), registry, Box::new(S3Connector))
///     .with_scratch_dir(std::env::temp_dir())
///     .with_step_timeout(Duration::from_secs(10))
///     .run()
///     .await?;
/// ```
pub struct ReadinessCheck {
    ctx: ReadinessContext,
    step_timeout: Option<Duration>,
}

impl ReadinessCheck {
    pub fn new(
        settings: StorageSettings,
        probe: Box<dyn HealthProbe>,
        aliases: AliasRegistry,
        connector: Box<dyn StoreConnector>,
    ) -> Self {
        Self {
            ctx: ReadinessContext::new(settings, probe, aliases, connector),
            step_timeout: None,
        }
    }

    /// Directory for the local smoke-test file. Defaults to the system temp dir.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ctx.scratch_dir = dir.into();
        self
    }

    /// Deadline for each step. Listing and cleanup apply it to each of
    /// their remote calls instead, so a hung call there is only a warning.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self.ctx.call_timeout = timeout;
        self
    }

    pub async fn run(self) -> Result<ReadinessReport, StepFailure> {
        let mut ctx = self.ctx;
        let mut pipeline = readiness_pipeline();
        if let Some(timeout) = self.step_timeout {
            pipeline = pipeline.with_step_timeout(timeout);
        }

        tracing::info!(
            endpoint = %ctx.settings.endpoint,
            bucket = %ctx.settings.bucket,
            alias = %ctx.settings.alias,
            "Checking storage readiness"
        );

        if let Err(failure) = pipeline.run(&mut ctx).await {
            // The object may already be in the bucket.
            remove_smoke_artifacts(&mut ctx).await;
            return Err(failure);
        }
        Ok(ctx.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        assert_eq!(
            readiness_pipeline().step_names(),
            ["liveness", "alias", "bucket", "upload", "list", "cleanup"]
        );
    }
}

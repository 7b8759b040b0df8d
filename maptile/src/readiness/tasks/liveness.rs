//! Task: Liveness gate.
//!
//! Nothing else touches the storage service until it reports itself live.

use async_trait::async_trait;
use maptile_shared::MaptileResult;

use crate::pipeline::PipelineTask;
use crate::readiness::ReadinessContext;

pub struct LivenessTask;

#[async_trait]
impl PipelineTask<ReadinessContext> for LivenessTask {
    async fn run(&self, ctx: &mut ReadinessContext) -> MaptileResult<()> {
        let target = ctx.probe.target();
        tracing::debug!(target = %target, "Probing storage liveness");

        ctx.probe.probe().await?;

        tracing::info!(target = %target, "Storage service is live");
        Ok(())
    }

    fn name(&self) -> &str {
        "liveness"
    }
}

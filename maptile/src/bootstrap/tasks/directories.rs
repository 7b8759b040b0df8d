//! Step 1: directory setup.

use async_trait::async_trait;
use maptile_shared::MaptileResult;

use crate::bootstrap::BootstrapContext;
use crate::pipeline::PipelineTask;

pub struct EnsureDirectoriesTask;

#[async_trait]
impl PipelineTask<BootstrapContext> for EnsureDirectoriesTask {
    async fn run(&self, ctx: &mut BootstrapContext) -> MaptileResult<()> {
        ctx.layout.prepare()?;

        tracing::debug!(
            config_dir = %ctx.layout.config_dir().display(),
            temp_dir = %ctx.layout.temp_dir().display(),
            "Directories ready"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "ensure_directories"
    }
}

//! Task: Register the storage client alias.
//!
//! An existing alias of the same name is reused as is.

use async_trait::async_trait;
use maptile_shared::MaptileResult;

use crate::pipeline::PipelineTask;
use crate::readiness::ReadinessContext;
use crate::storage::AliasEntry;

pub struct AliasTask;

#[async_trait]
impl PipelineTask<ReadinessContext> for AliasTask {
    async fn run(&self, ctx: &mut ReadinessContext) -> MaptileResult<()> {
        let entry = AliasEntry::from_settings(&ctx.settings);
        let registered = ctx.aliases.register(&ctx.settings.alias, entry)?;

        if registered {
            tracing::info!(
                alias = %ctx.settings.alias,
                file = %ctx.aliases.path().display(),
                "Registered storage alias"
            );
        } else {
            tracing::debug!(alias = %ctx.settings.alias, "Storage alias already registered");
        }

        ctx.report.alias_registered = registered;
        Ok(())
    }

    fn name(&self) -> &str {
        "alias"
    }
}

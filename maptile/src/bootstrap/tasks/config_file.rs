//! Step 2: configuration file from template.

use std::path::Path;

use async_trait::async_trait;
use maptile_shared::{MaptileError, MaptileResult};

use crate::bootstrap::BootstrapContext;
use crate::config::AppConfig;
use crate::pipeline::PipelineTask;
use crate::settings::StorageSettings;

pub struct MaterializeConfigTask;

#[async_trait]
impl PipelineTask<BootstrapContext> for MaterializeConfigTask {
    async fn run(&self, ctx: &mut BootstrapContext) -> MaptileResult<()> {
        ctx.report.config_created = materialize_config(
            &ctx.layout.config_template(),
            &ctx.layout.config_file(),
            &ctx.settings,
        )?;
        Ok(())
    }

    fn name(&self) -> &str {
        "materialize_config"
    }
}

/// Create `target` from `template` with storage settings applied.
///
/// Returns `false` without reading the template if `target` already exists.
pub(crate) fn materialize_config(
    template: &Path,
    target: &Path,
    settings: &StorageSettings,
) -> MaptileResult<bool> {
    if target.exists() {
        tracing::info!(path = %target.display(), "Configuration exists, leaving it untouched");
        return Ok(false);
    }

    if !template.is_file() {
        return Err(MaptileError::Config(format!(
            "configuration template not found: {}",
            template.display()
        )));
    }

    let mut config = AppConfig::load(template)?;
    config.apply_storage(settings)?;
    config.validate().map_err(|e| match e {
        MaptileError::Config(msg) => MaptileError::Config(format!(
            "template {} is invalid: {msg}",
            template.display()
        )),
        other => other,
    })?;
    config.save(target)?;

    tracing::info!(
        path = %target.display(),
        bucket = %settings.bucket,
        endpoint = %settings.endpoint,
        "Created configuration from template"
    );
    Ok(true)
}

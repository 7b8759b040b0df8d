//! Step 4: environment file from template.

use std::path::Path;

use async_trait::async_trait;
use maptile_shared::{MaptileError, MaptileResult};

use crate::bootstrap::BootstrapContext;
use crate::pipeline::PipelineTask;
use crate::util::write_atomic;

pub struct MaterializeEnvFileTask;

#[async_trait]
impl PipelineTask<BootstrapContext> for MaterializeEnvFileTask {
    async fn run(&self, ctx: &mut BootstrapContext) -> MaptileResult<()> {
        ctx.report.env_created =
            materialize_env_file(&ctx.layout.env_template(), &ctx.layout.env_file())?;
        Ok(())
    }

    fn name(&self) -> &str {
        "materialize_env_file"
    }
}

/// Copy `template` to `target` verbatim, unless `target` exists.
pub(crate) fn materialize_env_file(template: &Path, target: &Path) -> MaptileResult<bool> {
    if target.exists() {
        tracing::info!(path = %target.display(), "Environment file exists, leaving it untouched");
        return Ok(false);
    }

    let contents = std::fs::read(template).map_err(|e| {
        MaptileError::Config(format!(
            "environment template {} is unreadable: {e}",
            template.display()
        ))
    })?;
    write_atomic(target, &contents)?;

    tracing::info!(path = %target.display(), "Created environment file from template");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copies_template_once() {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join(".env.example");
        let target = dir.path().join(".env");
        std::fs::write(&template, "MINIO_ROOT_USER=minioadmin\n").unwrap();

        assert!(materialize_env_file(&template, &target).unwrap());
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "MINIO_ROOT_USER=minioadmin\n"
        );

        std::fs::write(&template, "CHANGED=1\n").unwrap();
        assert!(!materialize_env_file(&template, &target).unwrap());
        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            "MINIO_ROOT_USER=minioadmin\n"
        );
    }

    #[test]
    fn test_missing_template_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = materialize_env_file(&dir.path().join(".env.example"), &dir.path().join(".env"))
            .unwrap_err();
        assert!(matches!(err, MaptileError::Config(_)));
    }
}

//! Step 3: open up data directory permissions.

use std::path::Path;

use async_trait::async_trait;
use maptile_shared::MaptileResult;

use crate::bootstrap::{BootstrapContext, DATA_DIR_MODE};
use crate::pipeline::PipelineTask;

pub struct OpenPermissionsTask;

#[async_trait]
impl PipelineTask<BootstrapContext> for OpenPermissionsTask {
    async fn run(&self, ctx: &mut BootstrapContext) -> MaptileResult<()> {
        let data_dir = ctx.layout.data_dir();
        tracing::warn!(
            path = %data_dir.display(),
            mode = %format!("{DATA_DIR_MODE:o}"),
            "Making data directory world-writable (development default)"
        );
        ctx.report.permissions_set = set_mode_recursive(&data_dir, DATA_DIR_MODE)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "open_data_permissions"
    }
}

/// Set `mode` on `root` and everything below it. Symlinks are skipped.
///
/// Returns the number of paths changed.
#[cfg(unix)]
pub(crate) fn set_mode_recursive(root: &Path, mode: u32) -> MaptileResult<usize> {
    use maptile_shared::MaptileError;
    use std::os::unix::fs::PermissionsExt;
    use walkdir::WalkDir;

    let mut count = 0;
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            MaptileError::Storage(format!("failed to walk {}: {e}", root.display()))
        })?;

        if entry.file_type().is_symlink() {
            continue;
        }

        std::fs::set_permissions(entry.path(), std::fs::Permissions::from_mode(mode)).map_err(
            |e| {
                MaptileError::Storage(format!(
                    "failed to set permissions on {}: {e}",
                    entry.path().display()
                ))
            },
        )?;
        count += 1;
    }

    Ok(count)
}

#[cfg(not(unix))]
pub(crate) fn set_mode_recursive(root: &Path, _mode: u32) -> MaptileResult<usize> {
    tracing::debug!(path = %root.display(), "Unix permissions not supported, skipping");
    Ok(0)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_sets_mode_on_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("data");
        std::fs::create_dir_all(root.join("tmp/nested")).unwrap();
        let file = root.join("tmp/nested/tile.png");
        std::fs::write(&file, b"png").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o600)).unwrap();

        let count = set_mode_recursive(&root, 0o777).unwrap();
        assert_eq!(count, 4);

        for path in [root.clone(), root.join("tmp"), root.join("tmp/nested"), file] {
            let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o777, "{} has mode {:o}", path.display(), mode);
        }
    }

    #[test]
    fn test_missing_root_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let err = set_mode_recursive(&dir.path().join("nope"), 0o777).unwrap_err();
        assert!(matches!(err, maptile_shared::MaptileError::Storage(_)));
    }
}

use std::io::Write;
use std::path::Path;

use maptile_shared::{MaptileError, MaptileResult};

/// Write `contents` to `path` through a temp file in the same directory.
///
/// Readers never observe a partially written file: either the old file (or
/// nothing) or the complete new one.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> MaptileResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(parent).map_err(|e| {
        MaptileError::Storage(format!("failed to create {}: {e}", parent.display()))
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| {
        MaptileError::Storage(format!(
            "failed to create temp file in {}: {e}",
            parent.display()
        ))
    })?;

    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| MaptileError::Storage(format!("failed to write {}: {e}", path.display())))?;

    tmp.persist(path).map_err(|e| {
        MaptileError::Storage(format!("failed to persist {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

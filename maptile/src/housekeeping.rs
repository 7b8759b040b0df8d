//! Temporary-download housekeeping.
//!
//! Removes stale files left in the downloader's temp directory and prunes the
//! directories they leave empty.

use std::path::Path;
use std::time::{Duration, SystemTime};

use walkdir::WalkDir;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Remove files under `dir` not modified in the last `days` days.
///
/// Names ending in any of `exclude` are kept. Returns the number of files
/// removed.
pub fn clean_old_files(dir: &Path, days: u64, exclude: &[String]) -> usize {
    let age = Duration::from_secs(days.saturating_mul(SECS_PER_DAY));
    let cutoff = SystemTime::now()
        .checked_sub(age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    clean_files_older_than(dir, cutoff, exclude)
}

/// Remove files under `dir` last modified before `cutoff`, then every
/// directory left empty. `dir` itself is never removed.
///
/// Per-entry failures are logged and skipped.
pub fn clean_files_older_than(dir: &Path, cutoff: SystemTime, exclude: &[String]) -> usize {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "Cleanup directory does not exist");
        return 0;
    }

    let mut removed = 0;
    for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            // Fails (and is ignored) while anything is left inside.
            if std::fs::remove_dir(path).is_ok() {
                tracing::debug!(dir = %path.display(), "Removed empty directory");
            }
            continue;
        }

        if !file_type.is_file() || is_excluded(path, exclude) {
            continue;
        }

        let modified = match entry.metadata().map(|m| m.modified()) {
            Ok(Ok(modified)) => modified,
            Ok(Err(e)) => {
                tracing::warn!(path = %path.display(), "Cannot read modification time: {}", e);
                continue;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Cannot read metadata: {}", e);
                continue;
            }
        };
        if modified >= cutoff {
            continue;
        }

        match std::fs::remove_file(path) {
            Ok(()) => {
                removed += 1;
                tracing::debug!(path = %path.display(), "Removed stale file");
            }
            Err(e) => tracing::warn!(path = %path.display(), "Failed to remove file: {}", e),
        }
    }

    tracing::info!(dir = %dir.display(), removed, "Cleaned temporary files");
    removed
}

fn is_excluded(path: &Path, exclude: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    exclude
        .iter()
        .any(|suffix| !suffix.is_empty() && name.ends_with(suffix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{FileTime, set_file_mtime};
    use tempfile::TempDir;

    fn write_aged(path: &Path, days_old: u64) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"tile").unwrap();
        let when = SystemTime::now() - Duration::from_secs(days_old * SECS_PER_DAY);
        set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
    }

    #[test]
    fn test_removes_only_stale_files() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("a.png");
        let fresh = dir.path().join("b.png");
        write_aged(&stale, 10);
        write_aged(&fresh, 1);

        assert_eq!(clean_old_files(dir.path(), 7, &[]), 1);
        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn test_excluded_suffix_kept() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("world.mbtiles");
        let tile = dir.path().join("3/4/5.png");
        write_aged(&archive, 30);
        write_aged(&tile, 30);

        let removed = clean_old_files(dir.path(), 7, &[".mbtiles".to_string()]);
        assert_eq!(removed, 1);
        assert!(archive.exists());
        assert!(!tile.exists());
    }

    #[test]
    fn test_prunes_empty_dirs_but_not_root() {
        let dir = TempDir::new().unwrap();
        write_aged(&dir.path().join("z/1/2.png"), 30);
        write_aged(&dir.path().join("keep/1.png"), 0);

        assert_eq!(clean_old_files(dir.path(), 7, &[]), 1);
        assert!(!dir.path().join("z").exists());
        assert!(dir.path().join("keep/1.png").exists());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_missing_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        assert_eq!(clean_old_files(&dir.path().join("nope"), 7, &[]), 0);
    }

    #[test]
    fn test_zero_days_removes_everything_older_than_now() {
        let dir = TempDir::new().unwrap();
        write_aged(&dir.path().join("old.png"), 1);

        let cutoff = SystemTime::now();
        assert_eq!(clean_files_older_than(dir.path(), cutoff, &[]), 1);
    }
}

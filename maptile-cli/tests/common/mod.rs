#![allow(dead_code)]

use assert_cmd::Command;
use maptile_test_utils::ProjectFixture;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Variables the binary reads; cleared so the host environment cannot leak in.
const ISOLATED_VARS: &[&str] = &[
    "MINIO_ENDPOINT",
    "MINIO_ROOT_USER",
    "MINIO_ROOT_PASSWORD",
    "MINIO_DEFAULT_BUCKETS",
    "MINIO_REGION",
    "MAPTILE_STORAGE_ALIAS",
    "MAPTILE_ROOT",
    "MAPTILE_LOG_FILE",
    "RUST_LOG",
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
];

pub struct TestContext {
    pub cmd: Command,
    pub project: ProjectFixture,
    /// Stands in for the user's home directory (alias file lives here).
    pub home: TempDir,
}

impl TestContext {
    /// Another command against the same project and home.
    pub fn new_cmd(&self) -> Command {
        command(self.project.root(), self.home.path())
    }

    pub fn root(&self) -> &Path {
        self.project.root()
    }

    pub fn alias_file(&self) -> PathBuf {
        self.home.path().join(".mc").join("config.json")
    }
}

fn command(root: &Path, home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_maptile"));
    // You can override this with .timeout(Duration::from_secs(N))
    cmd.timeout(Duration::from_secs(60));
    for var in ISOLATED_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home);
    cmd.env("MC_CONFIG_FILE", home.join(".mc").join("config.json"));
    cmd.arg("--root").arg(root);
    cmd
}

fn context(project: ProjectFixture) -> TestContext {
    let home = TempDir::new().expect("Failed to create home dir");
    TestContext {
        cmd: command(project.root(), home.path()),
        project,
        home,
    }
}

/// Project with the packaged templates in place.
pub fn maptile() -> TestContext {
    context(ProjectFixture::new())
}

/// Empty project directory.
pub fn maptile_bare() -> TestContext {
    context(ProjectFixture::bare())
}

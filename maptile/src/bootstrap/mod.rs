//! Project bootstrap.
//!
//! Prepares a downloader project directory for first run. Four steps, each
//! idempotent, run fail-fast:
//!
//! ```text
//! 1. ensure_directories    config/ and data/tmp/
//! 2. materialize_config    config/config.yaml from config/config.example.yaml (only if absent)
//! 3. open_data_permissions data/ recursively to 0777
//! 4. materialize_env_file  .env from .env.example (only if absent)
//! ```
//!
//! Re-running after a successful run only repeats steps 1 and 3; existing
//! configuration and environment files are never touched.

mod tasks;

use crate::layout::ProjectLayout;
use crate::pipeline::{Pipeline, StepFailure};
use crate::settings::StorageSettings;
use tasks::{
    EnsureDirectoriesTask, MaterializeConfigTask, MaterializeEnvFileTask, OpenPermissionsTask,
};

/// Mode applied to everything under the data directory.
///
/// World-writable: suitable for local development only.
pub const DATA_DIR_MODE: u32 = 0o777;

/// What a bootstrap run changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Configuration file was created from the template in this run.
    pub config_created: bool,
    /// Environment file was created from the template in this run.
    pub env_created: bool,
    /// Number of paths whose permissions were set.
    pub permissions_set: usize,
}

/// Bootstrap pipeline context.
pub struct BootstrapContext {
    pub layout: ProjectLayout,
    pub settings: StorageSettings,
    pub report: BootstrapReport,
}

pub fn bootstrap_pipeline() -> Pipeline<BootstrapContext> {
    Pipeline::new("bootstrap")
        .then(EnsureDirectoriesTask)
        .then(MaterializeConfigTask)
        .then(OpenPermissionsTask)
        .then(MaterializeEnvFileTask)
}

/// Run the bootstrap workflow against `layout`.
pub async fn run_bootstrap(
    layout: ProjectLayout,
    settings: StorageSettings,
) -> Result<BootstrapReport, StepFailure> {
    tracing::info!(root = %layout.root().display(), "Bootstrapping project");

    let mut ctx = BootstrapContext {
        layout,
        settings,
        report: BootstrapReport::default(),
    };

    bootstrap_pipeline().run(&mut ctx).await?;
    Ok(ctx.report)
}

//! Bootstrap steps.
//!
//! Each task is a thin adapter over a plain function so the filesystem work
//! can be exercised without a pipeline.

mod config_file;
mod directories;
mod env_file;
mod permissions;

pub(crate) use config_file::MaterializeConfigTask;
pub(crate) use directories::EnsureDirectoriesTask;
pub(crate) use env_file::MaterializeEnvFileTask;
pub(crate) use permissions::OpenPermissionsTask;

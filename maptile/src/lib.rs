//! maptile - working-directory bootstrap and object-storage readiness checks
//! for the map tile downloader.
//!
//! Two workflows, each an ordered [`Pipeline`] of named steps that stops at
//! the first failure:
//!
//! ```text
//! bootstrap:  ensure_directories → materialize_config → open_data_permissions → materialize_env_file
//! readiness:  liveness → alias → bucket → upload → list → cleanup
//! ```
//!
//! The library never reads the process environment ad hoc: storage settings
//! are resolved once into [`StorageSettings`] and passed to every step.

pub mod bootstrap;
pub mod config;
pub mod housekeeping;
pub mod layout;
pub mod pipeline;
pub mod readiness;
pub mod settings;
pub mod storage;

mod util;

pub use bootstrap::{BootstrapReport, run_bootstrap};
pub use config::AppConfig;
pub use layout::ProjectLayout;
pub use pipeline::{Pipeline, PipelineTask, StepFailure};
pub use readiness::{ReadinessCheck, ReadinessReport};
pub use settings::StorageSettings;

pub use maptile_shared::{MaptileError, MaptileResult};

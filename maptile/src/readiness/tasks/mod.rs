//! Readiness pipeline tasks.

mod alias;
mod bucket;
mod liveness;
mod smoke;

pub use alias::AliasTask;
pub use bucket::BucketTask;
pub use liveness::LivenessTask;
pub(crate) use smoke::remove_smoke_artifacts;
pub use smoke::{CleanupTask, ListTask, UploadTask};

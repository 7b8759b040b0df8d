//! Against a real MinIO server. Run with:
//!
//! ```text
//! docker run -d -p 9000:9000 -e MINIO_ROOT_USER=minioadmin -e MINIO_ROOT_PASSWORD=minioadmin \
//!     minio/minio server /data
//! mc mb local/map-tiles
//! cargo test -p maptile --test minio_e2e -- --ignored
//! ```

use std::time::Duration;

use maptile::storage::{AliasRegistry, HttpHealthProbe, S3Connector};
use maptile::{ReadinessCheck, StorageSettings};
use tempfile::TempDir;

#[tokio::test]
#[ignore = "requires a running MinIO server"]
async fn test_readiness_against_minio() {
    let settings = StorageSettings::from_env().unwrap();
    let home = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let timeout = Duration::from_secs(10);

    let report = ReadinessCheck::new(
        settings.clone(),
        Box::new(HttpHealthProbe::new(&settings, timeout).unwrap()),
        AliasRegistry::new(home.path().join("config.json")),
        Box::new(S3Connector),
    )
    .with_scratch_dir(scratch.path())
    .with_step_timeout(timeout)
    .run()
    .await
    .unwrap();

    assert!(report.alias_registered);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

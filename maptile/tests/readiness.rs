use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use maptile::storage::{AliasEntry, AliasRegistry, HttpHealthProbe};
use maptile::{MaptileError, ReadinessCheck, StorageSettings};
use maptile_shared::constants::storage::{SMOKE_CONTENT, SMOKE_OBJECT};
use maptile_test_utils::{
    FakeConnector, HangingProbe, InMemoryObjectStore, ScriptedProbe, StubHealthServer,
};
use tempfile::TempDir;

struct Harness {
    home: TempDir,
    scratch: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            scratch: TempDir::new().unwrap(),
        }
    }

    fn registry(&self) -> AliasRegistry {
        AliasRegistry::new(self.home.path().join(".mc").join("config.json"))
    }

    fn check(
        &self,
        probe: impl maptile::storage::HealthProbe + 'static,
        connector: FakeConnector,
    ) -> ReadinessCheck {
        ReadinessCheck::new(
            StorageSettings::default(),
            Box::new(probe),
            self.registry(),
            Box::new(connector),
        )
        .with_scratch_dir(self.scratch.path())
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path()).unwrap().next().is_none()
    }
}

#[tokio::test]
async fn test_healthy_service_passes() {
    let harness = Harness::new();
    let store = Arc::new(InMemoryObjectStore::new().with_bucket("map-tiles"));
    let connector = FakeConnector::new(store.clone());
    let seen = connector.seen();

    let report = harness
        .check(ScriptedProbe::up(), connector)
        .run()
        .await
        .unwrap();

    assert!(report.alias_registered);
    assert_eq!(report.listing, [SMOKE_OBJECT]);
    assert!(report.warnings.is_empty());

    // Cleaned up both remotely and locally.
    assert!(store.objects("map-tiles").is_empty());
    assert!(harness.scratch_is_empty());
    assert_eq!(
        store.calls(),
        [
            "list_buckets".to_string(),
            format!("put map-tiles/{SMOKE_OBJECT}"),
            "list map-tiles".to_string(),
            format!("delete map-tiles/{SMOKE_OBJECT}"),
        ]
    );

    let (alias, region) = seen.lock()[0].clone();
    assert_eq!(alias.url, "http://localhost:9000");
    assert_eq!(alias.access_key, "minioadmin");
    assert_eq!(alias.secret_key, "minioadmin");
    assert_eq!(region, "us-east-1");
}

#[tokio::test]
async fn test_uploaded_body_is_the_smoke_content() {
    let harness = Harness::new();
    let store = Arc::new(
        InMemoryObjectStore::new()
            .with_bucket("map-tiles")
            .fail_deletes(),
    );

    let report = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap();

    assert_eq!(
        store.object("map-tiles", SMOKE_OBJECT).unwrap(),
        SMOKE_CONTENT.as_bytes()
    );
    // A failed remote delete is reported, not fatal.
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("delete refused"));
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn test_service_down_stops_before_storage_calls() {
    let harness = Harness::new();
    let store = Arc::new(InMemoryObjectStore::new().with_bucket("map-tiles"));
    let probe = ScriptedProbe::down();
    let probes = probe.calls();

    let failure = harness
        .check(probe, FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(failure.step, "liveness");
    assert!(matches!(failure.error, MaptileError::Unavailable(_)));
    assert_eq!(probes.load(Ordering::SeqCst), 1);
    assert!(store.calls().is_empty());
    assert!(!harness.registry().path().exists());
}

#[tokio::test]
async fn test_missing_bucket_is_not_created() {
    let harness = Harness::new();
    let store = Arc::new(InMemoryObjectStore::new().with_bucket("something-else"));

    let failure = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(failure.step, "bucket");
    match &failure.error {
        MaptileError::NotFound(msg) => {
            assert!(msg.contains("map-tiles"));
            assert!(msg.contains("something-else"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(store.calls(), ["list_buckets"]);
    assert!(store.objects("map-tiles").is_empty());
    assert!(harness.scratch_is_empty());
}

#[tokio::test]
async fn test_upload_failure_removes_local_file() {
    let harness = Harness::new();
    let store = Arc::new(
        InMemoryObjectStore::new()
            .with_bucket("map-tiles")
            .fail_uploads(),
    );

    let failure = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(failure.step, "upload");
    assert!(matches!(failure.error, MaptileError::Operation(_)));
    assert!(harness.scratch_is_empty());
    assert!(!store.calls().iter().any(|c| c.starts_with("list map-tiles")));
}

#[tokio::test]
async fn test_listing_failure_is_a_warning() {
    let harness = Harness::new();
    let store = Arc::new(
        InMemoryObjectStore::new()
            .with_bucket("map-tiles")
            .fail_listing(),
    );

    let report = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap();

    assert!(report.listing.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(store.objects("map-tiles").is_empty());
}

#[tokio::test]
async fn test_existing_alias_is_reused() {
    let harness = Harness::new();
    let registry = harness.registry();
    let existing = AliasEntry {
        url: "http://elsewhere:9000".into(),
        ..AliasEntry::from_settings(&StorageSettings::default())
    };
    assert!(registry.register("local", existing.clone()).unwrap());

    let store = Arc::new(InMemoryObjectStore::new().with_bucket("map-tiles"));
    let connector = FakeConnector::new(store);
    let seen = connector.seen();

    let report = harness
        .check(ScriptedProbe::up(), connector)
        .run()
        .await
        .unwrap();

    assert!(!report.alias_registered);
    assert_eq!(registry.get("local").unwrap(), Some(existing.clone()));
    assert_eq!(seen.lock()[0].0, existing);
}

#[tokio::test]
async fn test_second_run_does_not_reregister() {
    let harness = Harness::new();
    let store = Arc::new(InMemoryObjectStore::new().with_bucket("map-tiles"));

    let first = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap();
    let second = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap();

    assert!(first.alias_registered);
    assert!(!second.alias_registered);
    assert_eq!(harness.registry().list().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_liveness_endpoint_times_out() {
    let harness = Harness::new();
    let store = Arc::new(InMemoryObjectStore::new().with_bucket("map-tiles"));

    let failure = harness
        .check(HangingProbe, FakeConnector::new(store.clone()))
        .with_step_timeout(Duration::from_secs(10))
        .run()
        .await
        .unwrap_err();

    assert_eq!(failure.step, "liveness");
    assert!(matches!(failure.error, MaptileError::Timeout(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hung_listing_is_a_warning_and_cleanup_still_runs() {
    let harness = Harness::new();
    let store = Arc::new(
        InMemoryObjectStore::new()
            .with_bucket("map-tiles")
            .hang_listing(),
    );

    let report = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .with_step_timeout(Duration::from_secs(10))
        .run()
        .await
        .unwrap();

    assert!(report.listing.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("listing map-tiles"));
    assert!(store.objects("map-tiles").is_empty());
    assert!(harness.scratch_is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hung_delete_is_a_warning() {
    let harness = Harness::new();
    let store = Arc::new(
        InMemoryObjectStore::new()
            .with_bucket("map-tiles")
            .hang_deletes(),
    );

    let report = harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .with_step_timeout(Duration::from_secs(10))
        .run()
        .await
        .unwrap();

    assert_eq!(report.listing, [SMOKE_OBJECT]);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with(&format!("deleting map-tiles/{SMOKE_OBJECT}")));
    assert!(harness.scratch_is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_planted_symlink_in_scratch_dir_is_left_alone() {
    let harness = Harness::new();
    let victim = harness.home.path().join("victim.txt");
    std::fs::write(&victim, "precious user data").unwrap();
    std::os::unix::fs::symlink(&victim, harness.scratch.path().join(SMOKE_OBJECT)).unwrap();

    let store = Arc::new(InMemoryObjectStore::new().with_bucket("map-tiles"));
    harness
        .check(ScriptedProbe::up(), FakeConnector::new(store.clone()))
        .run()
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&victim).unwrap(),
        "precious user data"
    );
    assert!(
        std::fs::symlink_metadata(harness.scratch.path().join(SMOKE_OBJECT))
            .unwrap()
            .file_type()
            .is_symlink()
    );
}

#[tokio::test]
async fn test_http_liveness_against_stub_server() {
    let live = StubHealthServer::start(200).await.unwrap();
    let settings = StorageSettings {
        endpoint: live.endpoint(),
        ..Default::default()
    };
    let probe = HttpHealthProbe::new(&settings, Duration::from_secs(5)).unwrap();
    assert!(probe.url().as_str().ends_with("/minio/health/live"));

    use maptile::storage::HealthProbe;
    probe.probe().await.unwrap();
    assert_eq!(live.hits(), 1);

    let down = StubHealthServer::start(503).await.unwrap();
    let settings = StorageSettings {
        endpoint: down.endpoint(),
        ..Default::default()
    };
    let err = HttpHealthProbe::new(&settings, Duration::from_secs(5))
        .unwrap()
        .probe()
        .await
        .unwrap_err();
    assert!(matches!(err, MaptileError::Unavailable(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_unavailable() {
    use maptile::storage::HealthProbe;

    let settings = StorageSettings {
        endpoint: "http://127.0.0.1:1".into(),
        ..Default::default()
    };
    let err = HttpHealthProbe::new(&settings, Duration::from_secs(2))
        .unwrap()
        .probe()
        .await
        .unwrap_err();
    assert!(matches!(err, MaptileError::Unavailable(_)));
}

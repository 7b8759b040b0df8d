//! Test doubles and fixtures shared by the maptile test suites.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use maptile::ProjectLayout;
use maptile::storage::{AliasEntry, HealthProbe, ObjectStore, StoreConnector};
use maptile_shared::{MaptileError, MaptileResult};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Packaged configuration template.
pub const CONFIG_TEMPLATE: &str = include_str!("../../config/config.example.yaml");

/// Packaged environment template.
pub const ENV_TEMPLATE: &str = include_str!("../../.env.example");

// ============================================================================
// Object store
// ============================================================================

/// In-memory [`ObjectStore`] that records every call.
#[derive(Default)]
pub struct InMemoryObjectStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
    calls: Mutex<Vec<String>>,
    fail_uploads: bool,
    fail_listing: bool,
    fail_deletes: bool,
    hang_listing: bool,
    hang_deletes: bool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, name: &str) -> Self {
        self.buckets.lock().insert(name.to_string(), BTreeMap::new());
        self
    }

    pub fn fail_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn fail_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn fail_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Object listing never answers.
    pub fn hang_listing(mut self) -> Self {
        self.hang_listing = true;
        self
    }

    /// Object deletion never answers.
    pub fn hang_deletes(mut self) -> Self {
        self.hang_deletes = true;
        self
    }

    /// Keys currently stored in `bucket`.
    pub fn objects(&self, bucket: &str) -> BTreeSet<String> {
        self.buckets
            .lock()
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets.lock().get(bucket)?.get(key).cloned()
    }

    /// Operations in call order, e.g. `put map-tiles/readiness-check.txt`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list_buckets(&self) -> MaptileResult<Vec<String>> {
        self.record("list_buckets".into());
        Ok(self.buckets.lock().keys().cloned().collect())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> MaptileResult<()> {
        self.record(format!("put {bucket}/{key}"));
        if self.fail_uploads {
            return Err(MaptileError::Operation("access denied".into()));
        }

        let mut buckets = self.buckets.lock();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| MaptileError::Operation(format!("no such bucket: {bucket}")))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> MaptileResult<Vec<String>> {
        self.record(format!("list {bucket}"));
        if self.hang_listing {
            never_answer().await;
        }
        if self.fail_listing {
            return Err(MaptileError::Operation("listing disabled".into()));
        }
        Ok(self.objects(bucket).into_iter().collect())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> MaptileResult<()> {
        self.record(format!("delete {bucket}/{key}"));
        if self.hang_deletes {
            never_answer().await;
        }
        if self.fail_deletes {
            return Err(MaptileError::Operation("delete refused".into()));
        }

        if let Some(objects) = self.buckets.lock().get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }
}

async fn never_answer() {
    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
}

/// Hands out a shared [`InMemoryObjectStore`] and remembers what it was asked.
pub struct FakeConnector {
    store: Arc<InMemoryObjectStore>,
    seen: Arc<Mutex<Vec<(AliasEntry, String)>>>,
}

impl FakeConnector {
    pub fn new(store: Arc<InMemoryObjectStore>) -> Self {
        Self {
            store,
            seen: Arc::default(),
        }
    }

    /// Handle to the recorded `(alias, region)` pairs, usable after the
    /// connector has been moved into a check.
    pub fn seen(&self) -> Arc<Mutex<Vec<(AliasEntry, String)>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait]
impl StoreConnector for FakeConnector {
    async fn connect(
        &self,
        alias: &AliasEntry,
        region: &str,
    ) -> MaptileResult<Arc<dyn ObjectStore>> {
        self.seen.lock().push((alias.clone(), region.to_string()));
        let store: Arc<dyn ObjectStore> = self.store.clone();
        Ok(store)
    }
}

// ============================================================================
// Health probes
// ============================================================================

/// Probe with a fixed answer.
pub struct ScriptedProbe {
    live: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProbe {
    pub fn up() -> Self {
        Self {
            live: true,
            calls: Arc::default(),
        }
    }

    pub fn down() -> Self {
        Self {
            live: false,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn probe(&self) -> MaptileResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.live {
            Ok(())
        } else {
            Err(MaptileError::Unavailable("scripted probe is down".into()))
        }
    }

    fn target(&self) -> String {
        "scripted".into()
    }
}

/// Probe that never answers.
pub struct HangingProbe;

#[async_trait]
impl HealthProbe for HangingProbe {
    async fn probe(&self) -> MaptileResult<()> {
        never_answer().await;
        Ok(())
    }

    fn target(&self) -> String {
        "hanging".into()
    }
}

/// Minimal HTTP server answering every request with a fixed status.
pub struct StubHealthServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl StubHealthServer {
    pub async fn start(status: u16) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let task = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status} STUB\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Ok(Self { addr, hits, task })
    }

    /// Base URL to use as the storage endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubHealthServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ============================================================================
// Project fixtures
// ============================================================================

/// Temporary project directory.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Project with both packaged templates in place.
    pub fn new() -> Self {
        let fixture = Self::bare();
        let layout = fixture.layout();
        std::fs::create_dir_all(layout.config_dir()).expect("create config dir");
        std::fs::write(layout.config_template(), CONFIG_TEMPLATE).expect("write config template");
        std::fs::write(layout.env_template(), ENV_TEMPLATE).expect("write env template");
        fixture
    }

    /// Empty project directory.
    pub fn bare() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(self.dir.path())
    }
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment lookup backed by fixed pairs.
pub fn env_lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

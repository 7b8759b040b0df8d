//! Shared constants
//!
//! Environment variable names and fallback values used by the bootstrap and
//! readiness workflows. Both must agree on these.

/// Environment variables read at process start.
pub mod envs {
    /// Storage service endpoint URL.
    pub const ENDPOINT: &str = "MINIO_ENDPOINT";

    /// Root username, used as the access key.
    pub const ROOT_USER: &str = "MINIO_ROOT_USER";

    /// Root password, used as the secret key.
    pub const ROOT_PASSWORD: &str = "MINIO_ROOT_PASSWORD";

    /// Comma separated bucket list; the first entry is the target bucket.
    pub const DEFAULT_BUCKETS: &str = "MINIO_DEFAULT_BUCKETS";

    pub const REGION: &str = "MINIO_REGION";

    /// Name of the storage client alias to configure.
    pub const ALIAS: &str = "MAPTILE_STORAGE_ALIAS";

    /// Path of the storage client's alias file.
    pub const ALIAS_FILE: &str = "MC_CONFIG_FILE";
}

/// Fallback values used when the matching variable is unset or empty.
pub mod defaults {
    pub const ENDPOINT: &str = "http://localhost:9000";
    pub const ROOT_USER: &str = "minioadmin";
    pub const ROOT_PASSWORD: &str = "minioadmin";
    pub const BUCKET: &str = "map-tiles";
    pub const ALIAS: &str = "local";
    pub const REGION: &str = "us-east-1";

    /// Per-step deadline for the readiness check, in seconds.
    pub const STEP_TIMEOUT_SECS: u64 = 10;
}

/// Storage service endpoints and smoke-test artifacts.
pub mod storage {
    /// Liveness endpoint, relative to the service URL.
    pub const HEALTH_LIVE_PATH: &str = "/minio/health/live";

    /// Object key (and local file name) used by the smoke test.
    pub const SMOKE_OBJECT: &str = "readiness-check.txt";

    /// Literal content of the smoke-test file.
    pub const SMOKE_CONTENT: &str = "maptile readiness check\n";
}

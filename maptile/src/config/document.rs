//! Typed configuration document of the tile downloader.
//!
//! Only the storage destinations are ever modified by this crate. Writing a
//! document back keeps every modelled field, unknown top-level sections and
//! unknown `global` keys. YAML comments and unknown keys inside the other
//! sections are not kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub download_strategies: Vec<StrategyConfig>,

    #[serde(default)]
    pub ip_pool: IpPoolConfig,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbtiles: Option<MbtilesConfig>,

    /// Sections read by other tools.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_temp_download_dir")]
    pub temp_download_dir: String,

    #[serde(default = "default_true")]
    pub cleanup_temp_files: bool,

    #[serde(default = "default_cleanup_after_days")]
    pub cleanup_after_days: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds between retries.
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Download strategy entry. Parameters are opaque to this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub params: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IpPoolConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub credentials: BTreeMap<String, String>,

    /// Seconds between address rotations.
    #[serde(default = "default_rotation_interval")]
    pub rotation_interval: u64,

    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    /// URL with `{x}`, `{y}` and `{z}` placeholders.
    #[serde(default)]
    pub url_template: String,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub zoom_levels: Vec<u8>,

    #[serde(default)]
    pub bounds: Bounds,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub min_lat: f64,
    #[serde(default)]
    pub min_lon: f64,
    #[serde(default)]
    pub max_lat: f64,
    #[serde(default)]
    pub max_lon: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// `files` or `mbtiles`.
    #[serde(default = "default_output_format")]
    pub format: String,

    #[serde(default)]
    pub compress: bool,

    #[serde(default)]
    pub destinations: Vec<Destination>,
}

/// Where finished tiles (or MBTiles archives) are written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Destination {
    Local {
        #[serde(default)]
        path: String,
    },
    Minio(MinioDestination),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinioDestination {
    /// `host[:port]`, without scheme.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    #[serde(default)]
    pub bucket_name: String,

    #[serde(default = "default_true")]
    pub secure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MbtilesConfig {
    #[serde(default = "default_mbtiles_name")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub attribution: String,

    #[serde(default = "default_mbtiles_version")]
    pub version: String,

    #[serde(default = "default_mbtiles_format")]
    pub format: String,

    #[serde(default)]
    pub min_zoom: u8,

    #[serde(default = "default_mbtiles_max_zoom")]
    pub max_zoom: u8,

    /// `min_lon,min_lat,max_lon,max_lat`.
    #[serde(default = "default_mbtiles_bounds")]
    pub bounds: String,

    #[serde(rename = "type", default = "default_mbtiles_type")]
    pub kind: String,
}

// Default value functions

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_temp_download_dir() -> String {
    "/tmp/map_downloader".to_string()
}

fn default_true() -> bool {
    true
}

fn default_cleanup_after_days() -> u64 {
    7
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5
}

fn default_rotation_interval() -> u64 {
    60
}

fn default_max_failures() -> u32 {
    3
}

fn default_output_format() -> String {
    "files".to_string()
}

fn default_mbtiles_name() -> String {
    "map_tiles".to_string()
}

fn default_mbtiles_version() -> String {
    "1.0".to_string()
}

fn default_mbtiles_format() -> String {
    "png".to_string()
}

fn default_mbtiles_max_zoom() -> u8 {
    22
}

fn default_mbtiles_bounds() -> String {
    "-180.0,-85.0511,180.0,85.0511".to_string()
}

fn default_mbtiles_type() -> String {
    "baselayer".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            temp_download_dir: default_temp_download_dir(),
            cleanup_temp_files: default_true(),
            cleanup_after_days: default_cleanup_after_days(),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
            extra: BTreeMap::new(),
        }
    }
}

impl Default for IpPoolConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: String::new(),
            credentials: BTreeMap::new(),
            rotation_interval: default_rotation_interval(),
            max_failures: default_max_failures(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            compress: false,
            destinations: Vec::new(),
        }
    }
}

impl Default for MinioDestination {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket_name: String::new(),
            secure: default_true(),
            region: None,
        }
    }
}

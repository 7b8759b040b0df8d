use std::path::Path;

use maptile::AppConfig;
use maptile_test_utils::ENV_TEMPLATE;
use predicates::prelude::*;

mod common;

fn minio_target(config_file: &Path) -> (String, String) {
    let config = AppConfig::load(config_file).unwrap();
    let minio = config.minio_destinations().next().unwrap();
    (minio.endpoint.clone(), minio.bucket_name.clone())
}

#[test]
fn test_setup_creates_project_files() {
    let mut ctx = common::maptile();

    ctx.cmd
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment setup complete"));

    let layout = ctx.project.layout();
    assert_eq!(
        minio_target(&layout.config_file()),
        ("localhost:9000".to_string(), "map-tiles".to_string())
    );
    assert_eq!(std::fs::read_to_string(layout.env_file()).unwrap(), ENV_TEMPLATE);
    assert!(layout.temp_dir().is_dir());
}

#[test]
fn test_setup_rerun_keeps_existing_files() {
    let mut ctx = common::maptile();
    ctx.cmd.arg("setup").assert().success();

    let layout = ctx.project.layout();
    let edited = std::fs::read_to_string(layout.config_file())
        .unwrap()
        .replace("log_level: INFO", "log_level: DEBUG");
    std::fs::write(layout.config_file(), &edited).unwrap();

    ctx.new_cmd()
        .arg("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml: kept"))
        .stdout(predicate::str::contains(".env: kept"));

    assert_eq!(std::fs::read_to_string(layout.config_file()).unwrap(), edited);
}

#[test]
fn test_setup_uses_bucket_from_flag() {
    let mut ctx = common::maptile();

    ctx.cmd
        .args(["setup", "--bucket", "tiles-eu"])
        .assert()
        .success();

    let (_, bucket) = minio_target(&ctx.project.layout().config_file());
    assert_eq!(bucket, "tiles-eu");
}

#[test]
fn test_setup_uses_bucket_from_environment() {
    let mut ctx = common::maptile();

    ctx.cmd
        .env("MINIO_DEFAULT_BUCKETS", "tiles-us,tiles-archive")
        .arg("setup")
        .assert()
        .success();

    let (_, bucket) = minio_target(&ctx.project.layout().config_file());
    assert_eq!(bucket, "tiles-us");
}

#[test]
fn test_setup_without_template_fails() {
    let mut ctx = common::maptile_bare();

    ctx.cmd
        .arg("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("materialize_config"));

    assert!(!ctx.project.layout().env_file().exists());
}

#[test]
fn test_setup_writes_log_file() {
    let mut ctx = common::maptile();
    let log = ctx.root().join("logs").join("maptile.log");

    ctx.cmd
        .arg("-v")
        .arg("--log-file")
        .arg(&log)
        .arg("setup")
        .assert()
        .success();

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("Bootstrapping project"));
}

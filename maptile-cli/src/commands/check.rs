use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use comfy_table::Table;
use maptile::settings::SettingsOverrides;
use maptile::storage::{AliasRegistry, HttpHealthProbe, S3Connector};
use maptile::{MaptileError, ReadinessCheck, StepFailure};
use maptile_shared::constants::defaults;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Storage service URL (overrides MINIO_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Bucket that must exist (overrides MINIO_DEFAULT_BUCKETS)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Storage client alias to register or reuse
    #[arg(long)]
    pub alias: Option<String>,

    /// Storage client alias file [default: ~/.mc/config.json]
    #[arg(long, env = "MC_CONFIG_FILE")]
    pub alias_file: Option<PathBuf>,

    /// Per-step timeout in seconds
    #[arg(long, default_value_t = defaults::STEP_TIMEOUT_SECS)]
    pub timeout: u64,
}

pub async fn execute(args: CheckArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let settings = global.storage_settings(SettingsOverrides {
        endpoint: args.endpoint,
        bucket: args.bucket,
        alias: args.alias,
    })?;
    let timeout = Duration::from_secs(args.timeout.max(1));

    let alias_file = match args.alias_file {
        Some(path) => path,
        None => AliasRegistry::default_path()?,
    };
    let probe = HttpHealthProbe::new(&settings, timeout)?;

    println!("Checking storage at {} ...", settings.endpoint);
    let report = ReadinessCheck::new(
        settings.clone(),
        Box::new(probe),
        AliasRegistry::new(alias_file),
        Box::new(S3Connector),
    )
    .with_scratch_dir(std::env::temp_dir())
    .with_step_timeout(timeout)
    .run()
    .await
    .map_err(|failure| {
        let headline = headline(&failure, &settings);
        anyhow::Error::new(failure).context(headline)
    })?;

    if report.alias_registered {
        println!("Registered storage alias '{}'", settings.alias);
    }

    let mut table = Table::new();
    table.set_header(vec![format!("{} contents", settings.bucket)]);
    for key in &report.listing {
        table.add_row(vec![key.as_str()]);
    }
    println!("{table}");

    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }

    println!("Storage is ready: bucket '{}' is writable", settings.bucket);
    Ok(())
}

fn headline(failure: &StepFailure, settings: &maptile::StorageSettings) -> String {
    match (failure.step.as_str(), &failure.error) {
        (_, MaptileError::Timeout(_)) => {
            format!("Storage check timed out at step '{}'", failure.step)
        }
        ("liveness", _) => format!("Storage service is not live at {}", settings.endpoint),
        ("alias", _) => format!("Could not register storage alias '{}'", settings.alias),
        ("bucket", MaptileError::NotFound(_)) => {
            format!("Bucket '{}' does not exist", settings.bucket)
        }
        ("upload", _) => format!(
            "Smoke-test upload to bucket '{}' failed",
            settings.bucket
        ),
        (step, _) => format!("Storage check failed at step '{step}'"),
    }
}

use anyhow::Context;
use clap::Args;
use maptile::settings::SettingsOverrides;

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Bucket written into the generated configuration
    #[arg(long)]
    pub bucket: Option<String>,
}

pub async fn execute(args: SetupArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let layout = global.layout();
    let settings = global.storage_settings(SettingsOverrides {
        bucket: args.bucket,
        ..Default::default()
    })?;

    let report = maptile::run_bootstrap(layout.clone(), settings)
        .await
        .map_err(anyhow::Error::new)
        .with_context(|| format!("Environment setup failed in {}", layout.root().display()))?;

    let status = |created: bool| if created { "created" } else { "kept" };
    println!(
        "{}: {}",
        layout.config_file().display(),
        status(report.config_created)
    );
    println!(
        "{}: {}",
        layout.env_file().display(),
        status(report.env_created)
    );
    println!(
        "{}: permissions set on {} path(s)",
        layout.data_dir().display(),
        report.permissions_set
    );
    println!("Environment setup complete");
    Ok(())
}

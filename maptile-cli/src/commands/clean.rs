use std::path::PathBuf;

use clap::Args;
use maptile::AppConfig;
use maptile::config::GlobalConfig;
use maptile::housekeeping::clean_old_files;

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory to clean [default: global.temp_download_dir from the config]
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Remove files older than this many days [default: global.cleanup_after_days]
    #[arg(long)]
    pub days: Option<u64>,

    /// Keep files whose name ends with this suffix (repeatable)
    #[arg(long, value_name = "SUFFIX")]
    pub exclude: Vec<String>,

    /// Clean even when cleanup_temp_files is disabled
    #[arg(short, long)]
    pub force: bool,
}

pub async fn execute(args: CleanArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let layout = global.layout();
    let config_file = layout.config_file();

    let settings = if config_file.exists() {
        AppConfig::load(&config_file)?.global
    } else {
        tracing::debug!(path = %config_file.display(), "No configuration, using defaults");
        GlobalConfig::default()
    };

    if !settings.cleanup_temp_files && !args.force {
        println!("Temporary file cleanup is disabled in the configuration (use --force)");
        return Ok(());
    }

    let dir = match args.dir {
        Some(dir) => dir,
        None if config_file.exists() => layout.root().join(&settings.temp_download_dir),
        None => layout.temp_dir(),
    };
    let days = args.days.unwrap_or(settings.cleanup_after_days);

    let removed = clean_old_files(&dir, days, &args.exclude);
    println!(
        "Removed {removed} file(s) older than {days} day(s) from {}",
        dir.display()
    );
    Ok(())
}

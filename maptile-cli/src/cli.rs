use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use maptile::ProjectLayout;
use maptile::settings::{SettingsOverrides, StorageSettings, load_env_file};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::{
    check::CheckArgs, clean::CleanArgs, completions::CompletionsArgs, setup::SetupArgs,
    validate::ValidateArgs,
};

/// Map tile downloader environment tool
#[derive(Parser, Debug)]
#[command(name = "maptile", version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalFlags {
    /// Project directory holding config/, data/ and .env
    #[arg(long, global = true, env = "MAPTILE_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Also write logs to this file
    #[arg(long, global = true, env = "MAPTILE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalFlags {
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.root)
    }

    /// Resolve storage settings: flags, then the environment (including the
    /// project's `.env`), then defaults.
    pub fn storage_settings(&self, overrides: SettingsOverrides) -> anyhow::Result<StorageSettings> {
        load_env_file(&self.layout().env_file())?;
        let settings = StorageSettings::from_env()?.with_overrides(overrides)?;
        Ok(settings)
    }

    /// Install the global subscriber. The returned guard flushes the log
    /// file on drop and must outlive the command.
    pub fn init_logging(&self) -> anyhow::Result<Option<WorkerGuard>> {
        let filter = match self.verbose {
            0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            1 => EnvFilter::new("maptile=info,maptile_cli=info,warn"),
            2 => EnvFilter::new("maptile=debug,maptile_cli=debug,info"),
            _ => EnvFilter::new("trace"),
        };

        let (file_layer, guard) = match &self.log_file {
            Some(path) => {
                let (dir, name) = split_log_path(path)?;
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create log directory {}", dir.display()))?;

                let appender = tracing_appender::rolling::never(dir, name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .with(file_layer)
            .try_init()
            .context("failed to initialise logging")?;

        Ok(guard)
    }
}

fn split_log_path(path: &Path) -> anyhow::Result<(&Path, &std::ffi::OsStr)> {
    let name = path
        .file_name()
        .with_context(|| format!("invalid log file path {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok((dir, name))
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare the project directory: folders, config, permissions, .env
    Setup(SetupArgs),

    /// Verify the object storage service end to end
    Check(CheckArgs),

    /// Validate the downloader configuration file
    Validate(ValidateArgs),

    /// Remove stale temporary downloads
    Clean(CleanArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

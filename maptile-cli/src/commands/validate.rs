use std::path::PathBuf;

use clap::Args;
use comfy_table::Table;
use maptile::AppConfig;
use maptile::config::Destination;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file [default: <root>/config/config.yaml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: ValidateArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let path = args.config.unwrap_or_else(|| global.layout().config_file());
    let config = AppConfig::load(&path)?;

    let problems = config.problems();
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  - {problem}");
        }
        anyhow::bail!(
            "{} problem(s) found in {}",
            problems.len(),
            path.display()
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Section", "Entry", "Details"]);
    for source in &config.sources {
        let zooms = source
            .zoom_levels
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",");
        table.add_row(vec![
            "source".to_string(),
            source.name.clone(),
            format!("zoom {zooms}"),
        ]);
    }
    for destination in &config.output.destinations {
        let (kind, details) = match destination {
            Destination::Local { path } => ("local", path.clone()),
            Destination::Minio(minio) => (
                "minio",
                format!("{}/{}", minio.endpoint, minio.bucket_name),
            ),
        };
        table.add_row(vec![
            "destination".to_string(),
            kind.to_string(),
            details,
        ]);
    }

    println!("{table}");
    println!("Configuration OK: {}", path.display());
    Ok(())
}

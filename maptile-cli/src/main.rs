mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match cli.global.init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Setup(args) => commands::setup::execute(args, &cli.global).await,
        Commands::Check(args) => commands::check::execute(args, &cli.global).await,
        Commands::Validate(args) => commands::validate::execute(args, &cli.global).await,
        Commands::Clean(args) => commands::clean::execute(args, &cli.global).await,
        Commands::Completions(args) => commands::completions::execute(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

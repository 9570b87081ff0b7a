//! Vitrine CLI entry point.

use anyhow::Result;
use clap::Parser;

use vitrine::cli::{commands, Cli, Commands};
use vitrine::infrastructure::{config::ConfigLoader, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    logging::init(&config.logging);

    match cli.command {
        Commands::Serve(args) => commands::serve(config, args).await,
        Commands::Refresh => commands::refresh(config).await,
        Commands::Config => commands::show_config(&config),
    }
}

//! Command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};

/// Vitrine catalog listing engine.
#[derive(Debug, Parser)]
#[command(name = "vitrine", version, about)]
pub struct Cli {
    /// Path to a configuration file (overrides the .vitrine/ lookup).
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP listing server.
    Serve(commands::ServeArgs),
    /// Load the catalog once and print snapshot statistics.
    Refresh,
    /// Print the effective configuration.
    Config,
}

//! CLI command implementations.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use crate::adapters::http;
use crate::adapters::sqlite::{DatabaseConnection, SqliteCatalogStore};
use crate::domain::models::Config;
use crate::domain::ports::CatalogStore;
use crate::services::SnapshotManager;

/// Arguments for `vitrine serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides configuration).
    #[arg(long)]
    pub port: Option<u16>,

    /// Host to bind (overrides configuration).
    #[arg(long)]
    pub host: Option<String>,
}

/// Run the HTTP listing server.
pub async fn serve(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    http::serve(config).await
}

/// Load the catalog once and print snapshot statistics.
pub async fn refresh(config: Config) -> Result<()> {
    let db = DatabaseConnection::new(&config.database.url).await?;
    db.init_schema().await?;
    let store: Arc<dyn CatalogStore> = Arc::new(SqliteCatalogStore::new(db.pool().clone()));

    let snapshots = SnapshotManager::new(store, config.snapshot.max_staleness());
    let snapshot = snapshots.force_refresh().await?;
    println!("loaded {} items", snapshot.item_count());
    Ok(())
}

/// Print the effective configuration as YAML-ish JSON.
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

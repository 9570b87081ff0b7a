//! SQLite-backed document store adapter.

pub mod catalog_store;
pub mod connection;

pub use catalog_store::SqliteCatalogStore;
pub use connection::DatabaseConnection;

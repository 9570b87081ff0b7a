//! Domain errors for the Vitrine catalog engine.

use thiserror::Error;

/// Domain-level errors that can occur in the Vitrine system.
///
/// Failures local to caching (snapshot load, cache I/O, invalidation) are
/// recovered silently with degraded performance and never surfaced as request
/// errors; only document-store write failures and a total absence of catalog
/// data produce user-visible errors.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Snapshot unavailable: no snapshot loaded and the catalog store is unreachable: {0}")]
    SnapshotUnavailable(String),

    #[error("Catalog store error: {0}")]
    Store(String),

    #[error("Cache backend error: {0}")]
    CacheBackend(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown counter field: {0}")]
    UnknownCounterField(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

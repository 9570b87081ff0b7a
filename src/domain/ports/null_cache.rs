//! Null cache backend implementation.
//!
//! Used when result caching is disabled but the type system requires a
//! `CacheBackend` implementation; every lookup is a miss.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::CacheBackend;
use crate::domain::errors::DomainResult;

/// A no-op cache backend that stores nothing.
#[derive(Debug, Clone, Default)]
pub struct NullCacheBackend;

impl NullCacheBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheBackend for NullCacheBackend {
    async fn get(&self, _key: &str) -> DomainResult<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> DomainResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> DomainResult<()> {
        Ok(())
    }

    async fn delete_by_pattern(&self, _pattern: &str) -> DomainResult<u64> {
        Ok(0)
    }
}

//! Adapters: concrete implementations of the domain ports plus the HTTP API.

pub mod cache;
pub mod http;
pub mod sqlite;

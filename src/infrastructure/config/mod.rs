//! Configuration loading with hierarchical merging.

mod loader;

pub use loader::{ConfigError, ConfigLoader};

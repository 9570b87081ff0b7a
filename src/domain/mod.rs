//! Domain layer: pure business logic, models, errors, and ports.

pub mod errors;
pub mod models;
pub mod ports;

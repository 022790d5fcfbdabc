pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod server;

// Value objects shared across layers
pub mod domain;

// Validation and event parsing
pub mod pipeline;

// Use cases and the ports they depend on, plus concrete adapters
pub mod app;
pub mod infra;

pub mod observability;

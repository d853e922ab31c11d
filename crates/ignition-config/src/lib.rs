//! # Ignition Config
//!
//! TOML configuration loading for the Ignition runtime: bootstrap
//! parameters, per-module configuration tables, environment variable
//! substitution and path expansion.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{IgnitionConfig, RuntimeSection};

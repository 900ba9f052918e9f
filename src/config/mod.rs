//! Configuration module
//!
//! Settings read from `config.toml` in the platform config directory.

pub mod config;

pub use config::{ApiConfig, Config, OutputConfig};

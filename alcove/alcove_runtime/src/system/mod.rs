//! System configuration for the Alcove runner.

pub mod config;

pub use config::{LoggingConfig, PackageConfig, RunnerConfig};

//! Parsing and validation of `ember.toml` project configuration files.
//!
//! This crate reads the project configuration file and resolves it, together
//! with command-line overrides, into an immutable [`PipelineConfig`] that a
//! single pipeline run consumes.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_project_root, load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_pipeline, ConfigOverrides, PipelineConfig, Toolchain};
pub use types::*;

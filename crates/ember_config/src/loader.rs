//! Configuration file discovery, loading, and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "ember.toml";

/// Walks up from `start` looking for the nearest directory containing `ember.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ConfigError::ProjectNotFound(start.to_path_buf()));
        }
    }
}

/// Loads and validates an `ember.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `ember.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are usable.
///
/// Whether sources and a target are present is checked by the pipeline, since
/// command-line overrides may still supply them.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    let ext = &config.toolchain.object_extension;
    if ext.is_empty() || ext.starts_with('.') {
        return Err(ConfigError::ValidationError(format!(
            "toolchain.object_extension must be a bare extension, got '{ext}'"
        )));
    }
    for fs in config.build.sources.iter().chain(&config.build.more_sources) {
        if fs.include.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "file set '{}' has an empty include pattern",
                fs.dir
            )));
        }
    }
    Ok(())
}

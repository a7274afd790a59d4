//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Loads and validates a `quill.toml` configuration from a project directory.
///
/// Reads `<project_dir>/quill.toml`, parses it, and validates required
/// fields.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join("quill.toml");
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `quill.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.project.version.is_empty() {
        return Err(ConfigError::MissingField("project.version".to_string()));
    }
    if config.output.path.is_empty() {
        return Err(ConfigError::MissingField("output.path".to_string()));
    }
    if config.input.sources.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one [[input.sources]] directory is required".to_string(),
        ));
    }
    if config.input.sources.iter().any(|s| s.path.is_empty()) {
        return Err(ConfigError::MissingField("input.sources.path".to_string()));
    }
    if config.output.segment_length == 0 {
        return Err(ConfigError::ValidationError(
            "output.segment_length must be positive".to_string(),
        ));
    }
    Ok(())
}

//! Configuration types deserialized from `quill.toml`.

use serde::Deserialize;

/// The top-level project configuration parsed from `quill.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version, description).
    pub project: ProjectMeta,
    /// The directories contributing files to the build.
    #[serde(default)]
    pub input: InputConfig,
    /// Output location and packaging settings.
    pub output: OutputConfig,
}

/// Core project metadata required in every `quill.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name, shown in the generated documentation.
    pub name: String,
    /// The project version string.
    pub version: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// The set of input directories.
#[derive(Debug, Default, Deserialize)]
pub struct InputConfig {
    /// Source directories scanned for documentation content. At least one
    /// is required; they are numbered from 1 in this order.
    #[serde(default)]
    pub sources: Vec<SourceDir>,
    /// Standalone image directories.
    #[serde(default)]
    pub images: Vec<ImageDir>,
}

/// One source directory.
#[derive(Debug, Deserialize)]
pub struct SourceDir {
    /// Path to the directory, relative to the project root or absolute.
    pub path: String,
    /// Optional display name shown in the menu when several sources exist.
    #[serde(default)]
    pub name: Option<String>,
}

/// One standalone image directory.
#[derive(Debug, Deserialize)]
pub struct ImageDir {
    /// Path to the directory, relative to the project root or absolute.
    pub path: String,
}

/// Output location and packaging settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// The output directory, relative to the project root or absolute.
    pub path: String,
    /// The amount of data to aim for in each menu segment before splitting
    /// it off into another one.
    #[serde(default = "default_segment_length")]
    pub segment_length: usize,
}

fn default_segment_length() -> usize {
    32 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_length_defaults_to_32k() {
        let config: OutputConfig = toml::from_str("path = \"docs\"").unwrap();
        assert_eq!(config.segment_length, 32 * 1024);
    }

    #[test]
    fn input_config_defaults_empty() {
        let input = InputConfig::default();
        assert!(input.sources.is_empty());
        assert!(input.images.is_empty());
    }
}

//! Project configuration for the Quill documentation generator.
//!
//! A project is described by a `quill.toml` at its root: project metadata,
//! the source and image directories contributing files, and output settings.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::{ImageDir, InputConfig, OutputConfig, ProjectConfig, ProjectMeta, SourceDir};

//! Shared helpers for CLI commands: project root resolution and the mapping
//! from configuration to file sources.

use std::path::{Path, PathBuf};

use quill_config::ProjectConfig;
use quill_files::{FileSource, InputType};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `quill.toml`.
///
/// Returns the directory containing `quill.toml`, or an error if none is
/// found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join("quill.toml").exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find quill.toml in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself). Otherwise walks up from the current directory looking for
/// `quill.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// Builds the numbered file source list from the configuration.
///
/// Source directories come first in configuration order, standalone image
/// directories after them; numbering continues across both so hash-path
/// prefixes stay stable. Relative paths are resolved against the project
/// root.
pub fn configured_sources(project_dir: &Path, config: &ProjectConfig) -> Vec<FileSource> {
    let resolve = |p: &str| -> PathBuf {
        let path = PathBuf::from(p);
        if path.is_absolute() {
            path
        } else {
            project_dir.join(path)
        }
    };

    let mut sources = Vec::new();
    let mut number = 1;

    for dir in &config.input.sources {
        let mut source = FileSource::new(number, resolve(&dir.path), InputType::Source);
        if let Some(name) = &dir.name {
            source = source.with_name(name.clone());
        }
        sources.push(source);
        number += 1;
    }

    for dir in &config.input.images {
        sources.push(FileSource::new(number, resolve(&dir.path), InputType::Image));
        number += 1;
    }

    sources
}

//! Configured roots that contribute files to a build.

use std::path::{Path, PathBuf};

/// What a file source contributes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputType {
    /// Documentation source files; these appear in the output menu.
    Source,
    /// Standalone image folders; tracked for reference but never listed in
    /// the menu.
    Image,
}

/// A configured root directory contributing files to the build.
///
/// Sources are numbered from 1 in configuration order. The number feeds into
/// output hash paths, where source 1 omits it (`Files:` vs `Files2:`), so
/// the numbering must be stable across builds for output to be reproducible.
#[derive(Clone, Debug)]
pub struct FileSource {
    /// 1-based source number, stable across builds.
    pub number: u32,
    /// Optional display name; shown instead of the folder name when several
    /// sources exist.
    pub name: Option<String>,
    /// Absolute root directory of this source.
    pub root: PathBuf,
    /// What this source contributes.
    pub input_type: InputType,
}

impl FileSource {
    /// Creates a source with no display name.
    pub fn new(number: u32, root: PathBuf, input_type: InputType) -> Self {
        Self {
            number,
            name: None,
            root,
            input_type,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns `true` if `path` lies under this source's root.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Returns `path` relative to this source's root, or `None` if the path
    /// is outside it.
    pub fn relative_path<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.root).ok()
    }

    /// The name shown for this source in the menu: the explicit display name
    /// if set, otherwise the root's final path component.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("Source {}", self.number))
    }
}

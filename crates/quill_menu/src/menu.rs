//! In-memory construction of the file hierarchy.
//!
//! The tree is rebuilt from scratch every build: register the configured
//! file sources, insert every file that has extractable content, then
//! condense and sort. Nothing here persists between builds; the only carried
//! state is the file table (for reparse decisions) and the previous segment
//! ID set (for cleanup), both owned elsewhere.

use std::path::{Component, PathBuf};

use quill_common::{CancelToken, Cancelled, FileId};
use quill_files::{FileRecord, FileSource};

/// A file leaf in the builder tree.
#[derive(Debug)]
pub(crate) struct FileLeaf {
    /// Raw file name (final path component).
    pub name: String,
    /// Stable identity, used as the deterministic sort tie-break.
    pub id: FileId,
}

/// A folder node in the builder tree.
///
/// `names` holds the raw path components this node spans: one element
/// normally, the whole merged chain after condensation. No parent pointers —
/// hash paths are computed top-down at serialization time.
#[derive(Debug, Default)]
pub(crate) struct Folder {
    pub names: Vec<String>,
    pub folders: Vec<Folder>,
    pub files: Vec<FileLeaf>,
}

impl Folder {
    fn child_named(&mut self, name: &str) -> Option<usize> {
        self.folders
            .iter()
            .position(|f| f.names.len() == 1 && f.names[0] == name)
    }
}

/// One registered file source and the subtree built beneath it.
#[derive(Debug)]
pub(crate) struct SourceTree {
    pub number: u32,
    pub display_name: String,
    pub root_path: PathBuf,
    pub folder: Folder,
}

/// Builder for the project's file/folder hierarchy.
///
/// All sources must be registered before any file is added; inserting a file
/// that no registered source contains is a caller bug, not a recoverable
/// condition. Phase operations take a [`CancelToken`] checked at the
/// documented boundaries; on cancellation the caller drops the whole `Menu`
/// rather than publishing a half-processed tree.
#[derive(Debug, Default)]
pub struct Menu {
    pub(crate) sources: Vec<SourceTree>,
}

impl Menu {
    /// Creates an empty menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file source root contributing files to the menu.
    pub fn add_file_source(&mut self, source: &FileSource) {
        self.sources.push(SourceTree {
            number: source.number,
            display_name: source.display_name(),
            root_path: source.root.clone(),
            folder: Folder::default(),
        });
        // Registration order is configuration order; keep source numbers
        // authoritative for output stability.
        self.sources.sort_by_key(|s| s.number);
    }

    /// Number of registered sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if no files have been added.
    pub fn is_empty(&self) -> bool {
        self.sources
            .iter()
            .all(|s| s.folder.folders.is_empty() && s.folder.files.is_empty())
    }

    /// Inserts a file at the folder path implied by its location relative to
    /// its owning source, creating intermediate folders as needed.
    ///
    /// # Panics
    ///
    /// Panics if no registered source contains the file's path; sources must
    /// all be registered before files are added.
    pub fn add_file(&mut self, record: &FileRecord) {
        // Deepest matching root wins if sources nest.
        let source = self
            .sources
            .iter_mut()
            .filter(|s| record.path.starts_with(&s.root_path))
            .max_by_key(|s| s.root_path.as_os_str().len())
            .unwrap_or_else(|| {
                panic!(
                    "file {} does not belong to any registered source",
                    record.path.display()
                )
            });

        let relative = record
            .path
            .strip_prefix(&source.root_path)
            .expect("matched source no longer contains path");

        let mut components: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        let file_name = match components.pop() {
            Some(name) => name,
            None => return, // the source root itself, nothing to list
        };

        let mut folder = &mut source.folder;
        for name in components {
            let index = match folder.child_named(&name) {
                Some(i) => i,
                None => {
                    folder.folders.push(Folder {
                        names: vec![name],
                        ..Folder::default()
                    });
                    folder.folders.len() - 1
                }
            };
            folder = &mut folder.folders[index];
        }

        folder.files.push(FileLeaf {
            name: file_name,
            id: record.id,
        });
    }

    /// Inserts a batch of files, checking for cancellation between
    /// insertions.
    pub fn add_files<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a FileRecord>,
        cancel: &CancelToken,
    ) -> Result<(), Cancelled> {
        for record in records {
            cancel.check()?;
            self.add_file(record);
        }
        Ok(())
    }

    /// Collapses every folder chain in which each folder down to some
    /// descendant has exactly one child folder and no files, merging their
    /// names into one composite entry.
    pub fn condense(&mut self, cancel: &CancelToken) -> Result<(), Cancelled> {
        cancel.check()?;
        for source in &mut self.sources {
            condense_children(&mut source.folder);
        }
        Ok(())
    }

    /// Orders every level: folders before files, case-insensitive
    /// lexicographic within each kind, with stable tie-breaks so identical
    /// inputs always produce identical output.
    pub fn sort(&mut self, cancel: &CancelToken) -> Result<(), Cancelled> {
        cancel.check()?;
        for source in &mut self.sources {
            sort_folder(&mut source.folder);
        }
        Ok(())
    }
}

/// Condenses the subtrees below `folder` (the folder itself keeps its
/// identity; only descendants merge upward into its children).
fn condense_children(folder: &mut Folder) {
    for child in &mut folder.folders {
        while child.files.is_empty() && child.folders.len() == 1 {
            let grandchild = child.folders.pop().expect("length checked");
            child.names.extend(grandchild.names);
            child.folders = grandchild.folders;
            child.files = grandchild.files;
        }
        condense_children(child);
    }
}

fn sort_folder(folder: &mut Folder) {
    folder.folders.sort_by(|a, b| {
        let a_key = a.names.join("/");
        let b_key = b.names.join("/");
        a_key
            .to_lowercase()
            .cmp(&b_key.to_lowercase())
            .then_with(|| a_key.cmp(&b_key))
    });
    folder.files.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    for child in &mut folder.folders {
        sort_folder(child);
    }
}

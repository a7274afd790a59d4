//! Filesystem scanning and change detection against the file table.
//!
//! A scan walks every configured source root, brings the table in line with
//! what is actually on disk, and reports which files are new, modified,
//! deleted, or unchanged since the cached state. The parser collaborator
//! consumes the dirty set; everything else can be skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use quill_common::{CancelToken, Cancelled};

use crate::record::{FileType, ImageDimensions, ModTime};
use crate::sources::{FileSource, InputType};
use crate::table::FileTable;

/// Result of comparing a filesystem scan against the cached file table.
///
/// Paths in each category are sorted for deterministic consumption.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Files not previously tracked.
    pub added: Vec<PathBuf>,
    /// Files whose modification time (or type) no longer matches the table.
    pub modified: Vec<PathBuf>,
    /// Files that were tracked but no longer exist on disk.
    pub deleted: Vec<PathBuf>,
    /// Files whose cached state still matches.
    pub unchanged: Vec<PathBuf>,
}

impl ChangeSet {
    /// Returns `true` if nothing was added, modified, or deleted.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Number of files that need reprocessing.
    pub fn dirty_count(&self) -> usize {
        self.added.len() + self.modified.len()
    }
}

/// Scans all source roots and reconciles the table with the filesystem.
///
/// New files are tracked under freshly allocated IDs, changed files have
/// their modification times updated (image dimensions reset to unknown so
/// the parser recomputes them), and vanished files are removed from the
/// table. Unreadable directories and files are skipped; they surface as
/// deletions, which degrades to a reparse rather than a failure.
///
/// Cancellation is checked once per directory; on cancellation the caller
/// must discard the build (the table is not saved).
pub fn scan(
    sources: &[FileSource],
    table: &mut FileTable,
    cancel: &CancelToken,
) -> Result<ChangeSet, Cancelled> {
    let mut changes = ChangeSet::default();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    for source in sources {
        let mut found = Vec::new();
        walk_dir(&source.root, source.input_type, &mut found, cancel)?;

        for (path, file_type) in found {
            seen.insert(path.clone());
            let mod_time = file_mod_time(&path);
            reconcile(table, path, file_type, mod_time, &mut changes);
        }
    }

    let vanished: Vec<_> = table
        .iter()
        .filter(|r| !seen.contains(&r.path))
        .map(|r| r.id)
        .collect();
    for id in vanished {
        if let Some(record) = table.remove(id) {
            changes.deleted.push(record.path);
        }
    }

    changes.added.sort();
    changes.modified.sort();
    changes.deleted.sort();
    changes.unchanged.sort();
    Ok(changes)
}

/// Updates the table for one on-disk file and records the outcome.
fn reconcile(
    table: &mut FileTable,
    path: PathBuf,
    file_type: FileType,
    mod_time: ModTime,
    changes: &mut ChangeSet,
) {
    let Some(record) = table.get_mut_by_path(&path) else {
        table.add_new(path.clone(), file_type, mod_time);
        changes.added.push(path);
        return;
    };

    if record.file_type != file_type {
        // Reclassified (e.g. an extension rename re-scanned before the old
        // record aged out). Keep the ID; the content must be reparsed.
        record.file_type = file_type;
        record.dimensions = match file_type {
            FileType::Image => Some(ImageDimensions::UNKNOWN),
            _ => None,
        };
        record.last_modified = mod_time;
        changes.modified.push(path);
    } else if record.last_modified != mod_time {
        record.last_modified = mod_time;
        if record.file_type == FileType::Image {
            record.dimensions = Some(ImageDimensions::UNKNOWN);
        }
        changes.modified.push(path);
    } else {
        changes.unchanged.push(path);
    }
}

/// Recursively collects tracked files under `dir`, sorted for determinism.
fn walk_dir(
    dir: &Path,
    input_type: InputType,
    out: &mut Vec<(PathBuf, FileType)>,
    cancel: &CancelToken,
) -> Result<(), Cancelled> {
    cancel.check()?;

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(()),
    };

    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk_dir(&path, input_type, out, cancel)?;
        } else {
            let file_type = classify(&path);
            match input_type {
                // Image folders contribute only images.
                InputType::Image if file_type != FileType::Image => continue,
                _ => out.push((path, file_type)),
            }
        }
    }
    Ok(())
}

/// Reads a file's modification time, unknown if unavailable.
fn file_mod_time(path: &Path) -> ModTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(ModTime::from_system_time)
        .unwrap_or(ModTime::UNKNOWN)
}

/// Classifies a file by extension.
fn classify(path: &Path) -> FileType {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileType::Binary;
    };
    match ext.to_ascii_lowercase().as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "bmp" | "webp" => FileType::Image,
        "md" | "txt" | "rs" | "c" | "h" | "cpp" | "hpp" | "cc" | "cs" | "js" | "ts" | "py"
        | "java" | "rb" | "go" | "sh" | "pl" | "lua" | "toml" | "json" | "yaml" | "yml"
        | "html" | "css" => FileType::Text,
        _ => FileType::Binary,
    }
}

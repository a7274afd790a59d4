//! Writing, retiring, and bookkeeping of menu segment files.
//!
//! Segments land in `<output>/menu/` as `files.js` (the entry point) and
//! `files<id>.js`. The set of IDs written by the previous build persists in
//! `segments.json` purely so the next build can delete chunks it no longer
//! produces; it is an explicit value loaded at build start and rewritten at
//! build end, not hidden global state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::entry::SegmentId;
use crate::error::MenuError;
use crate::serialize::Segment;

/// Name of the persisted segment-ID state file within the menu folder.
const STATE_FILE: &str = "segments.json";

/// The set of segment IDs produced by a build.
///
/// Persisted between builds only to support cleanup; it caches identity, not
/// content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSet {
    segments: BTreeSet<SegmentId>,
}

impl SegmentSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment ID.
    pub fn insert(&mut self, id: SegmentId) {
        self.segments.insert(id);
    }

    /// Returns `true` if `id` is in the set.
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains(&id)
    }

    /// Iterates over IDs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.segments.iter().copied()
    }

    /// Number of IDs in the set.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Loads the previous build's set from the menu folder.
    ///
    /// Fail-safe: a missing or unreadable state file yields the empty set,
    /// which simply means no stale segments get cleaned this run.
    pub fn load(menu_dir: &Path) -> Self {
        let path = menu_dir.join(STATE_FILE);
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Persists this set as the previous-build state for the next run.
    pub fn save(&self, menu_dir: &Path) -> Result<(), MenuError> {
        std::fs::create_dir_all(menu_dir).map_err(|e| MenuError::Io {
            path: menu_dir.to_path_buf(),
            source: e,
        })?;
        let json = serde_json::to_string_pretty(self).map_err(|e| MenuError::State {
            reason: e.to_string(),
        })?;
        let path = menu_dir.join(STATE_FILE);
        std::fs::write(&path, json).map_err(|e| MenuError::Io { path, source: e })
    }
}

impl FromIterator<SegmentId> for SegmentSet {
    fn from_iter<I: IntoIterator<Item = SegmentId>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

/// Writes segment files and retires the ones a build no longer produces.
pub struct SegmentWriter {
    menu_dir: PathBuf,
}

impl SegmentWriter {
    /// Creates a writer rooted at `<output_dir>/menu`.
    pub fn new(output_dir: &Path) -> Self {
        Self {
            menu_dir: output_dir.join("menu"),
        }
    }

    /// The folder holding all menu segment files.
    pub fn menu_dir(&self) -> &Path {
        &self.menu_dir
    }

    /// The output path for a segment: `files.js` for the entry point,
    /// `files<id>.js` otherwise.
    pub fn segment_path(&self, id: SegmentId) -> PathBuf {
        if id == SegmentId::ROOT {
            self.menu_dir.join("files.js")
        } else {
            self.menu_dir.join(format!("files{id}.js"))
        }
    }

    /// Writes every segment to its per-ID location and returns the ID set.
    ///
    /// Each segment is written whole or not at all, but segments are
    /// independent: a failure on one does not roll back the others. Any
    /// write failure is fatal for the build.
    pub fn write_segments(&self, segments: &[Segment]) -> Result<SegmentSet, MenuError> {
        std::fs::create_dir_all(&self.menu_dir).map_err(|e| MenuError::Io {
            path: self.menu_dir.clone(),
            source: e,
        })?;

        let mut written = SegmentSet::new();
        for segment in segments {
            let path = self.segment_path(segment.id);
            std::fs::write(&path, &segment.payload)
                .map_err(|e| MenuError::Io { path, source: e })?;
            written.insert(segment.id);
        }
        Ok(written)
    }

    /// Deletes the file of every ID in `previous` that `current` no longer
    /// produces.
    ///
    /// A file or directory that is already gone is fine — cleanup is
    /// idempotent. Any other deletion failure propagates.
    pub fn retire_stale(
        &self,
        previous: &SegmentSet,
        current: &SegmentSet,
    ) -> Result<(), MenuError> {
        for id in previous.iter() {
            if current.contains(id) {
                continue;
            }
            let path = self.segment_path(id);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(MenuError::Io { path, source: e }),
            }
        }
        Ok(())
    }
}

//! The table of tracked files, keyed by stable ID with a path index.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use quill_common::FileId;

use crate::error::FilesError;
use crate::record::{FileRecord, FileType, ModTime};

/// The ID → record table for every file known to the build.
///
/// The table is the sole owner of the ID assignment: IDs are handed out by a
/// monotonic allocator and never reused while a record with that ID is still
/// tracked, so references held elsewhere in the build stay valid. Iteration
/// is in ascending ID order, which keeps saves and anything derived from a
/// full walk deterministic.
#[derive(Debug, Default)]
pub struct FileTable {
    records: BTreeMap<FileId, FileRecord>,
    by_path: HashMap<PathBuf, FileId>,
    next_id: u32,
}

impl FileTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            by_path: HashMap::new(),
            next_id: 1,
        }
    }

    /// Inserts a record whose ID was assigned elsewhere (cache load).
    ///
    /// Fails on an ID or path that is already tracked; the allocator is
    /// advanced past the inserted ID so later [`add_new`](Self::add_new)
    /// calls cannot collide.
    pub fn insert(&mut self, record: FileRecord) -> Result<(), FilesError> {
        if self.records.contains_key(&record.id) {
            return Err(FilesError::DuplicateId { id: record.id });
        }
        if self.by_path.contains_key(&record.path) {
            return Err(FilesError::DuplicatePath {
                path: record.path.clone(),
            });
        }
        self.next_id = self.next_id.max(record.id.as_raw() + 1);
        self.by_path.insert(record.path.clone(), record.id);
        self.records.insert(record.id, record);
        Ok(())
    }

    /// Tracks a newly discovered file, allocating the next free ID.
    pub fn add_new(&mut self, path: PathBuf, file_type: FileType, last_modified: ModTime) -> FileId {
        let id = FileId::from_raw(self.next_id);
        self.next_id += 1;
        let record = FileRecord::new(id, path.clone(), file_type, last_modified);
        self.by_path.insert(path, id);
        self.records.insert(id, record);
        id
    }

    /// Looks up a record by ID.
    pub fn get(&self, id: FileId) -> Option<&FileRecord> {
        self.records.get(&id)
    }

    /// Looks up a record by ID for mutation.
    pub fn get_mut(&mut self, id: FileId) -> Option<&mut FileRecord> {
        self.records.get_mut(&id)
    }

    /// Looks up a record by its path (the natural key for scan matching).
    pub fn get_by_path(&self, path: &Path) -> Option<&FileRecord> {
        self.by_path.get(path).and_then(|id| self.records.get(id))
    }

    /// Looks up a record by path for mutation.
    pub fn get_mut_by_path(&mut self, path: &Path) -> Option<&mut FileRecord> {
        match self.by_path.get(path) {
            Some(id) => self.records.get_mut(id),
            None => None,
        }
    }

    /// Stops tracking a file, returning its record.
    ///
    /// The ID is retired, not recycled; the allocator never hands it out
    /// again within this table's lifetime.
    pub fn remove(&mut self, id: FileId) -> Option<FileRecord> {
        let record = self.records.remove(&id)?;
        self.by_path.remove(&record.path);
        Some(record)
    }

    /// Iterates over records in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    /// Iterates over records in ascending ID order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FileRecord> {
        self.records.values_mut()
    }

    /// All tracked IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.records.keys().copied()
    }

    /// Number of tracked files.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no files are tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u32, path: &str) -> FileRecord {
        FileRecord::new(
            FileId::from_raw(id),
            PathBuf::from(path),
            FileType::Text,
            ModTime::from_ticks(100),
        )
    }

    #[test]
    fn insert_and_lookup() {
        let mut table = FileTable::new();
        table.insert(record(3, "/src/a.md")).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(FileId::from_raw(3)).unwrap().path,
            PathBuf::from("/src/a.md")
        );
        assert_eq!(
            table.get_by_path(Path::new("/src/a.md")).unwrap().id,
            FileId::from_raw(3)
        );
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut table = FileTable::new();
        table.insert(record(1, "/src/a.md")).unwrap();
        let err = table.insert(record(1, "/src/b.md")).unwrap_err();
        assert!(matches!(err, FilesError::DuplicateId { .. }));
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut table = FileTable::new();
        table.insert(record(1, "/src/a.md")).unwrap();
        let err = table.insert(record(2, "/src/a.md")).unwrap_err();
        assert!(matches!(err, FilesError::DuplicatePath { .. }));
    }

    #[test]
    fn add_new_allocates_sequential_ids() {
        let mut table = FileTable::new();
        let a = table.add_new(PathBuf::from("/src/a.md"), FileType::Text, ModTime::UNKNOWN);
        let b = table.add_new(PathBuf::from("/src/b.md"), FileType::Text, ModTime::UNKNOWN);
        assert_eq!(a.as_raw(), 1);
        assert_eq!(b.as_raw(), 2);
    }

    #[test]
    fn allocator_skips_past_inserted_ids() {
        let mut table = FileTable::new();
        table.insert(record(10, "/src/a.md")).unwrap();
        let id = table.add_new(PathBuf::from("/src/b.md"), FileType::Text, ModTime::UNKNOWN);
        assert_eq!(id.as_raw(), 11);
    }

    #[test]
    fn removed_id_is_not_recycled() {
        let mut table = FileTable::new();
        let a = table.add_new(PathBuf::from("/src/a.md"), FileType::Text, ModTime::UNKNOWN);
        table.remove(a).unwrap();
        let b = table.add_new(PathBuf::from("/src/b.md"), FileType::Text, ModTime::UNKNOWN);
        assert_ne!(a, b);
    }

    #[test]
    fn remove_clears_path_index() {
        let mut table = FileTable::new();
        let a = table.add_new(PathBuf::from("/src/a.md"), FileType::Text, ModTime::UNKNOWN);
        table.remove(a).unwrap();
        assert!(table.get_by_path(Path::new("/src/a.md")).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn iteration_is_in_id_order() {
        let mut table = FileTable::new();
        table.insert(record(5, "/src/e.md")).unwrap();
        table.insert(record(2, "/src/b.md")).unwrap();
        table.insert(record(9, "/src/i.md")).unwrap();
        let ids: Vec<u32> = table.iter().map(|r| r.id.as_raw()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn get_mut_by_path_allows_updates() {
        let mut table = FileTable::new();
        table.add_new(PathBuf::from("/src/a.md"), FileType::Text, ModTime::UNKNOWN);
        table
            .get_mut_by_path(Path::new("/src/a.md"))
            .unwrap()
            .last_modified = ModTime::from_ticks(42);
        assert_eq!(
            table
                .get_by_path(Path::new("/src/a.md"))
                .unwrap()
                .last_modified,
            ModTime::from_ticks(42)
        );
    }
}

//! Integration tests for the scan → save → load incremental state cycle.
//!
//! These exercise the whole file state subsystem against real on-disk
//! project layouts: a first build scans and persists the table, later
//! builds reload it and skip everything that has not changed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use quill_common::CancelToken;
use quill_files::{
    load_cache, save_cache, scan, FileSource, FileTable, FileType, InputType,
    CACHE_FORMAT_VERSION,
};

fn project_source(dir: &Path) -> Vec<FileSource> {
    vec![FileSource::new(
        1,
        dir.to_path_buf(),
        InputType::Source,
    )]
}

fn write_tree(root: &Path) -> Vec<PathBuf> {
    let sub = root.join("guide");
    std::fs::create_dir_all(&sub).unwrap();
    let a = root.join("index.md");
    let b = sub.join("install.md");
    let c = sub.join("banner.png");
    std::fs::write(&a, "# Index").unwrap();
    std::fs::write(&b, "# Install").unwrap();
    std::fs::write(&c, "not really a png").unwrap();
    vec![a, b, c]
}

#[test]
fn second_build_skips_unchanged_files() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(&src);
    let cache_path = dir.path().join(".quill").join("files.qbin");
    let sources = project_source(&src);

    // First build: everything is new.
    {
        let mut load = load_cache(&cache_path, CACHE_FORMAT_VERSION);
        assert!(!load.reusable);
        let changes = scan(&sources, &mut load.table, &CancelToken::new()).unwrap();
        assert_eq!(changes.added.len(), 3);
        save_cache(&cache_path, &load.table).unwrap();
    }

    // Second build: the cache is reusable and nothing changed.
    {
        let mut load = load_cache(&cache_path, CACHE_FORMAT_VERSION);
        assert!(load.reusable);
        assert_eq!(load.table.len(), 3);
        let changes = scan(&sources, &mut load.table, &CancelToken::new()).unwrap();
        assert!(changes.is_empty());
        assert_eq!(changes.unchanged.len(), 3);
    }
}

#[test]
fn modified_file_is_detected_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let files = write_tree(&src);
    let cache_path = dir.path().join(".quill").join("files.qbin");
    let sources = project_source(&src);

    {
        let mut table = FileTable::new();
        scan(&sources, &mut table, &CancelToken::new()).unwrap();
        save_cache(&cache_path, &table).unwrap();
    }

    // Ensure the rewrite lands on a later timestamp tick.
    std::thread::sleep(Duration::from_millis(20));
    std::fs::write(&files[0], "# Index, edited").unwrap();

    let mut load = load_cache(&cache_path, CACHE_FORMAT_VERSION);
    let changes = scan(&sources, &mut load.table, &CancelToken::new()).unwrap();
    assert_eq!(changes.modified, vec![files[0].clone()]);
    assert_eq!(changes.unchanged.len(), 2);
}

#[test]
fn ids_survive_the_cache_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let files = write_tree(&src);
    let cache_path = dir.path().join(".quill").join("files.qbin");
    let sources = project_source(&src);

    let original_id;
    {
        let mut table = FileTable::new();
        scan(&sources, &mut table, &CancelToken::new()).unwrap();
        original_id = table.get_by_path(&files[1]).unwrap().id;
        save_cache(&cache_path, &table).unwrap();
    }

    let mut load = load_cache(&cache_path, CACHE_FORMAT_VERSION);
    scan(&sources, &mut load.table, &CancelToken::new()).unwrap();
    assert_eq!(load.table.get_by_path(&files[1]).unwrap().id, original_id);
}

#[test]
fn deleted_file_disappears_from_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let files = write_tree(&src);
    let cache_path = dir.path().join(".quill").join("files.qbin");
    let sources = project_source(&src);

    {
        let mut table = FileTable::new();
        scan(&sources, &mut table, &CancelToken::new()).unwrap();
        save_cache(&cache_path, &table).unwrap();
    }

    std::fs::remove_file(&files[2]).unwrap();

    let mut load = load_cache(&cache_path, CACHE_FORMAT_VERSION);
    let changes = scan(&sources, &mut load.table, &CancelToken::new()).unwrap();
    assert_eq!(changes.deleted, vec![files[2].clone()]);
    save_cache(&cache_path, &load.table).unwrap();

    let reloaded = load_cache(&cache_path, CACHE_FORMAT_VERSION);
    assert_eq!(reloaded.table.len(), 2);
    assert!(reloaded.table.get_by_path(&files[2]).is_none());
}

#[test]
fn image_records_keep_their_type_across_builds() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(&src);
    let cache_path = dir.path().join(".quill").join("files.qbin");
    let sources = project_source(&src);

    {
        let mut table = FileTable::new();
        scan(&sources, &mut table, &CancelToken::new()).unwrap();
        save_cache(&cache_path, &table).unwrap();
    }

    let load = load_cache(&cache_path, CACHE_FORMAT_VERSION);
    let image = load
        .table
        .get_by_path(&src.join("guide").join("banner.png"))
        .unwrap();
    assert_eq!(image.file_type, FileType::Image);
    assert!(image.dimensions.is_some());
}

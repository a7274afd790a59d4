//! `quill build` — the incremental documentation build.
//!
//! Orchestrates the pipeline:
//! 1. Load the project configuration
//! 2. Load the file state cache (or start fresh if it cannot be trusted)
//! 3. Scan the source roots and compute the change set
//! 4. Hand changed files to the parser (the content extraction seam)
//! 5. Build, condense, and sort the menu hierarchy
//! 6. Serialize it into size-bounded segments
//! 7. Write segments, retire stale ones, persist the new segment ID set
//! 8. Save the updated file state cache

use quill_common::{CancelToken, FileId};
use quill_files::{
    load_cache, save_cache, scan, FileTable, FileType, InputType, CACHE_FORMAT_VERSION,
};
use quill_menu::{serialize, Menu, SegmentSet, SegmentWriter};

use crate::pipeline::{configured_sources, resolve_project_root};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `quill build` command.
///
/// Returns exit code 0 on success. Fatal failures (unwritable cache or
/// output) propagate as errors; an untrusted cache merely degrades to a full
/// reparse.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = quill_config::load_config(&project_dir)?;

    if !global.quiet {
        eprintln!(
            "  Building {} v{}",
            config.project.name, config.project.version
        );
    }

    let cancel = CancelToken::new();

    // Step 1: prior build state.
    let cache_path = project_dir.join(".quill").join("files.qbin");
    let (mut table, reusable) = if args.rebuild {
        (FileTable::new(), false)
    } else {
        let load = load_cache(&cache_path, CACHE_FORMAT_VERSION);
        (load.table, load.reusable)
    };

    if !reusable && !global.quiet {
        eprintln!("  No usable build state, processing all files");
    }

    // Step 2: reconcile the table with the filesystem.
    let sources = configured_sources(&project_dir, &config);
    let changes = scan(&sources, &mut table, &cancel)?;

    if global.verbose {
        eprintln!(
            "      Scan {} added, {} modified, {} deleted, {} unchanged",
            changes.added.len(),
            changes.modified.len(),
            changes.deleted.len(),
            changes.unchanged.len()
        );
    } else if !global.quiet {
        eprintln!("   Changed {} file(s)", changes.dirty_count());
    }

    // Step 3: the parser seam. Comment extraction and image dimension
    // probing belong to the parsing collaborator; from this side, every
    // text file currently tracked counts as having extractable content.
    let content_ids: Vec<FileId> = table
        .iter()
        .filter(|r| r.file_type == FileType::Text)
        .map(|r| r.id)
        .collect();

    // Step 4: rebuild the menu hierarchy from scratch.
    let mut menu = Menu::new();
    for source in sources.iter().filter(|s| s.input_type == InputType::Source) {
        menu.add_file_source(source);
    }
    let records = content_ids
        .iter()
        .filter_map(|id| table.get(*id))
        .collect::<Vec<_>>();
    menu.add_files(records.iter().copied(), &cancel)?;
    menu.condense(&cancel)?;
    menu.sort(&cancel)?;

    // Step 5: package and write the output, retiring stale segments.
    let segments = serialize(&menu, config.output.segment_length, &cancel)?;

    let output_dir = {
        let p = std::path::PathBuf::from(&config.output.path);
        if p.is_absolute() {
            p
        } else {
            project_dir.join(p)
        }
    };
    let writer = SegmentWriter::new(&output_dir);
    let previous = SegmentSet::load(writer.menu_dir());
    let current = writer.write_segments(&segments)?;
    writer.retire_stale(&previous, &current)?;
    current.save(writer.menu_dir())?;

    // Step 6: persist the updated file state for the next build.
    save_cache(&cache_path, &table)?;

    if !global.quiet {
        eprintln!(
            "     Wrote {} menu segment(s) to {}",
            segments.len(),
            writer.menu_dir().display()
        );
    }

    Ok(0)
}

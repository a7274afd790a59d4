//! Conversion of the menu tree into size-bounded output segments.
//!
//! A pre-order traversal turns every node into its positional record form,
//! assigning hash paths top-down. A second, single linear pass decides which
//! folders stay inline and which are split into their own segments: a running
//! size estimate accumulates per segment, and any folder whose subtree would
//! push the current segment past the limit becomes a dynamic folder backed by
//! a fresh segment. The estimate is a character-count heuristic, not an exact
//! byte count; a little segment-size variance buys a one-pass policy.

use std::collections::VecDeque;

use quill_common::{CancelToken, Cancelled};
use serde_json::{json, Value};

use crate::entry::{MenuEntry, SegmentId};
use crate::menu::{FileLeaf, Folder, Menu};

/// Default amount of data to aim for per segment before splitting.
pub const DEFAULT_SEGMENT_LENGTH: usize = 32 * 1024;

/// The loader callback each segment file invokes.
const LOADER_FUNCTION: &str = "QuillMenu.fileSectionLoaded";

// Fixed per-record overheads in the size estimate (brackets, tags, commas,
// quotes).
const ROOT_OVERHEAD: usize = 24;
const FOLDER_OVERHEAD: usize = 16;
const DYNAMIC_REF_OVERHEAD: usize = 24;
const FILE_OVERHEAD: usize = 8;

/// One serialized output chunk, independently loadable by ID.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Segment {
    /// The segment's identity; [`SegmentId::ROOT`] is the entry point.
    pub id: SegmentId,
    /// The complete file contents: a loader call wrapping the tree fragment.
    pub payload: String,
}

/// Serializes the menu into segments of roughly `max_segment_length`
/// characters each.
///
/// The root segment always has ID 1. Dynamic-folder segment IDs are handed
/// out from a single monotonic counter in traversal order, so identical
/// input produces byte-identical output. Cancellation is checked between
/// segments; on cancellation the caller discards all produced segments.
pub fn serialize(
    menu: &Menu,
    max_segment_length: usize,
    cancel: &CancelToken,
) -> Result<Vec<Segment>, Cancelled> {
    cancel.check()?;

    let (top_hash, top_folders, top_files) = plan_top_level(menu);

    let mut packer = Packer {
        max: max_segment_length,
        next_id: SegmentId::ROOT.as_raw() + 1,
    };
    let mut pending: VecDeque<(SegmentId, FolderPlan)> = VecDeque::new();
    let mut segments = Vec::new();

    let mut size = ROOT_OVERHEAD;
    let members = packer.pack_members(top_folders, top_files, &mut size, &mut pending);
    segments.push(render_segment(SegmentId::ROOT, top_hash, members));

    while let Some((id, folder)) = pending.pop_front() {
        cancel.check()?;
        let mut size = ROOT_OVERHEAD;
        let members = packer.pack_members(folder.folders, folder.files, &mut size, &mut pending);
        segments.push(render_segment(id, Some(folder.hash_path), members));
    }

    Ok(segments)
}

/// A folder converted to record form, with its serialized-size estimate.
struct FolderPlan {
    /// HTML display names; the whole chain for a condensed folder.
    display: Vec<String>,
    /// Full output hash path, ending in a separator.
    hash_path: String,
    folders: Vec<FolderPlan>,
    files: Vec<FilePlan>,
    /// Estimated inline size of this folder including its whole subtree.
    subtree_est: usize,
}

impl FolderPlan {
    fn name_len(&self) -> usize {
        self.display.iter().map(|n| n.len() + 3).sum()
    }

    /// Estimated cost of this folder's own record, members excluded.
    fn inline_est(&self) -> usize {
        FOLDER_OVERHEAD + self.name_len() + self.hash_path.len()
    }

    /// Estimated cost of a dynamic reference to this folder.
    fn reference_est(&self) -> usize {
        DYNAMIC_REF_OVERHEAD + self.name_len() + self.hash_path.len()
    }
}

struct FilePlan {
    entry: MenuEntry,
    est: usize,
}

/// The hash path prefix for a source: `Files:` for source 1, `Files<n>:`
/// otherwise.
fn source_prefix(number: u32) -> String {
    if number == 1 {
        "Files:".to_string()
    } else {
        format!("Files{number}:")
    }
}

/// Derives the top root's hash path and member plans.
///
/// A single source collapses into the top root itself; with several sources
/// (or none) the top root carries no hash path and each source becomes a
/// folder of its own. A hash-path-less root cannot hold files directly,
/// which holds by construction: it only ever contains source folders.
fn plan_top_level(menu: &Menu) -> (Option<String>, Vec<FolderPlan>, Vec<FilePlan>) {
    if menu.sources.len() == 1 {
        let source = &menu.sources[0];
        let prefix = source_prefix(source.number);
        let folders = source
            .folder
            .folders
            .iter()
            .map(|f| plan_folder(f, &prefix))
            .collect();
        let files = source.folder.files.iter().map(plan_file).collect();
        (Some(prefix), folders, files)
    } else {
        let folders = menu
            .sources
            .iter()
            .map(|source| {
                let prefix = source_prefix(source.number);
                let subfolders = source
                    .folder
                    .folders
                    .iter()
                    .map(|f| plan_folder(f, &prefix))
                    .collect::<Vec<_>>();
                let files = source
                    .folder
                    .files
                    .iter()
                    .map(plan_file)
                    .collect::<Vec<_>>();
                let display = vec![html_escape(&source.display_name)];
                let mut plan = FolderPlan {
                    display,
                    hash_path: prefix,
                    folders: subfolders,
                    files,
                    subtree_est: 0,
                };
                plan.subtree_est = subtree_estimate(&plan);
                plan
            })
            .collect();
        (None, folders, Vec::new())
    }
}

fn plan_folder(folder: &Folder, parent_hash: &str) -> FolderPlan {
    let mut hash_path = String::from(parent_hash);
    for name in &folder.names {
        hash_path.push_str(name);
        hash_path.push('/');
    }

    let display = folder.names.iter().map(|n| html_escape(n)).collect();
    let folders = folder
        .folders
        .iter()
        .map(|f| plan_folder(f, &hash_path))
        .collect::<Vec<_>>();
    let files = folder.files.iter().map(plan_file).collect::<Vec<_>>();

    let mut plan = FolderPlan {
        display,
        hash_path,
        folders,
        files,
        subtree_est: 0,
    };
    plan.subtree_est = subtree_estimate(&plan);
    plan
}

fn subtree_estimate(plan: &FolderPlan) -> usize {
    plan.inline_est()
        + plan.folders.iter().map(|f| f.subtree_est).sum::<usize>()
        + plan.files.iter().map(|f| f.est).sum::<usize>()
}

/// Converts a file leaf into its record, choosing the explicit form only
/// when HTML escaping changed the name.
fn plan_file(leaf: &FileLeaf) -> FilePlan {
    let display = html_escape(&leaf.name);
    if display != leaf.name {
        let est = FILE_OVERHEAD + display.len() + leaf.name.len() + 3;
        FilePlan {
            entry: MenuEntry::ExplicitFile {
                name: display,
                hash_path: leaf.name.clone(),
            },
            est,
        }
    } else {
        let est = FILE_OVERHEAD + display.len();
        FilePlan {
            entry: MenuEntry::ImplicitFile { name: display },
            est,
        }
    }
}

struct Packer {
    max: usize,
    next_id: u32,
}

impl Packer {
    fn alloc_id(&mut self) -> SegmentId {
        let id = SegmentId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    /// Packs one member list, externalizing folders that would overflow the
    /// current segment. `size` is the running estimate for that segment.
    fn pack_members(
        &mut self,
        folders: Vec<FolderPlan>,
        files: Vec<FilePlan>,
        size: &mut usize,
        pending: &mut VecDeque<(SegmentId, FolderPlan)>,
    ) -> Vec<MenuEntry> {
        let mut members = Vec::with_capacity(folders.len() + files.len());

        for folder in folders {
            if *size + folder.subtree_est > self.max {
                let id = self.alloc_id();
                *size += folder.reference_est();
                members.push(MenuEntry::DynamicFolder {
                    names: folder.display.clone(),
                    hash_path: folder.hash_path.clone(),
                    members_segment: id,
                });
                pending.push_back((id, folder));
            } else {
                *size += folder.inline_est();
                let FolderPlan {
                    display,
                    hash_path,
                    folders: subfolders,
                    files: subfiles,
                    ..
                } = folder;
                let inner = self.pack_members(subfolders, subfiles, size, pending);
                members.push(MenuEntry::InlineFolder {
                    names: display,
                    hash_path,
                    members: inner,
                });
            }
        }

        for file in files {
            *size += file.est;
            members.push(file.entry);
        }

        members
    }
}

fn render_segment(id: SegmentId, hash_path: Option<String>, members: Vec<MenuEntry>) -> Segment {
    let root = MenuEntry::RootFolder {
        id,
        hash_path,
        members,
    };
    let payload = format!("{LOADER_FUNCTION}({},{});", id, entry_to_value(&root));
    Segment { id, payload }
}

/// Renders a record as its positional array form.
fn entry_to_value(entry: &MenuEntry) -> Value {
    let tag = entry.kind().tag();
    match entry {
        MenuEntry::RootFolder {
            id,
            hash_path,
            members,
        } => {
            let hash = match hash_path {
                Some(h) => Value::String(h.clone()),
                None => Value::Null,
            };
            json!([tag, id.as_raw(), hash, members_value(members)])
        }
        MenuEntry::InlineFolder {
            names,
            hash_path,
            members,
        } => json!([tag, name_value(names), hash_path, members_value(members)]),
        MenuEntry::DynamicFolder {
            names,
            hash_path,
            members_segment,
        } => json!([tag, name_value(names), hash_path, members_segment.as_raw()]),
        MenuEntry::ExplicitFile { name, hash_path } => json!([tag, name, hash_path]),
        MenuEntry::ImplicitFile { name } => json!([tag, name]),
    }
}

fn members_value(members: &[MenuEntry]) -> Value {
    Value::Array(members.iter().map(entry_to_value).collect())
}

/// A single name stays a string; a condensed chain becomes an array.
fn name_value(names: &[String]) -> Value {
    if names.len() == 1 {
        Value::String(names[0].clone())
    } else {
        json!(names)
    }
}

/// Escapes the characters HTML cannot carry literally in text or attributes.
fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_common::FileId;
    use quill_files::{FileRecord, FileSource, FileType, InputType, ModTime};
    use std::path::PathBuf;

    fn record(id: u32, path: &str) -> FileRecord {
        FileRecord::new(
            FileId::from_raw(id),
            PathBuf::from(path),
            FileType::Text,
            ModTime::from_ticks(1),
        )
    }

    fn single_source_menu(paths: &[&str]) -> Menu {
        let mut menu = Menu::new();
        menu.add_file_source(&FileSource::new(
            1,
            PathBuf::from("/proj/src"),
            InputType::Source,
        ));
        for (i, path) in paths.iter().enumerate() {
            menu.add_file(&record(i as u32 + 1, path));
        }
        let cancel = CancelToken::new();
        menu.condense(&cancel).unwrap();
        menu.sort(&cancel).unwrap();
        menu
    }

    /// Splits a payload back into its segment ID and JSON fragment.
    fn parse_payload(payload: &str) -> (u32, Value) {
        let inner = payload
            .strip_prefix("QuillMenu.fileSectionLoaded(")
            .and_then(|s| s.strip_suffix(");"))
            .expect("loader call shape");
        let (id, fragment) = inner.split_once(',').expect("id and fragment");
        (id.parse().unwrap(), serde_json::from_str(fragment).unwrap())
    }

    #[test]
    fn small_menu_fits_one_segment() {
        let menu = single_source_menu(&["/proj/src/index.md", "/proj/src/guide/install.md"]);
        let segments = serialize(&menu, DEFAULT_SEGMENT_LENGTH, &CancelToken::new()).unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, SegmentId::ROOT);

        let (id, fragment) = parse_payload(&segments[0].payload);
        assert_eq!(id, 1);
        // [0, 1, "Files:", [...]]
        assert_eq!(fragment[0], 0);
        assert_eq!(fragment[1], 1);
        assert_eq!(fragment[2], "Files:");
        // Folder before file.
        assert_eq!(fragment[3][0][0], 1);
        assert_eq!(fragment[3][0][1], "guide");
        assert_eq!(fragment[3][0][2], "Files:guide/");
        assert_eq!(fragment[3][1], json!([4, "index.md"]));
    }

    #[test]
    fn multiple_sources_share_a_hashless_root() {
        let mut menu = Menu::new();
        menu.add_file_source(&FileSource::new(
            1,
            PathBuf::from("/proj/src"),
            InputType::Source,
        ));
        menu.add_file_source(
            &FileSource::new(2, PathBuf::from("/proj/extras"), InputType::Source)
                .with_name("Extras"),
        );
        menu.add_file(&record(1, "/proj/src/index.md"));
        menu.add_file(&record(2, "/proj/extras/notes.md"));
        let cancel = CancelToken::new();
        menu.condense(&cancel).unwrap();
        menu.sort(&cancel).unwrap();

        let segments = serialize(&menu, DEFAULT_SEGMENT_LENGTH, &cancel).unwrap();
        let (_, fragment) = parse_payload(&segments[0].payload);

        assert_eq!(fragment[2], Value::Null);
        assert_eq!(fragment[3][0][1], "src");
        assert_eq!(fragment[3][0][2], "Files:");
        assert_eq!(fragment[3][1][1], "Extras");
        assert_eq!(fragment[3][1][2], "Files2:");
    }

    #[test]
    fn condensed_folder_serializes_name_array() {
        let menu = single_source_menu(&["/proj/src/a/b/c/one.md", "/proj/src/a/b/c/two.md"]);
        let segments = serialize(&menu, DEFAULT_SEGMENT_LENGTH, &CancelToken::new()).unwrap();
        let (_, fragment) = parse_payload(&segments[0].payload);

        let folder = &fragment[3][0];
        assert_eq!(folder[1], json!(["a", "b", "c"]));
        assert_eq!(folder[2], "Files:a/b/c/");
    }

    #[test]
    fn escaped_name_becomes_explicit_file() {
        let menu = single_source_menu(&["/proj/src/a&b.md", "/proj/src/plain.md"]);
        let segments = serialize(&menu, DEFAULT_SEGMENT_LENGTH, &CancelToken::new()).unwrap();
        let (_, fragment) = parse_payload(&segments[0].payload);

        assert_eq!(fragment[3][0], json!([3, "a&amp;b.md", "a&b.md"]));
        assert_eq!(fragment[3][1], json!([4, "plain.md"]));
    }

    #[test]
    fn oversized_folders_become_dynamic() {
        let paths: Vec<String> = (0..40)
            .map(|i| format!("/proj/src/deep/subject_{i:02}.md"))
            .collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let menu = single_source_menu(&refs);

        let segments = serialize(&menu, 256, &CancelToken::new()).unwrap();
        assert!(segments.len() > 1);
        assert_eq!(segments[0].id, SegmentId::ROOT);

        let (_, fragment) = parse_payload(&segments[0].payload);
        let folder = &fragment[3][0];
        assert_eq!(folder[0], 2);
        assert_eq!(folder[1], "deep");
        assert_eq!(folder[3], 2);

        let (id, child) = parse_payload(&segments[1].payload);
        assert_eq!(id, 2);
        // The split-off segment is a root folder with the dynamic folder's
        // hash path.
        assert_eq!(child[0], 0);
        assert_eq!(child[2], "Files:deep/");
        assert_eq!(child[3].as_array().unwrap().len(), 40);
    }

    #[test]
    fn segment_ids_are_sequential_from_two() {
        let paths: Vec<String> = (0..30)
            .flat_map(|i| {
                (0..10).map(move |j| format!("/proj/src/topic_{i:02}/page_{j:02}.md"))
            })
            .collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let menu = single_source_menu(&refs);

        let segments = serialize(&menu, 512, &CancelToken::new()).unwrap();
        assert!(segments.len() > 2);
        let ids: Vec<u32> = segments.iter().map(|s| s.id.as_raw()).collect();
        let expected: Vec<u32> = (1..=segments.len() as u32).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn serialization_is_deterministic() {
        let paths: Vec<String> = (0..25)
            .map(|i| format!("/proj/src/section_{i:02}/body.md"))
            .collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();

        let a = serialize(&single_source_menu(&refs), 512, &CancelToken::new()).unwrap();
        let b = serialize(&single_source_menu(&refs), 512, &CancelToken::new()).unwrap();
        assert_eq!(a.len(), b.len());
        for (sa, sb) in a.iter().zip(&b) {
            assert_eq!(sa.id, sb.id);
            assert_eq!(sa.payload, sb.payload);
        }
    }

    #[test]
    fn empty_menu_produces_bare_root() {
        let menu = Menu::new();
        let segments = serialize(&menu, DEFAULT_SEGMENT_LENGTH, &CancelToken::new()).unwrap();
        assert_eq!(segments.len(), 1);
        let (_, fragment) = parse_payload(&segments[0].payload);
        assert_eq!(fragment, json!([0, 1, null, []]));
    }

    #[test]
    fn cancellation_aborts_serialization() {
        let menu = single_source_menu(&["/proj/src/index.md"]);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(serialize(&menu, 1024, &cancel), Err(Cancelled));
    }

    #[test]
    fn html_escape_covers_markup_characters() {
        assert_eq!(html_escape(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(html_escape("plain.md"), "plain.md");
    }
}

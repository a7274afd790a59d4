//! The persistent binary cache of per-file state.
//!
//! On disk the cache is a [`quill_binary`] stream of records:
//!
//! ```text
//! [i32: ID]
//! [string: absolute path]
//! [u8: type]
//! [i64: last modification in ticks, or 0]
//! (if image)
//!     [u32: width in pixels, or 0 if unknown]
//!     [u32: height in pixels, or 0 if unknown]
//! ...
//! [i32: 0]
//! ```
//!
//! Loading applies forward-only compatibility rules keyed off the stored
//! format version, treating every ambiguity as "reparse" and never as an
//! error: availability over staleness.

use std::path::Path;

use quill_binary::{BinaryFileReader, BinaryFileWriter};
use quill_common::{FileId, FormatVersion};

use crate::error::FilesError;
use crate::record::{FileRecord, FileType, ImageDimensions, ModTime};
use crate::table::FileTable;

/// The format version written by this build of Quill.
pub const CACHE_FORMAT_VERSION: FormatVersion = FormatVersion::new(2, 2, 0);

/// The oldest stored format this build can still decode.
pub const MIN_SUPPORTED_VERSION: FormatVersion = FormatVersion::new(2, 0, 0);

/// Stored versions older than this never recorded trustworthy modification
/// times; their records are all forced to reparse.
const FORCE_REPARSE_BELOW: FormatVersion = FormatVersion::new(2, 1, 0);

/// Stored versions older than this did not write image dimensions at all.
const DIMENSIONS_STORED_SINCE: FormatVersion = FormatVersion::new(2, 0, 2);

/// Decode adjustments derived once per load from the stored version.
///
/// Each field corresponds to one threshold rule; a future format bump adds a
/// constant above and a field here rather than rewriting the decode loop.
struct Compat {
    force_reparse: bool,
    dimensions_stored: bool,
}

impl Compat {
    fn for_version(stored: FormatVersion) -> Self {
        Self {
            force_reparse: stored < FORCE_REPARSE_BELOW,
            dimensions_stored: stored >= DIMENSIONS_STORED_SINCE,
        }
    }
}

/// Result of loading the cache.
///
/// The table is always usable. When `reusable` is false the cache could not
/// be trusted (missing, incompatible, or malformed) and the table is empty;
/// the caller must treat every file as new or modified.
#[derive(Debug)]
pub struct CacheLoad {
    /// The decoded table, empty when the cache was not reusable.
    pub table: FileTable,
    /// Whether the stored state was decoded in full.
    pub reusable: bool,
}

/// Loads the file state cache.
///
/// Never fails: any problem — missing file, bad header, unsupported version,
/// truncation, or a malformed record mid-stream — abandons the whole load
/// and returns an empty, non-reusable table. A partially decoded table is
/// never exposed; silently dropping files would be worse than reparsing.
pub fn load_cache(path: &Path, running_version: FormatVersion) -> CacheLoad {
    match read_table(path, running_version) {
        Ok(table) => CacheLoad {
            table,
            reusable: true,
        },
        Err(_) => CacheLoad {
            table: FileTable::new(),
            reusable: false,
        },
    }
}

fn read_table(path: &Path, running_version: FormatVersion) -> Result<FileTable, FilesError> {
    let mut reader = BinaryFileReader::open(path, MIN_SUPPORTED_VERSION, running_version)?;
    let stored_version = reader.version();
    let compat = Compat::for_version(stored_version);
    let mut table = FileTable::new();

    loop {
        let raw_id = reader.read_i32()?;
        if raw_id == 0 {
            break;
        }
        if raw_id < 0 {
            return Err(FilesError::MalformedRecord {
                path: path.to_path_buf(),
                reason: format!("negative file ID {raw_id}"),
            });
        }
        let id = FileId::from_raw(raw_id as u32);

        let file_path = reader.read_string()?;
        let type_tag = reader.read_u8()?;
        let file_type = FileType::from_tag(type_tag).ok_or_else(|| FilesError::MalformedRecord {
            path: path.to_path_buf(),
            reason: format!("unknown file type tag {type_tag}"),
        })?;

        let mut last_modified = if compat.force_reparse {
            // The stored ticks are present but untrustworthy.
            reader.skip(8)?;
            ModTime::UNKNOWN
        } else {
            ModTime::from_ticks(reader.read_i64()?)
        };

        let record = if file_type == FileType::Image {
            let dimensions = if compat.dimensions_stored {
                ImageDimensions::new(reader.read_u32()?, reader.read_u32()?)
            } else {
                ImageDimensions::UNKNOWN
            };

            if !dimensions.is_known() && stored_version != running_version {
                // A different version of Quill failed to determine the
                // dimensions; reparse and take another stab at them. The
                // same version failing again would just loop, so its
                // records keep their timestamps.
                last_modified = ModTime::UNKNOWN;
            }

            FileRecord::new_image(id, file_path.into(), last_modified, dimensions)
        } else {
            FileRecord::new(id, file_path.into(), file_type, last_modified)
        };

        table.insert(record)?;
    }

    Ok(table)
}

/// Saves the file state cache, rewriting the whole file.
///
/// Records are written in ID order with the current format's field layout
/// and terminated by a zero ID. Callers that decided a file's state should
/// persist as "unknown" must have reset its modification time to
/// [`ModTime::UNKNOWN`] beforehand; the cache writes what it is given.
/// Failure to write is fatal for the build and propagates.
pub fn save_cache(path: &Path, table: &FileTable) -> Result<(), FilesError> {
    let mut writer = BinaryFileWriter::create(path, CACHE_FORMAT_VERSION)?;

    for record in table.iter() {
        writer.write_i32(record.id.as_raw() as i32)?;
        writer.write_string(&record.path.to_string_lossy())?;
        writer.write_u8(record.file_type.tag())?;
        writer.write_i64(record.last_modified.ticks())?;

        if record.file_type == FileType::Image {
            let dimensions = record.dimensions.unwrap_or(ImageDimensions::UNKNOWN);
            writer.write_u32(dimensions.width)?;
            writer.write_u32(dimensions.height)?;
        }
    }

    writer.write_i32(0)?;
    writer.close()?;
    Ok(())
}

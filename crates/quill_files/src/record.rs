//! Per-file state records tracked across builds.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use quill_common::FileId;

/// Classification of a tracked file, stored as a single byte on disk.
///
/// The type drives which extra fields a cache record carries: image records
/// are followed by their pixel dimensions, other types by nothing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum FileType {
    /// A text file that may contain extractable documentation.
    Text = 0,
    /// An image referenced from documentation.
    Image = 1,
    /// Anything else; tracked but never parsed.
    Binary = 2,
}

impl FileType {
    /// The on-disk byte tag for this type.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Decodes an on-disk byte tag, `None` for unknown tags.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Text),
            1 => Some(Self::Image),
            2 => Some(Self::Binary),
            _ => None,
        }
    }
}

/// A last-modification timestamp in 100-nanosecond ticks since the Unix
/// epoch, matching the on-disk `Int64` field.
///
/// [`ModTime::UNKNOWN`] (zero ticks) is a sentinel meaning "treat as
/// modified / force reparse"; it is never a real observed timestamp.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ModTime(i64);

/// Ticks per second at 100 ns resolution.
const TICKS_PER_SECOND: i64 = 10_000_000;

impl ModTime {
    /// Sentinel meaning the stored state is untrustworthy and the file must
    /// be reparsed.
    pub const UNKNOWN: ModTime = ModTime(0);

    /// Creates a timestamp from raw ticks.
    pub fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Returns the raw tick count.
    pub fn ticks(self) -> i64 {
        self.0
    }

    /// Returns `true` if this is the force-reparse sentinel.
    pub fn is_unknown(self) -> bool {
        self.0 == 0
    }

    /// Converts a filesystem timestamp to ticks.
    ///
    /// Timestamps before the epoch collapse to [`ModTime::UNKNOWN`], which is
    /// safe: such a file is simply reparsed.
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(d) => {
                let ticks =
                    d.as_secs() as i64 * TICKS_PER_SECOND + (d.subsec_nanos() / 100) as i64;
                Self(ticks)
            }
            Err(_) => Self::UNKNOWN,
        }
    }
}

/// Pixel dimensions of an image file. `(0, 0)` means "unknown, attempt to
/// recompute on the next parse".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ImageDimensions {
    /// Width in pixels, 0 if unknown.
    pub width: u32,
    /// Height in pixels, 0 if unknown.
    pub height: u32,
}

impl ImageDimensions {
    /// The "not yet determined" dimensions.
    pub const UNKNOWN: ImageDimensions = ImageDimensions {
        width: 0,
        height: 0,
    };

    /// Creates dimensions from width and height.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if both dimensions have been determined.
    pub fn is_known(self) -> bool {
        self.width != 0 && self.height != 0
    }
}

/// One tracked source artifact: identity, location, type, and the state
/// needed to decide whether it must be reparsed.
///
/// `dimensions` is `Some` exactly when `file_type` is [`FileType::Image`];
/// the constructors maintain that invariant and the cache relies on it when
/// choosing the record layout.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FileRecord {
    /// Stable identity, unique within the table that owns this record.
    pub id: FileId,
    /// Absolute normalized path; the natural key for matching scans.
    pub path: PathBuf,
    /// Classification driving the record's extra fields.
    pub file_type: FileType,
    /// Last observed modification time, or [`ModTime::UNKNOWN`] to force a
    /// reparse.
    pub last_modified: ModTime,
    /// Pixel dimensions, present only for image records.
    pub dimensions: Option<ImageDimensions>,
}

impl FileRecord {
    /// Creates a record of any type; image records start with unknown
    /// dimensions.
    pub fn new(id: FileId, path: PathBuf, file_type: FileType, last_modified: ModTime) -> Self {
        let dimensions = match file_type {
            FileType::Image => Some(ImageDimensions::UNKNOWN),
            _ => None,
        };
        Self {
            id,
            path,
            file_type,
            last_modified,
            dimensions,
        }
    }

    /// Creates an image record with known dimensions.
    pub fn new_image(
        id: FileId,
        path: PathBuf,
        last_modified: ModTime,
        dimensions: ImageDimensions,
    ) -> Self {
        Self {
            id,
            path,
            file_type: FileType::Image,
            last_modified,
            dimensions: Some(dimensions),
        }
    }

    /// Marks this record as needing a reparse on the next build.
    pub fn mark_for_reparse(&mut self) {
        self.last_modified = ModTime::UNKNOWN;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_tag_roundtrip() {
        for ty in [FileType::Text, FileType::Image, FileType::Binary] {
            assert_eq!(FileType::from_tag(ty.tag()), Some(ty));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(FileType::from_tag(3), None);
        assert_eq!(FileType::from_tag(255), None);
    }

    #[test]
    fn mod_time_sentinel() {
        assert!(ModTime::UNKNOWN.is_unknown());
        assert!(!ModTime::from_ticks(1).is_unknown());
    }

    #[test]
    fn mod_time_from_system_time() {
        let t = UNIX_EPOCH + std::time::Duration::new(10, 500);
        let mt = ModTime::from_system_time(t);
        assert_eq!(mt.ticks(), 10 * TICKS_PER_SECOND + 5);
    }

    #[test]
    fn mod_time_before_epoch_is_unknown() {
        let t = UNIX_EPOCH - std::time::Duration::from_secs(1);
        assert!(ModTime::from_system_time(t).is_unknown());
    }

    #[test]
    fn dimensions_known_requires_both_axes() {
        assert!(ImageDimensions::new(640, 480).is_known());
        assert!(!ImageDimensions::new(640, 0).is_known());
        assert!(!ImageDimensions::new(0, 480).is_known());
        assert!(!ImageDimensions::UNKNOWN.is_known());
    }

    #[test]
    fn new_record_dimensions_follow_type() {
        let text = FileRecord::new(
            FileId::from_raw(1),
            PathBuf::from("/p/a.md"),
            FileType::Text,
            ModTime::UNKNOWN,
        );
        assert!(text.dimensions.is_none());

        let image = FileRecord::new(
            FileId::from_raw(2),
            PathBuf::from("/p/a.png"),
            FileType::Image,
            ModTime::UNKNOWN,
        );
        assert_eq!(image.dimensions, Some(ImageDimensions::UNKNOWN));
    }

    #[test]
    fn mark_for_reparse_resets_mod_time() {
        let mut rec = FileRecord::new(
            FileId::from_raw(1),
            PathBuf::from("/p/a.md"),
            FileType::Text,
            ModTime::from_ticks(99),
        );
        rec.mark_for_reparse();
        assert!(rec.last_modified.is_unknown());
    }
}

//! Serialized menu entry records and segment identities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one output segment. The entry-point segment is always
/// [`SegmentId::ROOT`].
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
)]
pub struct SegmentId(u32);

impl SegmentId {
    /// The segment a consumer loads first.
    pub const ROOT: SegmentId = SegmentId(1);

    /// Creates a `SegmentId` from a raw value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The type tag that leads every serialized record.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum EntryKind {
    /// Top of a hierarchy, or the landing point of a dynamic-folder split.
    RootFolder = 0,
    /// A folder whose members are embedded in the same segment.
    InlineFolder = 1,
    /// A folder whose members live in a separate segment, referenced by ID.
    DynamicFolder = 2,
    /// A file whose display name differs from its hash-path name.
    ExplicitFile = 3,
    /// A file whose display name and hash-path name coincide.
    ImplicitFile = 4,
}

impl EntryKind {
    /// The numeric tag emitted as the record's first field.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// One positional record of the serialized hierarchy.
///
/// Every record is emitted as an array whose first element is the
/// [`EntryKind`] tag, with the remaining fields positional per kind. Folder
/// `names` hold one element normally and the whole display chain for a
/// condensed folder. Hash paths always end in a separator so a leaf name can
/// be appended directly.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MenuEntry {
    /// Top of a segment's tree. `hash_path` is `None` only for the single
    /// top-level root that holds no files of its own.
    RootFolder {
        /// The segment this root belongs to.
        id: SegmentId,
        /// Output hash path, absent for the file-source-only top root.
        hash_path: Option<String>,
        /// Child entries.
        members: Vec<MenuEntry>,
    },
    /// A folder with inlined members.
    InlineFolder {
        /// Display name(s); more than one for a condensed chain.
        names: Vec<String>,
        /// Output hash path of the folder.
        hash_path: String,
        /// Child entries.
        members: Vec<MenuEntry>,
    },
    /// A folder whose members were split into their own segment.
    DynamicFolder {
        /// Display name(s); more than one for a condensed chain.
        names: Vec<String>,
        /// Output hash path of the folder.
        hash_path: String,
        /// The segment holding this folder's members.
        members_segment: SegmentId,
    },
    /// A file whose hash-path name must be spelled out.
    ExplicitFile {
        /// HTML display name.
        name: String,
        /// The file's name within its folder's hash path.
        hash_path: String,
    },
    /// A file addressed by its display name.
    ImplicitFile {
        /// HTML display name, identical to the hash-path name.
        name: String,
    },
}

impl MenuEntry {
    /// The record's type tag.
    pub fn kind(&self) -> EntryKind {
        match self {
            MenuEntry::RootFolder { .. } => EntryKind::RootFolder,
            MenuEntry::InlineFolder { .. } => EntryKind::InlineFolder,
            MenuEntry::DynamicFolder { .. } => EntryKind::DynamicFolder,
            MenuEntry::ExplicitFile { .. } => EntryKind::ExplicitFile,
            MenuEntry::ImplicitFile { .. } => EntryKind::ImplicitFile,
        }
    }
}

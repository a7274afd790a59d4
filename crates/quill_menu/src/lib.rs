//! The hierarchical file menu: tree construction, segmentation, and output.
//!
//! Every build reconstructs the project's folder/file hierarchy from scratch,
//! condenses single-child folder chains, sorts it deterministically, and
//! serializes it into size-bounded JavaScript segments so a browser never
//! loads a multi-megabyte menu for a large project. Segments from the
//! previous build that are no longer produced are retired, driven by a small
//! persisted set of segment IDs.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod menu;
pub mod output;
pub mod serialize;

pub use entry::{EntryKind, MenuEntry, SegmentId};
pub use error::MenuError;
pub use menu::Menu;
pub use output::{SegmentSet, SegmentWriter};
pub use serialize::{serialize, Segment, DEFAULT_SEGMENT_LENGTH};

//! Stable identifier for files tracked across builds.

use std::fmt;

/// Stable identity of a tracked source file, unique within a build.
///
/// IDs are positive; `0` never identifies a file — on the wire it terminates
/// the record stream. An ID is assigned once when a file is first seen and is
/// never reused while the file remains tracked, so other subsystems can hold
/// `FileId` values across a build without risk of them being re-bound.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FileId(u32);

impl FileId {
    /// Creates a `FileId` from a raw value.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is zero; zero is the stream terminator, not an ID.
    pub fn from_raw(raw: u32) -> Self {
        assert!(raw != 0, "file ID 0 is reserved as the stream terminator");
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Error types for binary state file I/O.

use std::path::PathBuf;

use quill_common::FormatVersion;

/// Errors that can occur while reading or writing a binary state file.
///
/// Read-side failures are typed so callers can treat any of them as "no prior
/// state" without inspecting the kind; write-side failures are fatal for the
/// build and are expected to propagate.
#[derive(Debug, thiserror::Error)]
pub enum BinaryFileError {
    /// The file does not exist.
    #[error("binary file not found: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// An underlying I/O error occurred.
    #[error("binary file I/O error at {path}: {source}")]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file does not start with the expected magic bytes, or its version
    /// string is unreadable.
    #[error("invalid binary file header in {path}: {reason}")]
    BadHeader {
        /// The offending path.
        path: PathBuf,
        /// Description of the header problem.
        reason: String,
    },

    /// The stored format version is outside the supported range.
    #[error("unsupported format version {stored} in {path}")]
    UnsupportedVersion {
        /// The offending path.
        path: PathBuf,
        /// The version found in the file.
        stored: FormatVersion,
    },

    /// The stream ended before a complete value could be read.
    #[error("truncated binary file: {path}")]
    Truncated {
        /// The offending path.
        path: PathBuf,
    },

    /// A length-prefixed string was not valid UTF-8.
    #[error("invalid string data in {path}")]
    InvalidString {
        /// The offending path.
        path: PathBuf,
    },
}

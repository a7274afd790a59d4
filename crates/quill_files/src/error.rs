//! Error types for file state operations.

use std::path::PathBuf;

use quill_binary::BinaryFileError;
use quill_common::FileId;

/// Errors that can occur while maintaining the file state cache.
///
/// Cache loads are fail-safe and never surface these; they are produced by
/// the write path (fatal for the build) and by table insertion when a record
/// conflicts with existing state.
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// An I/O error occurred while scanning or writing.
    #[error("file state I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An error in the underlying binary stream.
    #[error(transparent)]
    Binary(#[from] BinaryFileError),

    /// A record's ID is already present in the table.
    #[error("duplicate file ID {id}")]
    DuplicateId {
        /// The conflicting ID.
        id: FileId,
    },

    /// A record's path is already tracked under another ID.
    #[error("duplicate file path {path}")]
    DuplicatePath {
        /// The conflicting path.
        path: PathBuf,
    },

    /// A record in the cache stream is structurally invalid.
    #[error("malformed record in {path}: {reason}")]
    MalformedRecord {
        /// The cache file containing the record.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },
}

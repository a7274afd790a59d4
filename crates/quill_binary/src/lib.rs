//! Versioned binary record streams for Quill build state files.
//!
//! Build state (the file cache, among others) is stored in a compact binary
//! format: a fixed magic, a format version string, then a caller-defined body
//! of length-prefixed records. This crate owns the framing and the typed
//! primitives; the record layouts live with their owners.

#![warn(missing_docs)]

pub mod error;
pub mod reader;
pub mod writer;

pub use error::BinaryFileError;
pub use reader::BinaryFileReader;
pub use writer::BinaryFileWriter;

/// Magic bytes identifying a Quill binary state file.
pub const MAGIC: [u8; 8] = *b"QUILLBIN";

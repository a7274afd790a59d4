//! Shared foundational types used across the Quill documentation generator.
//!
//! This crate provides core types including the ordered format version used by
//! the binary build state files, stable file identities, and the cooperative
//! cancellation token checked at build phase boundaries.

#![warn(missing_docs)]

pub mod cancel;
pub mod file_id;
pub mod version;

pub use cancel::{CancelToken, Cancelled};
pub use file_id::FileId;
pub use version::{FormatVersion, ParseVersionError};

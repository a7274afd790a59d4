//! Writing side of the binary state file format.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use quill_common::FormatVersion;

use crate::error::BinaryFileError;
use crate::MAGIC;

/// Writer for a versioned binary state file.
///
/// Creating the writer truncates the target, creates missing parent
/// directories, and emits the header (magic + version string). All writes are
/// little-endian. A write failure is fatal for the caller's build; nothing is
/// buffered past [`close`](BinaryFileWriter::close), which flushes and
/// surfaces any deferred error. Dropping without `close` still releases the
/// handle (buffered data is flushed on a best-effort basis), so early error
/// returns never leak the resource.
#[derive(Debug)]
pub struct BinaryFileWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl BinaryFileWriter {
    /// Creates (or truncates) `path` and writes the format header.
    pub fn create(path: &Path, version: FormatVersion) -> Result<Self, BinaryFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BinaryFileError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let file = File::create(path).map_err(|e| BinaryFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut writer = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        };
        writer.write_bytes(&MAGIC)?;
        writer.write_string(&version.to_string())?;
        Ok(writer)
    }

    /// The path this writer was created on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BinaryFileError> {
        self.writer
            .write_all(bytes)
            .map_err(|e| BinaryFileError::Io {
                path: self.path.clone(),
                source: e,
            })
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) -> Result<(), BinaryFileError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) -> Result<(), BinaryFileError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian `i64`.
    pub fn write_i64(&mut self, value: i64) -> Result<(), BinaryFileError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a single byte.
    pub fn write_u8(&mut self, value: u8) -> Result<(), BinaryFileError> {
        self.write_bytes(&[value])
    }

    /// Writes a `u32`-length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<(), BinaryFileError> {
        self.write_u32(value.len() as u32)?;
        self.write_bytes(value.as_bytes())
    }

    /// Flushes and closes the file, surfacing any deferred write error.
    pub fn close(mut self) -> Result<(), BinaryFileError> {
        self.writer.flush().map_err(|e| BinaryFileError::Io {
            path: self.path.clone(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.qbin");
        let writer = BinaryFileWriter::create(&path, FormatVersion::new(2, 2, 0)).unwrap();
        writer.close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"QUILLBIN");
        // u32 length prefix followed by the version string.
        assert_eq!(&bytes[8..12], &3u32.to_le_bytes());
        assert_eq!(&bytes[12..15], b"2.2");
    }

    #[test]
    fn create_makes_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deeply").join("nested").join("out.qbin");
        let writer = BinaryFileWriter::create(&path, FormatVersion::new(2, 2, 0)).unwrap();
        writer.close().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.qbin");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();

        let writer = BinaryFileWriter::create(&path, FormatVersion::new(2, 2, 0)).unwrap();
        writer.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert!(len < 1024);
    }

    #[test]
    fn create_in_unwritable_location_errors() {
        let err = BinaryFileWriter::create(
            Path::new("/proc/quill-does-not-exist/out.qbin"),
            FormatVersion::new(2, 2, 0),
        )
        .unwrap_err();
        assert!(matches!(err, BinaryFileError::Io { .. }));
    }
}

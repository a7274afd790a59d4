//! Reading side of the binary state file format.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use quill_common::FormatVersion;

use crate::error::BinaryFileError;
use crate::MAGIC;

/// Reader for a versioned binary state file.
///
/// Opening validates the magic bytes and parses the stored format version,
/// rejecting versions outside the caller's supported range. The stored
/// version stays available through [`version`](BinaryFileReader::version) so
/// callers can apply per-version compatibility rules while decoding the body.
///
/// All reads are little-endian. Any read past the end of the stream fails
/// with [`BinaryFileError::Truncated`] rather than returning partial data.
/// The underlying file handle is released when the reader is dropped, on
/// every exit path.
#[derive(Debug)]
pub struct BinaryFileReader {
    path: PathBuf,
    reader: BufReader<File>,
    version: FormatVersion,
}

impl BinaryFileReader {
    /// Opens a binary state file for reading.
    ///
    /// Fails with a typed error (never panics) if the file is missing, the
    /// magic bytes or version string are invalid, or the stored version is
    /// below `min_version` or above `current_version`.
    pub fn open(
        path: &Path,
        min_version: FormatVersion,
        current_version: FormatVersion,
    ) -> Result<Self, BinaryFileError> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BinaryFileError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                BinaryFileError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let mut reader = Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            // Placeholder until the header is parsed.
            version: FormatVersion::new(0, 0, 0),
        };

        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(BinaryFileError::BadHeader {
                path: reader.path,
                reason: "bad magic bytes".to_string(),
            });
        }

        let version_string = reader.read_string()?;
        let version: FormatVersion =
            version_string
                .parse()
                .map_err(|_| BinaryFileError::BadHeader {
                    path: reader.path.clone(),
                    reason: format!("unparsable version string '{version_string}'"),
                })?;

        if version < min_version || version > current_version {
            return Err(BinaryFileError::UnsupportedVersion {
                path: reader.path,
                stored: version,
            });
        }

        reader.version = version;
        Ok(reader)
    }

    /// The format version stored in the file's header.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// The path this reader was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), BinaryFileError> {
        self.reader.read_exact(buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                BinaryFileError::Truncated {
                    path: self.path.clone(),
                }
            } else {
                BinaryFileError::Io {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, BinaryFileError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, BinaryFileError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64(&mut self) -> Result<i64, BinaryFileError> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8, BinaryFileError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads a `u32`-length-prefixed UTF-8 string.
    ///
    /// The length prefix is taken from the stream, so a corrupt prefix on a
    /// short file surfaces as [`BinaryFileError::Truncated`] rather than a
    /// huge allocation.
    pub fn read_string(&mut self) -> Result<String, BinaryFileError> {
        let len = self.read_u32()? as u64;
        let mut bytes = Vec::new();
        let n = (&mut self.reader)
            .take(len)
            .read_to_end(&mut bytes)
            .map_err(|e| BinaryFileError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        if (n as u64) < len {
            return Err(BinaryFileError::Truncated {
                path: self.path.clone(),
            });
        }
        String::from_utf8(bytes).map_err(|_| BinaryFileError::InvalidString {
            path: self.path.clone(),
        })
    }

    /// Skips `n` bytes of the stream.
    ///
    /// Fails with [`BinaryFileError::Truncated`] if fewer than `n` bytes
    /// remain.
    pub fn skip(&mut self, n: u64) -> Result<(), BinaryFileError> {
        let before = self
            .reader
            .stream_position()
            .map_err(|e| BinaryFileError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        let end = self
            .reader
            .seek(SeekFrom::End(0))
            .map_err(|e| BinaryFileError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        if end - before < n {
            return Err(BinaryFileError::Truncated {
                path: self.path.clone(),
            });
        }
        self.reader
            .seek(SeekFrom::Start(before + n))
            .map_err(|e| BinaryFileError::Io {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(())
    }
}

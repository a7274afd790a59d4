//! Ordered dotted-decimal version numbers for on-disk format compatibility.
//!
//! Build state files carry the version of the program that wrote them. On
//! load, the stored version is compared against named thresholds to decide
//! which backward-compatibility transforms apply. Comparisons follow the
//! derived lexicographic order on `(major, minor, patch)`.

use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` format version, totally ordered.
///
/// Parsed from and displayed as a dotted string. A missing patch component
/// parses as zero, so `"2.0"` and `"2.0.0"` compare equal, but the original
/// spelling is not preserved.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FormatVersion {
    major: u16,
    minor: u16,
    patch: u16,
}

impl FormatVersion {
    /// Creates a version from its numeric components.
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns the major component.
    pub fn major(self) -> u16 {
        self.major
    }

    /// Returns the minor component.
    pub fn minor(self) -> u16 {
        self.minor
    }

    /// Returns the patch component.
    pub fn patch(self) -> u16 {
        self.patch
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// Error produced when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid version string '{input}'")]
pub struct ParseVersionError {
    /// The string that failed to parse.
    pub input: String,
}

impl FromStr for FormatVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError {
            input: s.to_string(),
        };

        let mut parts = s.split('.');
        let major = parts.next().ok_or_else(err)?;
        let minor = parts.next().ok_or_else(err)?;
        let patch = parts.next();
        if parts.next().is_some() {
            return Err(err());
        }

        let parse = |p: &str| -> Result<u16, ParseVersionError> {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            p.parse().map_err(|_| err())
        };

        Ok(Self {
            major: parse(major)?,
            minor: parse(minor)?,
            patch: match patch {
                Some(p) => parse(p)?,
                None => 0,
            },
        })
    }
}

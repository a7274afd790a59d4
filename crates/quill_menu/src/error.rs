//! Error types for menu output operations.

use std::path::PathBuf;

/// Errors that can occur while writing or retiring menu segments.
///
/// Anything here is fatal for the build: the menu cannot claim success with
/// output it cannot prove was written. Stale-segment cleanup swallows
/// already-gone files before ever constructing one of these.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// An I/O error occurred while writing or deleting output files.
    #[error("menu output I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The segment ID set could not be serialized.
    #[error("failed to serialize segment state: {reason}")]
    State {
        /// Description of the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_display_contains_path() {
        let err = MenuError::Io {
            path: PathBuf::from("/out/menu/files2.js"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("files2.js"));
    }

    #[test]
    fn state_display() {
        let err = MenuError::State {
            reason: "bad json".to_string(),
        };
        assert!(err.to_string().contains("bad json"));
    }
}

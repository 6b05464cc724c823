//! Error types for vaultpost.
//!
//! All errors in the system are represented by the [`Error`] enum so that the
//! vault, client and publish crates compose with `?`. The upload orchestrator
//! downgrades these into per-reference [`crate::UploadFailure`] values instead
//! of letting them abort a batch.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all vaultpost operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid file path (empty, not valid UTF-8, etc.)
    #[error("Invalid file path: {reason}")]
    InvalidPath { reason: String },

    /// Path traversal attempt detected
    #[error("Path traversal detected: {path}")]
    PathTraversalAttempt { path: PathBuf },

    /// File too large for upload
    #[error("File too large ({size} bytes, max {max} bytes): {path}")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    /// Embed target that does not resolve to any file in the vault
    #[error("Unable to resolve file path for: {reference}")]
    ReferenceNotFound { reference: String },

    /// Network failure, timeout or other transport-level problem
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// The forum answered with a non-success status
    #[error("Remote rejected request with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// Parse error
    #[error("Parse error: {reason}")]
    ParseError { reason: String },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Validation error
    #[error("Validation error: {reason}")]
    ValidationError { reason: String },

    /// Operation cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create an invalid path error
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Error::InvalidPath {
            reason: reason.into(),
        }
    }

    /// Create a path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Error::PathTraversalAttempt { path: path.into() }
    }

    /// Create a file too large error
    pub fn file_too_large(path: impl Into<PathBuf>, size: u64, max: u64) -> Self {
        Error::FileTooLarge {
            path: path.into(),
            size,
            max,
        }
    }

    /// Create an unresolved reference error
    pub fn reference_not_found(reference: impl Into<String>) -> Self {
        Error::ReferenceNotFound {
            reference: reference.into(),
        }
    }

    /// Create a transport error
    pub fn transport(reason: impl Into<String>) -> Self {
        Error::Transport {
            reason: reason.into(),
        }
    }

    /// Create a remote rejection error
    pub fn remote_rejected(status: u16, body: impl Into<String>) -> Self {
        Error::RemoteRejected {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(reason: impl Into<String>) -> Self {
        Error::ParseError {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a validation error
    pub fn validation_error(reason: impl Into<String>) -> Self {
        Error::ValidationError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// True when the referenced asset has a path but its bytes could not be read.
    pub fn is_unreadable_asset(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::FileNotFound { .. } | Error::FileTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::file_not_found("/path/to/file");
        assert!(err.to_string().contains("File not found"));

        let err = Error::reference_not_found("cat.png");
        assert_eq!(err.to_string(), "Unable to resolve file path for: cat.png");
    }

    #[test]
    fn test_remote_rejection_keeps_status_and_body() {
        let err = Error::remote_rejected(413, "too big");
        match err {
            Error::RemoteRejected { status, ref body } => {
                assert_eq!(status, 413);
                assert_eq!(body, "too big");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_asset_classification() {
        assert!(Error::file_not_found("a.png").is_unreadable_asset());
        assert!(Error::file_too_large("a.png", 20, 10).is_unreadable_asset());
        assert!(!Error::reference_not_found("a.png").is_unreadable_asset());
        assert!(!Error::transport("reset").is_unreadable_asset());
    }
}

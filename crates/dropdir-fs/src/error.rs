//! Error types for dropdir-fs

use std::fmt;
use std::path::PathBuf;

/// Result type for dropdir-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while sanitizing paths or transferring files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid path '{}': {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Cannot read source {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination already exists: {}", .path.display())]
    DestinationExists { path: PathBuf },

    #[error("Transfer to {} cancelled", .path.display())]
    TransferCancelled { path: PathBuf },

    #[error("Copy from {} to {} failed: {source}", .from.display(), .to.display())]
    CopyIo {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory walk stopped at `entry`; everything copied before it
    /// remains under `destination`.
    #[error(
        "Partial copy into {} stopped at {} (destination is incomplete): {cause}",
        .destination.display(),
        .entry.display()
    )]
    PartialCopy {
        destination: PathBuf,
        entry: PathBuf,
        #[source]
        cause: Box<Error>,
    },

    #[error("Move of {} incomplete, source retained: {cause}", .path.display())]
    MoveIncomplete {
        path: PathBuf,
        #[source]
        cause: Box<Error>,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Lock acquisition failed for {}", .path.display())]
    LockFailed { path: PathBuf },

    #[error("Could not read confirmation: {source}")]
    Prompt {
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the user declined an overwrite prompt.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::TransferCancelled { .. })
    }
}

/// Non-fatal conditions collected during a transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferWarning {
    /// The copy succeeded but the source permission bits could not be applied.
    PermissionsNotPreserved { path: PathBuf, reason: String },
    /// A move copied everything but could not delete the source afterwards.
    SourceRemovalFailed { path: PathBuf, reason: String },
}

impl fmt::Display for TransferWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionsNotPreserved { path, reason } => write!(
                f,
                "Could not preserve permissions on {}: {}",
                path.display(),
                reason
            ),
            Self::SourceRemovalFailed { path, reason } => write!(
                f,
                "Copied, but could not remove source {}: {}. The data now exists in both locations",
                path.display(),
                reason
            ),
        }
    }
}

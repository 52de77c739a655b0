//! Error types for dropdir-core

use std::path::PathBuf;

/// Result type for dropdir-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or changing the folder registry
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Registry file does not exist yet
    #[error("Registry not found at {}", .path.display())]
    ConfigMissing { path: PathBuf },

    /// Registry file exists but cannot be parsed
    #[error("Registry at {} is corrupt ({format}): {message}", .path.display())]
    ConfigCorrupt {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Registry could not be serialized or written
    #[error("Could not write registry {}: {message}", .path.display())]
    ConfigWriteError { path: PathBuf, message: String },

    /// Registry file extension is not one we can read
    #[error("Unsupported registry format: '{extension}' (use .json, .toml or .yaml)")]
    UnsupportedFormat { extension: String },

    /// Platform has no per-user config directory
    #[error("Could not determine the user config directory")]
    NoConfigDir,

    /// No base location has been recorded yet
    #[error("No base location set")]
    LocationNotSet,

    #[error("Invalid folder name '{name}': {reason}")]
    InvalidFolderName { name: String, reason: String },

    #[error("Folder '{name}' not found")]
    FolderNotFound { name: String },

    /// The user answered "no" to a confirmation
    #[error("{message}")]
    Cancelled { message: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error from dropdir-fs
    #[error(transparent)]
    Fs(#[from] dropdir_fs::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

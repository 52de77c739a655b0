//! Error types for dropdir-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from dropdir-core
    #[error(transparent)]
    Core(#[from] dropdir_core::Error),

    /// Error from dropdir-fs
    #[error(transparent)]
    Fs(#[from] dropdir_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Whether the user declined a confirmation. Not treated as a failure.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Core(dropdir_core::Error::Fs(e)) | Self::Fs(e) => e.is_cancelled(),
            Self::Core(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

//! Filesystem layer for dropdir
//!
//! Sanitizes user-supplied paths and copies or moves files and directory
//! trees with overwrite confirmation and permission preservation.

pub mod confirm;
pub mod error;
pub mod io;
pub mod path;
pub mod transfer;

pub use confirm::{AlwaysNo, AlwaysYes, Confirm, LineConfirm, ScriptedConfirm, TerminalConfirm};
pub use error::{Error, Result, TransferWarning};
pub use io::{FileLock, RobustnessConfig};
pub use path::{
    PathSanitizer, require_absolute, sanitize, split_dropped_paths, validate_path_identifier,
};
pub use transfer::{
    NoProgress, OverwritePolicy, SourceOpener, StdOpener, TransferEngine, TransferMode,
    TransferProgress, TransferRequest, TransferResult, TransferStatus,
};

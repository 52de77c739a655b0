//! Per-invocation state shared by every command

use std::path::PathBuf;

use dropdir_core::ConfigStore;
use dropdir_fs::PathSanitizer;
use tracing::debug;

use crate::error::Result;

/// The registry store and path sanitizer for one run.
#[derive(Debug)]
pub struct Context {
    pub store: ConfigStore,
    pub sanitizer: PathSanitizer,
}

impl Context {
    /// Open the registry at `config`, or at the platform default.
    ///
    /// An explicit path is sanitized like any other user input.
    pub fn open(config: Option<PathBuf>) -> Result<Self> {
        let sanitizer = PathSanitizer::new();
        let store = match config {
            Some(path) => ConfigStore::open(sanitizer.sanitize(&path.to_string_lossy()))?,
            None => ConfigStore::open_default()?,
        };
        debug!(registry = %store.path().display(), "using registry");
        Ok(Self { store, sanitizer })
    }
}

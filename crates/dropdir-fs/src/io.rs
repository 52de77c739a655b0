//! Atomic file writes guarded by an advisory lock

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, Result};

/// Tuning knobs for [`write_atomic`].
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// How long to keep retrying the advisory lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync the temp file before renaming it into place.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Exclusive advisory lock on a sibling `.<name>.lock` file.
///
/// Held until dropped. While held, use [`replace_file`] to write the target;
/// [`write_atomic`] would wait on the lock this guard already holds.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Lock `path` for writing, retrying until `config.lock_timeout`.
    pub fn acquire(path: &Path, config: RobustnessConfig) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let lock_path = sibling(path, "lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| Error::io(&lock_path, e))?;
        acquire_lock(&file, path, config.lock_timeout)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// The file this lock guards.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Write content atomically to a file.
///
/// Holds a [`FileLock`] for the duration and writes through
/// [`replace_file`], so readers see either the old or the new content.
pub fn write_atomic(path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let _lock = FileLock::acquire(path, config)?;
    replace_file(path, content, config.enable_fsync)
}

/// Write a temp file in the same directory and rename it over `path`.
///
/// Does not lock; the caller holds the [`FileLock`] for `path`.
pub fn replace_file(path: &Path, content: &[u8], fsync: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let temp_path = sibling(path, &format!("{}.tmp", std::process::id()));
    let written = write_temp(&temp_path, content, fsync)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write text content to a file atomically with default settings.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}

fn write_temp(temp_path: &Path, content: &[u8], fsync: bool) -> Result<()> {
    let mut temp_file = File::create(temp_path).map_err(|e| Error::io(temp_path, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    if fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    Ok(())
}

fn acquire_lock(lock_file: &File, path: &Path, timeout: Duration) -> Result<()> {
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(250),
        max_elapsed_time: Some(timeout),
        ..ExponentialBackoff::default()
    };
    backoff::retry(policy, || {
        FileExt::try_lock_exclusive(lock_file).map_err(backoff::Error::transient)
    })
    .map_err(|_| {
        tracing::warn!(path = %path.display(), "Timed out waiting for file lock");
        Error::LockFailed {
            path: path.to_path_buf(),
        }
    })
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{suffix}"))
}

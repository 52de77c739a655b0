//! Copy and move of single files and directory trees
//!
//! A transfer runs through these phases, each logged at `debug`:
//!
//! `pending -> sanitizing -> [checking destination -> cancelled | overwriting]
//! -> transferring -> succeeded | partial copy | failed`
//!
//! A move appends `removing source -> succeeded | source removal failed`.
//!
//! Known limitations: a failed file stream leaves the partially written
//! destination in place, a failed directory walk leaves every entry copied
//! so far, and a confirmed directory overwrite deletes the old destination
//! tree before any new data is written.

mod file;
mod progress;
mod tree;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::confirm::Confirm;
use crate::path::require_absolute;
use crate::{Error, Result, TransferWarning};

pub use file::{SourceOpener, StdOpener};
pub use progress::{NoProgress, TransferProgress};

/// Whether the source survives the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Copy,
    /// Copy, then delete the source once everything was copied.
    Move,
}

/// What to do when the destination already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Ask through the engine's [`Confirm`] and proceed only on "yes".
    #[default]
    AskUser,
    /// Fail with [`Error::DestinationExists`].
    Fail,
    /// Replace the destination without asking.
    AlwaysOverwrite,
}

/// One copy or move, consumed by [`TransferEngine::transfer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: PathBuf,
    /// Final path of the transferred file or directory, not its parent.
    pub destination: PathBuf,
    pub mode: TransferMode,
    pub overwrite_policy: OverwritePolicy,
}

impl TransferRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>, mode: TransferMode) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            mode,
            overwrite_policy: OverwritePolicy::default(),
        }
    }

    /// Transfer `source` into `folder`, keeping its file name.
    pub fn into_folder(source: impl Into<PathBuf>, folder: &Path, mode: TransferMode) -> Result<Self> {
        let source = source.into();
        let name = source
            .file_name()
            .ok_or_else(|| Error::invalid_path(&source, "source has no file name"))?;
        let destination = folder.join(name);
        Ok(Self::new(source, destination, mode))
    }

    pub fn with_policy(mut self, overwrite_policy: OverwritePolicy) -> Self {
        self.overwrite_policy = overwrite_policy;
        self
    }
}

/// Terminal state of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Succeeded,
    Cancelled,
    PartialCopy,
    MoveIncomplete,
    Failed,
}

/// What a transfer did, including non-fatal warnings.
#[derive(Debug, Default)]
pub struct TransferResult {
    pub files: u64,
    pub directories: u64,
    pub bytes: u64,
    pub warnings: Vec<TransferWarning>,
    pub error: Option<Error>,
}

impl TransferResult {
    pub fn status(&self) -> TransferStatus {
        match &self.error {
            None => TransferStatus::Succeeded,
            Some(Error::TransferCancelled { .. }) => TransferStatus::Cancelled,
            Some(Error::PartialCopy { .. }) => TransferStatus::PartialCopy,
            Some(Error::MoveIncomplete { .. }) => TransferStatus::MoveIncomplete,
            Some(_) => TransferStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Files plus directories created at the destination.
    pub fn entries(&self) -> u64 {
        self.files + self.directories
    }
}

/// Copies or moves files and directory trees.
///
/// Single-threaded and blocking. Overwrite questions go to `C`; source
/// files are opened through `O`; progress goes to a [`TransferProgress`].
pub struct TransferEngine<C, O = StdOpener> {
    confirm: C,
    opener: O,
    progress: Box<dyn TransferProgress>,
}

impl<C: fmt::Debug, O: fmt::Debug> fmt::Debug for TransferEngine<C, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferEngine")
            .field("confirm", &self.confirm)
            .field("opener", &self.opener)
            .finish_non_exhaustive()
    }
}

impl<C: Confirm> TransferEngine<C> {
    pub fn new(confirm: C) -> Self {
        Self {
            confirm,
            opener: StdOpener,
            progress: Box::new(NoProgress),
        }
    }
}

impl<C: Confirm, O: SourceOpener> TransferEngine<C, O> {
    /// Replace how source files are opened.
    pub fn with_opener<P: SourceOpener>(self, opener: P) -> TransferEngine<C, P> {
        TransferEngine {
            confirm: self.confirm,
            opener,
            progress: self.progress,
        }
    }

    /// Report every transfer to `progress`.
    pub fn with_progress(mut self, progress: impl TransferProgress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn confirmer(&self) -> &C {
        &self.confirm
    }

    /// Run one transfer to completion.
    pub fn transfer(&mut self, request: &TransferRequest) -> TransferResult {
        let mut result = TransferResult::default();
        debug!(
            source = %request.source.display(),
            destination = %request.destination.display(),
            mode = ?request.mode,
            policy = ?request.overwrite_policy,
            "pending"
        );

        let copied = self.copy_phase(request, &mut result);
        self.progress.finish();
        let source_is_dir = match copied {
            Ok(is_dir) => is_dir,
            Err(error) => {
                debug!(%error, "transfer stopped");
                result.error = Some(match request.mode {
                    TransferMode::Move if !error.is_cancelled() => Error::MoveIncomplete {
                        path: request.source.clone(),
                        cause: Box::new(error),
                    },
                    _ => error,
                });
                return result;
            }
        };

        if request.mode == TransferMode::Move {
            self.remove_source(&request.source, source_is_dir, &mut result);
        }
        debug!(files = result.files, bytes = result.bytes, "succeeded");
        result
    }

    /// Validate, check the destination and copy. Returns whether the source
    /// is a directory.
    fn copy_phase(&mut self, request: &TransferRequest, result: &mut TransferResult) -> Result<bool> {
        debug!("sanitizing");
        let source = require_absolute(&request.source)?;
        let destination = require_absolute(&request.destination)?;

        let metadata = fs::metadata(source).map_err(|e| Error::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        })?;
        guard_overlap(source, destination, metadata.is_dir())?;

        if metadata.is_dir() {
            self.copy_tree(source, destination, request.overwrite_policy, result)?;
        } else {
            self.copy_file(source, destination, request.overwrite_policy, &metadata, result)?;
        }
        Ok(metadata.is_dir())
    }

    /// Apply the overwrite policy to an existing destination.
    fn check_overwrite(&mut self, destination: &Path, policy: OverwritePolicy) -> Result<()> {
        debug!(destination = %destination.display(), ?policy, "checking destination");
        match policy {
            OverwritePolicy::AlwaysOverwrite => Ok(()),
            OverwritePolicy::Fail => Err(Error::DestinationExists {
                path: destination.to_path_buf(),
            }),
            OverwritePolicy::AskUser => {
                let name = destination
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| destination.display().to_string());
                let agreed = self
                    .confirm
                    .confirm(&format!("'{name}' already exists. Overwrite?"))
                    .map_err(|source| Error::Prompt { source })?;
                if agreed {
                    Ok(())
                } else {
                    debug!("cancelled");
                    Err(Error::TransferCancelled {
                        path: destination.to_path_buf(),
                    })
                }
            }
        }
    }

    fn remove_source(&self, source: &Path, is_dir: bool, result: &mut TransferResult) {
        debug!(source = %source.display(), "removing source");
        let removed = if is_dir {
            fs::remove_dir_all(source)
        } else {
            fs::remove_file(source)
        };
        if let Err(e) = removed {
            warn!(source = %source.display(), error = %e, "Source removal failed after copy");
            result.warnings.push(TransferWarning::SourceRemovalFailed {
                path: source.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }
}

/// Best-effort permission copy; failure becomes a warning.
fn apply_permissions(destination: &Path, permissions: fs::Permissions, result: &mut TransferResult) {
    if let Err(e) = fs::set_permissions(destination, permissions) {
        warn!(path = %destination.display(), error = %e, "Could not preserve permissions");
        result.warnings.push(TransferWarning::PermissionsNotPreserved {
            path: destination.to_path_buf(),
            reason: e.to_string(),
        });
    }
}

/// Remove whatever occupies `path` after an overwrite was allowed.
fn remove_existing(path: &Path, existing: &fs::Metadata) -> Result<()> {
    debug!(path = %path.display(), "overwriting");
    let removed = if existing.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| Error::io(path, e))
}

/// Reject transfers onto the source itself, into the source's own subtree,
/// or onto a directory that contains the source. Runs before any overwrite.
fn guard_overlap(source: &Path, destination: &Path, source_is_dir: bool) -> Result<()> {
    let canonical_source = dunce::canonicalize(source).map_err(|e| Error::SourceUnreadable {
        path: source.to_path_buf(),
        source: e,
    })?;
    let target = canonical_destination(destination);
    if target == canonical_source || is_same_file(source, destination) {
        return Err(Error::invalid_path(destination, "source and destination are the same"));
    }
    if source_is_dir && target.starts_with(&canonical_source) {
        return Err(Error::invalid_path(
            destination,
            "destination is inside the source directory",
        ));
    }
    if canonical_source.starts_with(&target) {
        return Err(Error::invalid_path(
            destination,
            "destination contains the source",
        ));
    }
    Ok(())
}

/// Hard links to one inode.
#[cfg(unix)]
fn is_same_file(source: &Path, destination: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(source), fs::metadata(destination)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(_source: &Path, _destination: &Path) -> bool {
    false
}

/// Canonical form of a destination that may not exist yet.
fn canonical_destination(destination: &Path) -> PathBuf {
    if let Ok(existing) = dunce::canonicalize(destination) {
        return existing;
    }
    match (destination.parent(), destination.file_name()) {
        (Some(parent), Some(name)) => dunce::canonicalize(parent)
            .map(|p| p.join(name))
            .unwrap_or_else(|_| destination.to_path_buf()),
        _ => destination.to_path_buf(),
    }
}

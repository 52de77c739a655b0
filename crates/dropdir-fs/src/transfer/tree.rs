//! Recursive directory copy

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::progress::measure_tree;
use super::{OverwritePolicy, TransferEngine, TransferResult, apply_permissions, remove_existing};
use crate::confirm::Confirm;
use crate::transfer::SourceOpener;
use crate::{Error, Result};

/// One entry seen during the walk, relative to the source root.
#[derive(Debug)]
struct FileEntry {
    relative_path: PathBuf,
    is_directory: bool,
    is_symlink: bool,
    permissions: fs::Permissions,
}

impl<C: Confirm, O: SourceOpener> TransferEngine<C, O> {
    /// Copy the tree at `source` to `destination`.
    ///
    /// The overwrite policy is applied once, to the destination root. The
    /// walk stops at the first failing entry with [`Error::PartialCopy`].
    pub(super) fn copy_tree(
        &mut self,
        source: &Path,
        destination: &Path,
        policy: OverwritePolicy,
        result: &mut TransferResult,
    ) -> Result<()> {
        if let Ok(existing) = fs::symlink_metadata(destination) {
            self.check_overwrite(destination, policy)?;
            remove_existing(destination, &existing)?;
        }

        debug!(source = %source.display(), destination = %destination.display(), "transferring");
        let (total_files, total_bytes) = measure_tree(source);
        self.progress.start(source, total_files, total_bytes);
        fs::create_dir_all(destination).map_err(|e| Error::io(destination, e))?;
        result.directories += 1;

        // Directory modes are applied last so a read-only directory can
        // still receive its children.
        let root_permissions = fs::metadata(source)
            .map_err(|e| Error::SourceUnreadable {
                path: source.to_path_buf(),
                source: e,
            })?
            .permissions();
        let mut directories = vec![(destination.to_path_buf(), root_permissions)];

        for entry in WalkDir::new(source)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(source).to_path_buf();
                partial(destination, &path, Error::SourceUnreadable {
                    path: path.clone(),
                    source: e.into(),
                })
            })?;
            let file_entry = FileEntry::from_walk(&entry, source)
                .map_err(|e| partial(destination, entry.path(), e))?;
            let target = destination.join(&file_entry.relative_path);

            if file_entry.is_directory {
                fs::create_dir(&target)
                    .map_err(|e| partial(destination, entry.path(), Error::io(&target, e)))?;
                result.directories += 1;
                directories.push((target, file_entry.permissions));
            } else if file_entry.is_symlink {
                self.copy_symlink(entry.path(), &target, result)
                    .map_err(|e| partial(destination, entry.path(), e))?;
            } else {
                self.copy_tree_file(entry.path(), &target, file_entry.permissions, result)
                    .map_err(|e| partial(destination, entry.path(), e))?;
            }
        }

        for (directory, permissions) in directories.into_iter().rev() {
            apply_permissions(&directory, permissions, result);
        }
        Ok(())
    }

    /// Recreate a symlink as a symlink pointing at the same target.
    #[cfg(unix)]
    fn copy_symlink(&mut self, link: &Path, target: &Path, result: &mut TransferResult) -> Result<()> {
        let points_to = fs::read_link(link).map_err(|e| Error::SourceUnreadable {
            path: link.to_path_buf(),
            source: e,
        })?;
        std::os::unix::fs::symlink(&points_to, target).map_err(|e| Error::CopyIo {
            from: link.to_path_buf(),
            to: target.to_path_buf(),
            source: e,
        })?;
        self.progress.file_started(link);
        result.files += 1;
        Ok(())
    }

    /// Without portable symlink creation, copy what the link points at.
    #[cfg(not(unix))]
    fn copy_symlink(&mut self, link: &Path, target: &Path, result: &mut TransferResult) -> Result<()> {
        let permissions = fs::metadata(link)
            .map_err(|e| Error::SourceUnreadable {
                path: link.to_path_buf(),
                source: e,
            })?
            .permissions();
        self.copy_tree_file(link, target, permissions, result)
    }
}

impl FileEntry {
    fn from_walk(entry: &walkdir::DirEntry, root: &Path) -> Result<Self> {
        let relative_path = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| Error::invalid_path(entry.path(), "entry is outside the source tree"))?
            .to_path_buf();
        let metadata = entry.metadata().map_err(|e| Error::SourceUnreadable {
            path: entry.path().to_path_buf(),
            source: e.into(),
        })?;
        Ok(Self {
            relative_path,
            is_directory: entry.file_type().is_dir(),
            is_symlink: entry.file_type().is_symlink(),
            permissions: metadata.permissions(),
        })
    }
}

fn partial(destination: &Path, entry: &Path, cause: Error) -> Error {
    Error::PartialCopy {
        destination: destination.to_path_buf(),
        entry: entry.to_path_buf(),
        cause: Box::new(cause),
    }
}

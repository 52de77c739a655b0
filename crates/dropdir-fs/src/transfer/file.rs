//! Single-file copy

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use tracing::debug;

use super::progress::Counted;
use super::{OverwritePolicy, TransferEngine, TransferResult, apply_permissions, remove_existing};
use crate::confirm::Confirm;
use crate::{Error, Result};

/// Opens source files for reading.
pub trait SourceOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;
}

/// Opens sources straight from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdOpener;

impl SourceOpener for StdOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }
}

impl<C: Confirm, O: SourceOpener> TransferEngine<C, O> {
    /// Copy one file, applying the overwrite policy if `destination` exists.
    pub(super) fn copy_file(
        &mut self,
        source: &Path,
        destination: &Path,
        policy: OverwritePolicy,
        metadata: &fs::Metadata,
        result: &mut TransferResult,
    ) -> Result<()> {
        let mut reader = self.open_source(source)?;

        if let Ok(existing) = fs::symlink_metadata(destination) {
            self.check_overwrite(destination, policy)?;
            if !existing.is_file() {
                remove_existing(destination, &existing)?;
            }
        }

        debug!(source = %source.display(), destination = %destination.display(), "transferring");
        self.progress.start(source, 1, metadata.len());
        self.stream(&mut reader, source, destination, result)?;
        apply_permissions(destination, metadata.permissions(), result);
        Ok(())
    }

    /// Copy one file into a freshly created tree; never asks.
    pub(super) fn copy_tree_file(
        &mut self,
        source: &Path,
        destination: &Path,
        permissions: fs::Permissions,
        result: &mut TransferResult,
    ) -> Result<()> {
        let mut reader = self.open_source(source)?;
        self.stream(&mut reader, source, destination, result)?;
        apply_permissions(destination, permissions, result);
        Ok(())
    }

    fn open_source(&self, source: &Path) -> Result<Box<dyn Read>> {
        self.opener.open(source).map_err(|e| Error::SourceUnreadable {
            path: source.to_path_buf(),
            source: e,
        })
    }

    /// Stream every byte into `destination`, truncating it first. A failure
    /// leaves whatever was written so far.
    fn stream(
        &mut self,
        reader: &mut dyn Read,
        source: &Path,
        destination: &Path,
        result: &mut TransferResult,
    ) -> Result<()> {
        let copy_error = |e: io::Error| Error::CopyIo {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
            source: e,
        };
        self.progress.file_started(source);
        let mut writer = File::create(destination).map_err(copy_error)?;
        let mut counted = Counted {
            inner: reader,
            progress: self.progress.as_mut(),
        };
        let bytes = io::copy(&mut counted, &mut writer).map_err(copy_error)?;
        writer.flush().map_err(copy_error)?;

        result.files += 1;
        result.bytes += bytes;
        Ok(())
    }
}

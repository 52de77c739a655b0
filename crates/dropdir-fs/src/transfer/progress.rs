//! Progress callbacks for long transfers

use std::io::{self, Read};
use std::path::Path;

use walkdir::WalkDir;

/// Observes a running transfer.
///
/// Every method has an empty default. `start` is called once the
/// destination check passed; `finish` is called after every transfer,
/// including ones that failed or never started.
pub trait TransferProgress {
    /// Totals for the copy about to run.
    fn start(&mut self, _source: &Path, _total_files: u64, _total_bytes: u64) {}

    /// A file or symlink is about to be written.
    fn file_started(&mut self, _path: &Path) {}

    /// `bytes` more were written.
    fn advance(&mut self, _bytes: u64) {}

    fn finish(&mut self) {}
}

/// Reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl TransferProgress for NoProgress {}

/// Reader that reports every chunk it hands out.
pub(super) struct Counted<'a> {
    pub(super) inner: &'a mut dyn Read,
    pub(super) progress: &'a mut dyn TransferProgress,
}

impl Read for Counted<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.progress.advance(n as u64);
        }
        Ok(n)
    }
}

/// Files and bytes below `root`, symlinks counted as empty files.
///
/// Unreadable entries are skipped; the copy itself reports them.
pub(super) fn measure_tree(root: &Path) -> (u64, u64) {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .fold((0, 0), |(files, bytes), entry| {
            let size = if entry.file_type().is_file() {
                entry.metadata().map(|m| m.len()).unwrap_or(0)
            } else {
                0
            };
            (files + 1, bytes + size)
        })
}

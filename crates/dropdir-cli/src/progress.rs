//! Terminal progress bar for drops

use std::io::IsTerminal;
use std::path::Path;

use dropdir_fs::TransferProgress;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) {msg}";

/// Draws one bar per transfer on stderr, cleared when it ends.
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    /// A bar is only worth drawing when stderr is a terminal.
    pub fn enabled() -> bool {
        std::io::stderr().is_terminal()
    }
}

impl TransferProgress for BarProgress {
    fn start(&mut self, _source: &Path, _total_files: u64, total_bytes: u64) {
        let bar = ProgressBar::new(total_bytes);
        bar.set_style(bar_style());
        self.bar = Some(bar);
    }

    fn file_started(&mut self, path: &Path) {
        if let Some(bar) = &self.bar {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            bar.set_message(name);
        }
    }

    fn advance(&mut self, bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(bytes);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

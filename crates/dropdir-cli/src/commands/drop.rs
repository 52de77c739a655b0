//! Drop command: transfer paths into a registered folder

use std::path::{Path, PathBuf};

use colored::Colorize;
use dropdir_core::{recent_folders, resolve_folder};
use dropdir_fs::path::clean;
use dropdir_fs::{
    OverwritePolicy, TerminalConfirm, TransferEngine, TransferMode, TransferRequest, TransferResult,
};
use tracing::debug;

use crate::context::Context;
use crate::error::{CliError, Result};
use crate::interactive;
use crate::progress::BarProgress;

/// Everything `drop` was given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOptions {
    pub paths: Vec<String>,
    pub folder: Option<String>,
    /// `None` asks when interactive and copies otherwise.
    pub mode: Option<TransferMode>,
    pub overwrite_policy: OverwritePolicy,
}

impl DropOptions {
    pub fn mode_from_flags(move_files: bool, copy: bool) -> Option<TransferMode> {
        match (move_files, copy) {
            (true, _) => Some(TransferMode::Move),
            (false, true) => Some(TransferMode::Copy),
            (false, false) => None,
        }
    }

    pub fn policy_from_flags(yes: bool, no_clobber: bool) -> OverwritePolicy {
        if yes {
            OverwritePolicy::AlwaysOverwrite
        } else if no_clobber {
            OverwritePolicy::Fail
        } else {
            OverwritePolicy::AskUser
        }
    }
}

/// Run the drop command
///
/// Sources are transferred in order. A declined overwrite skips that source;
/// any other failure stops the command.
pub fn run_drop(ctx: &Context, options: DropOptions) -> Result<()> {
    let config = ctx.store.load_or_default()?;
    if config.folders.is_empty() {
        return Err(CliError::user(
            "No folders registered. Create one with 'dropdir store <NAME>'",
        ));
    }

    let name = match options.folder {
        Some(name) => name,
        None => {
            interactive::require_interactive("--folder")?;
            interactive::select_folder(&recent_folders(&config, None))?
        }
    };
    let folder = resolve_folder(&config, &name)?;
    if !folder.path.is_dir() {
        return Err(CliError::user(format!(
            "Folder '{}' no longer exists at {}; recreate it with 'dropdir store {}'",
            name.trim(),
            folder.path.display(),
            name.trim()
        )));
    }

    let sources = if options.paths.is_empty() {
        interactive::require_interactive("PATHS")?;
        let line = interactive::prompt_dropped_paths()?;
        ctx.sanitizer.sanitize_dropped(&line)
    } else {
        options
            .paths
            .iter()
            .map(|raw| ctx.sanitizer.sanitize(raw))
            .collect()
    };
    if sources.is_empty() {
        return Err(CliError::user("No paths to drop"));
    }
    let cwd = std::env::current_dir()?;
    let sources: Vec<PathBuf> = sources.iter().map(|s| absolutize(&cwd, s)).collect();

    let mode = match options.mode {
        Some(mode) => mode,
        None if interactive::is_interactive() => interactive::select_mode()?,
        None => TransferMode::Copy,
    };
    debug!(folder = %folder.path.display(), ?mode, count = sources.len(), "dropping");

    let mut engine = TransferEngine::new(TerminalConfirm::terminal());
    if BarProgress::enabled() {
        engine = engine.with_progress(BarProgress::default());
    }
    for source in sources {
        let request = TransferRequest::into_folder(source, &folder.path, mode)?
            .with_policy(options.overwrite_policy);
        let result = engine.transfer(&request);
        report(&request, result)?;
    }
    Ok(())
}

/// Print the outcome of one transfer; a terminal error is returned.
fn report(request: &TransferRequest, result: TransferResult) -> Result<()> {
    for warning in &result.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    let summary = format!(
        "({} {}, {})",
        result.files,
        if result.files == 1 { "file" } else { "files" },
        human_bytes(result.bytes)
    );
    match result.error {
        None => {
            let verb = match request.mode {
                TransferMode::Copy => "Copied",
                TransferMode::Move => "Moved",
            };
            println!(
                "{} {} {} -> {} {}",
                "OK".green().bold(),
                verb,
                request.source.display(),
                request.destination.display().to_string().cyan(),
                summary.dimmed()
            );
            Ok(())
        }
        Some(error) if error.is_cancelled() => {
            println!(
                "{} Skipped {}: {} was kept",
                "-".yellow().bold(),
                request.source.display(),
                request.destination.display()
            );
            Ok(())
        }
        Some(error) => Err(error.into()),
    }
}

/// Resolve a relative path against `cwd`.
fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() || path.as_os_str().is_empty() {
        path.to_path_buf()
    } else {
        clean(&cwd.join(path))
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

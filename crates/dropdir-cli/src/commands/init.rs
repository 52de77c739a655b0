//! Base location setup

use colored::Colorize;
use dropdir_fs::TerminalConfirm;

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

/// Run the init command
pub fn run_init(ctx: &Context, location: Option<String>) -> Result<()> {
    let raw = match location {
        Some(location) => location,
        None => {
            interactive::require_interactive("LOCATION")?;
            let current = ctx.store.load_or_default()?.location;
            let current = current.as_ref().map(|p| p.to_string_lossy().into_owned());
            interactive::prompt_location(current.as_deref())?
        }
    };

    let location = dropdir_core::init_location(
        &ctx.store,
        &raw,
        &ctx.sanitizer,
        &mut TerminalConfirm::terminal(),
    )?;

    println!(
        "{} Base location set to {}",
        "OK".green().bold(),
        location.display().to_string().cyan()
    );
    println!(
        "Create a folder with {}.",
        "dropdir store <NAME>".cyan()
    );
    Ok(())
}

//! Folder registry commands: store, recent, forget

use chrono::Local;
use colored::Colorize;
use dropdir_core::{Folder, recent_folders};
use dropdir_fs::TerminalConfirm;

use crate::context::Context;
use crate::error::Result;
use crate::interactive;

/// Run the store command
pub fn run_store(ctx: &Context, name: Option<String>, description: Option<String>) -> Result<()> {
    let (name, description) = match name {
        Some(name) => (name, description),
        None => {
            interactive::require_interactive("NAME")?;
            let name = interactive::prompt_folder_name()?;
            let description = match description {
                Some(description) => Some(description),
                None => interactive::prompt_description()?,
            };
            (name, description)
        }
    };

    let (name, folder) = dropdir_core::create_folder(
        &ctx.store,
        &name,
        description,
        &mut TerminalConfirm::terminal(),
    )?;

    println!(
        "{} Created folder '{}' at {}",
        "OK".green().bold(),
        name.green(),
        folder.path.display().to_string().cyan()
    );
    Ok(())
}

/// Run the recent command
pub fn run_recent(ctx: &Context, limit: Option<usize>, json: bool) -> Result<()> {
    let config = ctx.store.load_or_default()?;
    let folders = recent_folders(&config, limit);

    if json {
        let output: Vec<serde_json::Value> = folders
            .iter()
            .map(|(name, folder)| {
                serde_json::json!({
                    "name": name,
                    "path": folder.path,
                    "created_at": folder.created_at.to_rfc3339(),
                    "description": folder.description,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    if folders.is_empty() {
        println!("{}", "No folders yet.".dimmed());
        println!("Create one with {}.", "dropdir store <NAME>".cyan());
        return Ok(());
    }

    println!("{}", "Recent folders".bold());
    println!();
    let width = folders.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, folder) in &folders {
        println!("  {}", render_row(name, folder, width));
    }
    Ok(())
}

fn render_row(name: &str, folder: &Folder, width: usize) -> String {
    let created = folder
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    let mut row = format!(
        "{}  {}  {}",
        format!("{name:<width$}").green(),
        created.to_string().dimmed(),
        folder.path.display()
    );
    if let Some(description) = &folder.description {
        row.push_str(&format!("  {}", description.dimmed()));
    }
    row
}

/// Run the forget command
pub fn run_forget(ctx: &Context, name: &str) -> Result<()> {
    let folder = dropdir_core::remove_folder(&ctx.store, name)?;
    println!(
        "{} Forgot '{}'; {} was left in place",
        "OK".green().bold(),
        name.trim(),
        folder.path.display()
    );
    Ok(())
}

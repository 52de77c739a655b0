//! Interactive prompts for arguments left off the command line
//!
//! Uses dialoguer for terminal input and selection. Yes/no confirmations go
//! through [`dropdir_fs::TerminalConfirm`] instead so they also work when
//! stdin is piped.

use std::io::IsTerminal;

use dialoguer::{Input, Select};
use dropdir_core::Folder;
use dropdir_fs::TransferMode;

use crate::error::{CliError, Result};

/// Whether prompts can be shown at all.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Fail with a hint naming the missing argument when prompting is impossible.
pub fn require_interactive(missing: &str) -> Result<()> {
    if is_interactive() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{missing} is required when not running in a terminal"
        )))
    }
}

pub fn prompt_location(current: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt("Base location");
    if let Some(current) = current {
        input = input.default(current.to_string());
    }
    Ok(input.interact_text()?)
}

pub fn prompt_folder_name() -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt("Folder name")
        .interact_text()?)
}

/// Optional description; an empty answer means none.
pub fn prompt_description() -> Result<Option<String>> {
    let description: String = Input::new()
        .with_prompt("Description (optional)")
        .allow_empty(true)
        .interact_text()?;
    let description = description.trim();
    Ok((!description.is_empty()).then(|| description.to_string()))
}

/// Pick one of `folders`, which are expected newest first.
pub fn select_folder(folders: &[(&str, &Folder)]) -> Result<String> {
    let items: Vec<String> = folders
        .iter()
        .map(|(name, folder)| match &folder.description {
            Some(description) => format!("{name} - {description}"),
            None => name.to_string(),
        })
        .collect();
    let index = Select::new()
        .with_prompt("Drop into")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(folders[index].0.to_string())
}

/// One line of dragged-and-dropped paths.
pub fn prompt_dropped_paths() -> Result<String> {
    Ok(Input::<String>::new()
        .with_prompt("Drag files here and press enter")
        .interact_text()?)
}

pub fn select_mode() -> Result<TransferMode> {
    const MODES: &[&str] = &["Copy", "Move"];
    let index = Select::new()
        .with_prompt("Copy or move?")
        .items(MODES)
        .default(0)
        .interact()?;
    Ok(if index == 1 {
        TransferMode::Move
    } else {
        TransferMode::Copy
    })
}

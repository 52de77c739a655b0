//! Base location and named folder operations
//!
//! Every operation that changes the registry goes through
//! [`ConfigStore::update`], so concurrent writers never drop each other's
//! entries. Prompts happen before the lock is taken.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use dropdir_fs::{Confirm, PathSanitizer, require_absolute, validate_path_identifier};
use tracing::{debug, info};

use crate::config::{ConfigStore, Folder, StorageConfig};
use crate::{Error, Result};

/// Set the base location new folders are created in.
///
/// `raw_location` goes through `sanitizer` and must end up absolute. A
/// missing directory is created only after `confirm` agrees. Registered
/// folders are kept.
pub fn init_location(
    store: &ConfigStore,
    raw_location: &str,
    sanitizer: &PathSanitizer,
    confirm: &mut dyn Confirm,
) -> Result<PathBuf> {
    let location = sanitizer.sanitize(raw_location);
    require_absolute(&location)?;
    ensure_directory(&location, confirm, AskWhen::Missing)?;

    store.update(|config| {
        config.location = Some(location.clone());
        Ok(())
    })?;
    info!(location = %location.display(), "base location set");
    Ok(location)
}

/// Create `name` under the base location and register it.
///
/// An already existing directory is reused only after `confirm` agrees.
/// Registering a name again replaces the previous entry.
pub fn create_folder(
    store: &ConfigStore,
    name: &str,
    description: Option<String>,
    confirm: &mut dyn Confirm,
) -> Result<(String, Folder)> {
    let name = name.trim();
    validate_path_identifier(name, "folder name").map_err(|reason| Error::InvalidFolderName {
        name: name.to_string(),
        reason,
    })?;

    let path = store.load_or_default()?.require_location()?.join(name);
    ensure_directory(&path, confirm, AskWhen::Existing)?;

    let folder = Folder {
        path,
        created_at: Utc::now(),
        description: description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    };
    store.update(|config| {
        config.folders.insert(name.to_string(), folder.clone());
        Ok(())
    })?;
    info!(name, path = %folder.path.display(), "folder created");
    Ok((name.to_string(), folder))
}

/// Folders newest first; ties ordered by name. `limit` caps the count.
pub fn recent_folders(config: &StorageConfig, limit: Option<usize>) -> Vec<(&str, &Folder)> {
    let mut folders: Vec<(&str, &Folder)> = config
        .folders
        .iter()
        .map(|(name, folder)| (name.as_str(), folder))
        .collect();
    folders.sort_by(|(a_name, a), (b_name, b)| {
        b.created_at.cmp(&a.created_at).then_with(|| a_name.cmp(b_name))
    });
    if let Some(limit) = limit {
        folders.truncate(limit);
    }
    folders
}

/// Look up a registered folder by name.
pub fn resolve_folder<'a>(config: &'a StorageConfig, name: &str) -> Result<&'a Folder> {
    config
        .folders
        .get(name.trim())
        .ok_or_else(|| Error::FolderNotFound {
            name: name.trim().to_string(),
        })
}

/// Unregister a folder. The directory itself stays on disk.
pub fn remove_folder(store: &ConfigStore, name: &str) -> Result<Folder> {
    let folder = store.update(|config| {
        config
            .folders
            .remove(name.trim())
            .ok_or_else(|| Error::FolderNotFound {
                name: name.trim().to_string(),
            })
    })?;
    info!(name = name.trim(), "folder forgotten");
    Ok(folder)
}

/// When to stop and ask before using a directory.
#[derive(Debug, Clone, Copy)]
enum AskWhen {
    /// Ask before creating a missing directory.
    Missing,
    /// Ask before reusing a directory that is already there.
    Existing,
}

/// Make sure `path` is a directory, asking first in the `ask` case.
fn ensure_directory(path: &Path, confirm: &mut dyn Confirm, ask: AskWhen) -> Result<()> {
    let exists = match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => true,
        Ok(_) => {
            return Err(dropdir_fs::Error::invalid_path(path, "exists and is not a directory").into());
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(Error::io(path, e)),
    };

    let question = match (ask, exists) {
        (AskWhen::Missing, false) => Some("does not exist. Create it?"),
        (AskWhen::Existing, true) => Some("already exists. Use it?"),
        _ => None,
    };
    if let Some(question) = question {
        let agreed = confirm
            .confirm(&format!("'{}' {question}", path.display()))
            .map_err(|e| Error::io(path, e))?;
        if !agreed {
            debug!(path = %path.display(), "declined");
            return Err(Error::cancelled("Operation cancelled"));
        }
    }

    if !exists {
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}

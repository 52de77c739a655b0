//! Folder registry for dropdir
//!
//! Holds the persisted [`StorageConfig`] (base location plus named folders)
//! and the operations that read and change it.

pub mod config;
pub mod error;
pub mod folders;

pub use config::{ConfigFormat, ConfigStore, Folder, StorageConfig};
pub use error::{Error, Result};
pub use folders::{create_folder, init_location, recent_folders, remove_folder, resolve_folder};

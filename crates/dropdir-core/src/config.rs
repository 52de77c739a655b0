//! Persisted folder registry
//!
//! The registry is one file holding the base location and every named
//! folder. Its format follows the file extension.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dropdir_fs::{FileLock, RobustnessConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Directory under the platform config dir that holds the registry.
pub const APP_DIR: &str = "dropdir";

/// Registry file name used when no path is given.
pub const DEFAULT_FILE_NAME: &str = "config.json";

/// A named folder created under the base location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The whole registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory new folders are created in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
    #[serde(default)]
    pub folders: BTreeMap<String, Folder>,
}

impl StorageConfig {
    /// Base location, or [`Error::LocationNotSet`].
    pub fn require_location(&self) -> Result<&Path> {
        self.location.as_deref().ok_or(Error::LocationNotSet)
    }
}

/// On-disk encoding of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    ///
    /// A path without an extension is JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("json")
            .to_lowercase();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }

    fn parse(self, content: &str) -> std::result::Result<StorageConfig, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    fn render(self, config: &StorageConfig) -> std::result::Result<String, String> {
        match self {
            Self::Json => serde_json::to_string_pretty(config)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| e.to_string()),
            Self::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::to_string(config).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
        })
    }
}

/// Reads and writes the registry file at one fixed path.
///
/// Passed explicitly to every operation that needs it; there is no global
/// instance.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    format: ConfigFormat,
    robustness: RobustnessConfig,
}

impl ConfigStore {
    /// Store backed by `path`; fails on an unsupported extension.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = ConfigFormat::from_path(&path)?;
        Ok(Self {
            path,
            format,
            robustness: RobustnessConfig::default(),
        })
    }

    /// Store at `<config dir>/dropdir/config.json`.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_location()?)
    }

    /// Platform location of the registry.
    pub fn default_location() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or(Error::NoConfigDir)?;
        Ok(base.join(APP_DIR).join(DEFAULT_FILE_NAME))
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the registry.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigMissing`] if the file does not exist,
    /// [`Error::ConfigCorrupt`] if it cannot be parsed.
    pub fn load(&self) -> Result<StorageConfig> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigMissing {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(Error::io(&self.path, e)),
        };
        debug!(path = %self.path.display(), format = %self.format, "loading registry");
        self.format.parse(&content).map_err(|message| Error::ConfigCorrupt {
            path: self.path.clone(),
            format: self.format.to_string(),
            message,
        })
    }

    /// Like [`load`](Self::load), but a missing file is an empty registry.
    pub fn load_or_default(&self) -> Result<StorageConfig> {
        match self.load() {
            Err(Error::ConfigMissing { .. }) => {
                debug!(path = %self.path.display(), "no registry yet, starting empty");
                Ok(StorageConfig::default())
            }
            other => other,
        }
    }

    /// Write the registry atomically, creating parent directories.
    pub fn save(&self, config: &StorageConfig) -> Result<()> {
        let _lock = self.lock()?;
        self.write_unlocked(config)
    }

    /// Load, change and save the registry under one lock.
    ///
    /// A missing file starts as an empty registry. Nothing is written when
    /// `change` fails.
    pub fn update<T>(&self, change: impl FnOnce(&mut StorageConfig) -> Result<T>) -> Result<T> {
        let _lock = self.lock()?;
        let mut config = self.load_or_default()?;
        let value = change(&mut config)?;
        self.write_unlocked(&config)?;
        Ok(value)
    }

    fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(&self.path, self.robustness).map_err(|e| self.write_error(e))
    }

    fn write_unlocked(&self, config: &StorageConfig) -> Result<()> {
        let content = self.format.render(config).map_err(|message| Error::ConfigWriteError {
            path: self.path.clone(),
            message,
        })?;
        debug!(path = %self.path.display(), folders = config.folders.len(), "saving registry");
        dropdir_fs::io::replace_file(&self.path, content.as_bytes(), self.robustness.enable_fsync)
            .map_err(|e| self.write_error(e))
    }

    fn write_error(&self, e: dropdir_fs::Error) -> Error {
        Error::ConfigWriteError {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

//! [`TestStorage`] scratch environment for registry and drop scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory laid out as:
///
/// - `config/config.json`: registry path (not created until written)
/// - `storage/`: base location for named folders
/// - `incoming/`: where test sources are written
///
/// # Example
///
/// ```rust,no_run
/// use dropdir_test_utils::storage::TestStorage;
///
/// let env = TestStorage::new();
/// env.write_registry(&["inbox"]);
/// let source = env.write_source("report.txt", "quarterly");
/// assert!(source.is_absolute());
/// ```
pub struct TestStorage {
    temp_dir: TempDir,
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStorage {
    /// Create the temp directory with empty `storage/` and `incoming/`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("storage")).unwrap();
        fs::create_dir(temp_dir.path().join("incoming")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Registry path with the given extension, e.g. `"toml"`.
    pub fn config_path_with(&self, extension: &str) -> PathBuf {
        self.root().join("config").join(format!("config.{extension}"))
    }

    /// Default JSON registry path.
    pub fn config_path(&self) -> PathBuf {
        self.config_path_with("json")
    }

    pub fn location(&self) -> PathBuf {
        self.root().join("storage")
    }

    pub fn incoming(&self) -> PathBuf {
        self.root().join("incoming")
    }

    /// Write a JSON registry with the base location set and one folder per
    /// name, each created on disk. `created_at` increases with position, so
    /// the last name is the newest.
    pub fn write_registry(&self, folders: &[&str]) {
        let location = self.location();
        let entries = folders
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let path = location.join(name);
                fs::create_dir_all(&path).unwrap();
                format!(
                    "    {}: {{\"path\": {}, \"created_at\": \"2024-01-{:02}T09:00:00Z\"}}",
                    json_string(name),
                    json_string(&path.to_string_lossy()),
                    i + 1
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");

        let config = format!(
            "{{\n  \"location\": {},\n  \"folders\": {{\n{entries}\n  }}\n}}\n",
            json_string(&location.to_string_lossy())
        );
        let path = self.config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, config).unwrap();
    }

    /// Write `content` to `incoming/<relative>` and return the absolute path.
    pub fn write_source(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.incoming().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Path of `name` inside the base location.
    pub fn folder(&self, name: &str) -> PathBuf {
        self.location().join(name)
    }

    /// Read the registry file as text.
    ///
    /// # Panics
    /// Panics if the registry has not been written.
    pub fn registry_text(&self) -> String {
        let path = self.config_path();
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read registry: {}", path.display()))
    }
}

fn json_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

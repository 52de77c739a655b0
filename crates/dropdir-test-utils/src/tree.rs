//! Source tree fixtures and comparison helpers.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Create a small project tree under `root/<name>` and return its path.
///
/// Layout: 3 files and 2 nested directories.
///
/// ```text
/// <name>/
///   README.md
///   src/
///     main.rs
///     util/
///       mod.rs
/// ```
pub fn sample_tree(root: &Path, name: &str) -> PathBuf {
    let base = root.join(name);
    fs::create_dir_all(base.join("src/util")).unwrap();
    fs::write(base.join("README.md"), "# sample\n").unwrap();
    fs::write(base.join("src/main.rs"), "fn main() {}\n").unwrap();
    fs::write(base.join("src/util/mod.rs"), "pub fn helper() {}\n").unwrap();
    base
}

/// Relative paths of every entry below `root`, sorted, directories marked
/// with a trailing `/`.
pub fn listing(root: &Path) -> Vec<String> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            if entry.file_type().is_dir() {
                format!("{relative}/")
            } else {
                relative
            }
        })
        .collect()
}

/// Assert that two trees hold the same entries and file contents.
///
/// # Panics
/// Panics naming the first difference.
pub fn assert_same_tree(expected: &Path, actual: &Path) {
    let expected_entries = listing(expected);
    assert_eq!(
        expected_entries,
        listing(actual),
        "Trees differ: {} vs {}",
        expected.display(),
        actual.display()
    );
    for entry in expected_entries.iter().filter(|e| !e.ends_with('/')) {
        let left = fs::read(expected.join(entry)).unwrap();
        let right = fs::read(actual.join(entry)).unwrap();
        assert!(left == right, "Content differs for {entry}");
    }
}

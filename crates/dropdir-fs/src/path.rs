//! Sanitization of user-supplied paths
//!
//! Paths typed or dragged into a terminal arrive quoted, tilde-prefixed and
//! full of redundant segments. [`PathSanitizer`] turns them into clean paths
//! without touching the filesystem.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Upper bound on sanitize passes; real input settles in one or two.
const MAX_PASSES: usize = 32;

/// Cleans raw path strings: strips quotes, expands `~`, resolves `.`/`..`.
#[derive(Debug, Clone, Default)]
pub struct PathSanitizer {
    home: Option<PathBuf>,
}

impl PathSanitizer {
    /// Create a sanitizer that expands `~` to the invoking user's home
    /// directory as recorded by the operating system.
    pub fn new() -> Self {
        Self { home: user_home() }
    }

    /// Create a sanitizer with an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    /// The directory `~` expands to, if one could be resolved.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Sanitize a raw path string.
    ///
    /// Empty input yields an empty path. The result is not checked for
    /// existence or absoluteness; see [`require_absolute`].
    ///
    /// Passes repeat until the output is stable, so a path that becomes
    /// quoted or padded only after cleaning is stripped too and
    /// `sanitize(sanitize(p)) == sanitize(p)` holds.
    pub fn sanitize(&self, raw: &str) -> PathBuf {
        let mut current = self.sanitize_once(raw);
        for _ in 0..MAX_PASSES {
            let text = current.to_string_lossy().into_owned();
            let next = self.sanitize_once(&text);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Split a drag-and-drop line into paths and sanitize each one.
    pub fn sanitize_dropped(&self, line: &str) -> Vec<PathBuf> {
        split_dropped_paths(line)
            .iter()
            .map(|raw| self.sanitize(raw))
            .filter(|path| !path.as_os_str().is_empty())
            .collect()
    }

    fn sanitize_once(&self, raw: &str) -> PathBuf {
        let stripped = strip_quotes(raw);
        if stripped.is_empty() {
            return PathBuf::new();
        }
        clean(&self.expand_tilde(stripped))
    }

    fn expand_tilde(&self, path: &str) -> PathBuf {
        let rest = match path.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with(std::path::is_separator) => rest,
            _ => return PathBuf::from(path),
        };
        match &self.home {
            Some(home) => {
                let mut expanded = OsString::from(home.as_os_str());
                expanded.push(rest);
                PathBuf::from(expanded)
            }
            None => PathBuf::from(path),
        }
    }
}

/// Sanitize `raw` using the system home directory.
pub fn sanitize(raw: &str) -> PathBuf {
    PathSanitizer::new().sanitize(raw)
}

/// Fail with [`Error::InvalidPath`] unless `path` is non-empty and absolute.
pub fn require_absolute(path: &Path) -> Result<&Path> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid_path(path, "path is empty"));
    }
    if !path.is_absolute() {
        return Err(Error::invalid_path(path, "path must be absolute"));
    }
    Ok(path)
}

/// Check that `value` can be used as a single path component.
///
/// Returns a message starting with `label` when it cannot.
pub fn validate_path_identifier(value: &str, label: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{label} cannot be empty"));
    }
    if value == "." || value == ".." {
        return Err(format!("{label} cannot be '{value}'"));
    }
    if value.contains(['/', '\\']) {
        return Err(format!("{label} must not contain path separators"));
    }
    if value.contains('\0') {
        return Err(format!("{label} must not contain NUL bytes"));
    }
    Ok(())
}

/// Lexically clean a path.
///
/// Collapses repeated separators, drops `.` segments and resolves `..`
/// against the preceding segment. `..` above the root stays at the root;
/// leading `..` in a relative path is kept. An empty result becomes `.`.
pub fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Split one line of terminal drag-and-drop input into raw path strings.
///
/// Whitespace separates paths. Single or double quotes group a path that
/// contains spaces, and outside quotes a backslash escapes the next
/// character (`My\ File.txt`). Backslash escaping is disabled on Windows,
/// where it is the path separator.
pub fn split_dropped_paths(line: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.trim().chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => quote = Some(c),
            (None, '\\') if cfg!(not(windows)) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    paths.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(current);
    }
    paths
}

/// Trim whitespace and peel matching surrounding quotes, layer by layer.
fn strip_quotes(raw: &str) -> &str {
    let mut current = raw.trim();
    while current.len() >= 2
        && ['"', '\''].iter().any(|&q| current.starts_with(q) && current.ends_with(q))
    {
        current = current[1..current.len() - 1].trim();
    }
    current
}

/// Home directory from the password database for the real user id.
/// `$HOME` is not consulted.
#[cfg(unix)]
fn user_home() -> Option<PathBuf> {
    use std::ffi::{CStr, OsStr};
    use std::os::unix::ffi::OsStrExt;
    use std::{mem, ptr};

    let uid = unsafe { libc::getuid() };
    let mut buf = vec![0; 2048];
    let mut passwd = unsafe { mem::zeroed::<libc::passwd>() };
    let mut result = ptr::null_mut::<libc::passwd>();

    loop {
        let r = unsafe { libc::getpwuid_r(uid, &mut passwd, buf.as_mut_ptr(), buf.len(), &mut result) };
        if r != libc::ERANGE {
            break;
        }
        let newsize = buf.len().checked_mul(2)?;
        buf.resize(newsize, 0);
    }

    if result.is_null() || passwd.pw_dir.is_null() {
        tracing::debug!(uid, "No password database entry for current user");
        return None;
    }

    let home = PathBuf::from(OsStr::from_bytes(
        unsafe { CStr::from_ptr(passwd.pw_dir) }.to_bytes(),
    ));
    home.is_absolute().then_some(home)
}

#[cfg(not(unix))]
fn user_home() -> Option<PathBuf> {
    dirs::home_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sanitizer() -> PathSanitizer {
        PathSanitizer::with_home("/home/alice")
    }

    #[rstest]
    #[case("\"/tmp/a b\"", "/tmp/a b")]
    #[case("'/tmp/x'", "/tmp/x")]
    #[case("  /tmp/x  ", "/tmp/x")]
    #[case("/tmp//a///b/", "/tmp/a/b")]
    #[case("/tmp/./a/../b", "/tmp/b")]
    #[case("/../..", "/")]
    #[case("a/../../b", "../b")]
    #[case("~", "/home/alice")]
    #[case("~/docs/../music", "/home/alice/music")]
    #[case("~bob/docs", "~bob/docs")]
    fn sanitize_cases(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitizer().sanitize(raw), PathBuf::from(expected));
    }

    #[test]
    fn sanitize_empty_input_is_empty_path() {
        assert_eq!(sanitizer().sanitize("   "), PathBuf::new());
        assert_eq!(sanitizer().sanitize("\"\""), PathBuf::new());
    }

    #[test]
    fn sanitize_without_home_leaves_tilde() {
        let sanitizer = PathSanitizer::default();
        assert_eq!(sanitizer.sanitize("~/x"), PathBuf::from("~/x"));
    }

    #[test]
    fn sanitize_keeps_mismatched_quotes() {
        assert_eq!(sanitizer().sanitize("\"/tmp/x'"), PathBuf::from("\"/tmp/x'"));
    }

    #[rstest]
    #[case("", "cannot be empty")]
    #[case("..", "cannot be '..'")]
    #[case("a/b", "path separators")]
    #[case("a\\b", "path separators")]
    fn identifier_rejections(#[case] value: &str, #[case] expected: &str) {
        let message = validate_path_identifier(value, "Folder name").unwrap_err();
        assert!(message.starts_with("Folder name"));
        assert!(message.contains(expected), "got: {message}");
    }

    #[test]
    fn identifier_accepts_spaces_and_dots() {
        assert!(validate_path_identifier("Tax Returns 2024.v2", "Folder name").is_ok());
    }

    #[test]
    fn require_absolute_rejects_relative_and_empty() {
        assert!(matches!(
            require_absolute(Path::new("relative/path")),
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            require_absolute(Path::new("")),
            Err(Error::InvalidPath { .. })
        ));
        assert!(require_absolute(Path::new("/abs")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn split_handles_quotes_and_escapes() {
        let parts = split_dropped_paths(r#"/tmp/a.txt '/tmp/with space' "/tmp/dq x" /tmp/esc\ aped"#);
        assert_eq!(
            parts,
            vec!["/tmp/a.txt", "/tmp/with space", "/tmp/dq x", "/tmp/esc aped"]
        );
    }

    #[test]
    fn split_ignores_extra_whitespace() {
        assert_eq!(split_dropped_paths("  /a    /b \t"), vec!["/a", "/b"]);
        assert!(split_dropped_paths("   ").is_empty());
    }

    #[test]
    fn sanitize_dropped_expands_each_path() {
        let paths = sanitizer().sanitize_dropped("~/a.txt '/tmp/b c/'");
        assert_eq!(
            paths,
            vec![PathBuf::from("/home/alice/a.txt"), PathBuf::from("/tmp/b c")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_home_is_absolute_when_present() {
        if let Some(home) = PathSanitizer::new().home() {
            assert!(home.is_absolute());
        }
    }
}

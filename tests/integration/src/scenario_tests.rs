//! Transfer scenarios run against a registered folder
//!
//! Each test resolves its destination through the registry, the way the
//! `drop` command does, then drives the transfer engine directly.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use dropdir_core::{ConfigStore, resolve_folder};
use dropdir_fs::{
    ScriptedConfirm, SourceOpener, TransferEngine, TransferMode, TransferRequest, TransferStatus,
};
use dropdir_test_utils::storage::TestStorage;
use dropdir_test_utils::tree::{assert_same_tree, listing};
use pretty_assertions::assert_eq;

fn folder_path(env: &TestStorage, name: &str) -> PathBuf {
    let config = ConfigStore::open(env.config_path()).unwrap().load().unwrap();
    resolve_folder(&config, name).unwrap().path.clone()
}

/// Opens files normally but fails every read after the first chunk.
struct BrokenDisk;

struct BrokenReader {
    inner: fs::File,
    served: bool,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::other("simulated read failure"));
        }
        self.served = true;
        let limit = buf.len().min(4);
        self.inner.read(&mut buf[..limit])
    }
}

impl SourceOpener for BrokenDisk {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(BrokenReader {
            inner: fs::File::open(path)?,
            served: false,
        }))
    }
}

#[cfg(unix)]
#[test]
fn copy_single_file_keeps_mode_and_bytes() {
    use std::os::unix::fs::PermissionsExt;

    let env = TestStorage::new();
    env.write_registry(&["work"]);
    let source = env.write_source("a/report.txt", "line one\nline two\n");
    fs::set_permissions(&source, fs::Permissions::from_mode(0o644)).unwrap();
    let work = folder_path(&env, "work");

    let mut engine = TransferEngine::new(ScriptedConfirm::default());
    let request = TransferRequest::into_folder(&source, &work, TransferMode::Copy).unwrap();
    let result = engine.transfer(&request);

    assert_eq!(result.status(), TransferStatus::Succeeded);
    let copied = work.join("report.txt");
    assert_eq!(fs::read(&copied).unwrap(), fs::read(&source).unwrap());
    assert_eq!(fs::metadata(&copied).unwrap().permissions().mode() & 0o777, 0o644);
    assert!(engine.confirmer().asked().is_empty());
}

#[test]
fn copy_directory_tree_into_folder() {
    let env = TestStorage::new();
    env.write_registry(&["work"]);
    env.write_source("proj/a.txt", "alpha");
    env.write_source("proj/sub/b.txt", "beta");
    let source = env.incoming().join("proj");
    let work = folder_path(&env, "work");

    let mut engine = TransferEngine::new(ScriptedConfirm::default());
    let result = engine.transfer(&TransferRequest::into_folder(&source, &work, TransferMode::Copy).unwrap());

    assert!(result.is_success(), "{:?}", result.error);
    assert_eq!(listing(&work.join("proj")), ["a.txt", "sub/", "sub/b.txt"]);
    assert_eq!(fs::read_to_string(work.join("proj/sub/b.txt")).unwrap(), "beta");
    assert_same_tree(&source, &work.join("proj"));
    assert_eq!(result.files, 2);
}

#[test]
fn move_with_failing_read_keeps_source() {
    let env = TestStorage::new();
    env.write_registry(&["work"]);
    let source = env.write_source("x.txt", "important content that must survive");
    let work = folder_path(&env, "work");

    let mut engine = TransferEngine::new(ScriptedConfirm::default()).with_opener(BrokenDisk);
    let result = engine.transfer(&TransferRequest::into_folder(&source, &work, TransferMode::Move).unwrap());

    assert_eq!(result.status(), TransferStatus::MoveIncomplete);
    assert_eq!(
        fs::read_to_string(&source).unwrap(),
        "important content that must survive"
    );
    let partial = work.join("x.txt");
    if partial.exists() {
        assert!(fs::metadata(&partial).unwrap().len() < fs::metadata(&source).unwrap().len());
    }
}

#[test]
fn move_directory_leaves_no_source() {
    let env = TestStorage::new();
    env.write_registry(&["work"]);
    env.write_source("bundle/one.txt", "1");
    env.write_source("bundle/deep/two.txt", "2");
    let source = env.incoming().join("bundle");
    let work = folder_path(&env, "work");

    let mut engine = TransferEngine::new(ScriptedConfirm::default());
    let result = engine.transfer(&TransferRequest::into_folder(&source, &work, TransferMode::Move).unwrap());

    assert_eq!(result.status(), TransferStatus::Succeeded);
    assert!(result.warnings.is_empty());
    assert!(!source.exists());
    assert_eq!(listing(&work.join("bundle")), ["deep/", "deep/two.txt", "one.txt"]);
}

#[test]
fn declined_overwrite_leaves_destination_untouched() {
    let env = TestStorage::new();
    env.write_registry(&["work"]);
    let work = folder_path(&env, "work");
    env.write_source("proj/new.txt", "new");
    fs::create_dir_all(work.join("proj")).unwrap();
    fs::write(work.join("proj/old.txt"), "old").unwrap();
    let before = listing(&work);

    let mut engine = TransferEngine::new(ScriptedConfirm::new(["n"]));
    let request =
        TransferRequest::into_folder(env.incoming().join("proj"), &work, TransferMode::Copy).unwrap();
    let result = engine.transfer(&request);

    assert_eq!(result.status(), TransferStatus::Cancelled);
    assert_eq!(listing(&work), before);
    assert_eq!(fs::read_to_string(work.join("proj/old.txt")).unwrap(), "old");
}

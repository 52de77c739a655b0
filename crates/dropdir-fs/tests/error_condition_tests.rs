//! Transfers and writes under adverse filesystem conditions
//!
//! Permission-based cases are skipped when running as root, which bypasses
//! permission checks.

use dropdir_fs::{
    Error, OverwritePolicy, ScriptedConfirm, TransferEngine, TransferMode, TransferRequest,
    TransferStatus, TransferWarning,
};
use tempfile::tempdir;

#[test]
fn missing_source_is_unreadable() {
    let dir = tempdir().unwrap();
    let mut engine = TransferEngine::new(ScriptedConfirm::default());

    let result = engine.transfer(&TransferRequest::new(
        dir.path().join("ghost.txt"),
        dir.path().join("out.txt"),
        TransferMode::Copy,
    ));

    assert_eq!(result.status(), TransferStatus::Failed);
    assert!(matches!(result.error, Some(Error::SourceUnreadable { .. })));
    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn missing_destination_parent_is_copy_error() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("a.txt");
    std::fs::write(&source, "a").unwrap();
    let mut engine = TransferEngine::new(ScriptedConfirm::default());

    let result = engine.transfer(&TransferRequest::new(
        &source,
        dir.path().join("no/such/dir/a.txt"),
        TransferMode::Copy,
    ));

    assert!(matches!(result.error, Some(Error::CopyIo { .. })));
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use std::fs::{self, Permissions};
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        unsafe { libc::getuid() == 0 }
    }

    #[test]
    fn broken_symlink_source_is_unreadable() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink(dir.path().join("nowhere"), &link).unwrap();
        let mut engine = TransferEngine::new(ScriptedConfirm::default());

        let result = engine.transfer(&TransferRequest::new(&link, dir.path().join("out"), TransferMode::Copy));

        assert!(matches!(result.error, Some(Error::SourceUnreadable { .. })));
    }

    #[test]
    fn unreadable_source_file_is_reported() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let source = dir.path().join("secret.txt");
        fs::write(&source, "secret").unwrap();
        fs::set_permissions(&source, Permissions::from_mode(0o000)).unwrap();
        let mut engine = TransferEngine::new(ScriptedConfirm::default());

        let result = engine.transfer(&TransferRequest::new(&source, dir.path().join("copy.txt"), TransferMode::Copy));

        let _ = fs::set_permissions(&source, Permissions::from_mode(0o644));
        assert!(matches!(result.error, Some(Error::SourceUnreadable { .. })));
        assert!(!dir.path().join("copy.txt").exists());
    }

    #[test]
    fn unreadable_entry_aborts_walk_with_partial_copy() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let source = dir.path().join("proj");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();
        fs::write(source.join("b.txt"), "b").unwrap();
        fs::set_permissions(source.join("b.txt"), Permissions::from_mode(0o000)).unwrap();
        let destination = dir.path().join("out");
        let mut engine = TransferEngine::new(ScriptedConfirm::default());

        let result = engine.transfer(&TransferRequest::new(&source, &destination, TransferMode::Copy));

        let _ = fs::set_permissions(source.join("b.txt"), Permissions::from_mode(0o644));
        assert_eq!(result.status(), TransferStatus::PartialCopy);
        let message = result.error.as_ref().unwrap().to_string();
        assert!(message.contains("destination is incomplete"), "got: {message}");
        // Entries are walked in name order, so a.txt was copied before the failure
        assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "a");
    }

    #[test]
    fn move_from_readonly_parent_warns_and_keeps_copy() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let source = locked.join("x.txt");
        fs::write(&source, "payload").unwrap();
        fs::set_permissions(&locked, Permissions::from_mode(0o555)).unwrap();
        let destination = dir.path().join("x.txt");
        let mut engine = TransferEngine::new(ScriptedConfirm::default());

        let result = engine.transfer(&TransferRequest::new(&source, &destination, TransferMode::Move));

        let _ = fs::set_permissions(&locked, Permissions::from_mode(0o755));
        assert_eq!(result.status(), TransferStatus::Succeeded);
        assert!(matches!(
            result.warnings.as_slice(),
            [TransferWarning::SourceRemovalFailed { .. }]
        ));
        assert!(source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "payload");
    }

    #[test]
    fn write_atomic_to_readonly_directory_returns_error() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let readonly = dir.path().join("readonly");
        fs::create_dir(&readonly).unwrap();
        fs::set_permissions(&readonly, Permissions::from_mode(0o555)).unwrap();

        let result = dropdir_fs::io::write_text(&readonly.join("config.json"), "{}");

        let _ = fs::set_permissions(&readonly, Permissions::from_mode(0o755));
        assert!(result.is_err(), "Writing into a read-only directory should fail");
    }

    #[test]
    fn fail_policy_on_existing_directory_leaves_it() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        let destination = dir.path().join("dst");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("keep.txt"), "keep").unwrap();
        let mut engine = TransferEngine::new(ScriptedConfirm::default());

        let result = engine.transfer(
            &TransferRequest::new(&source, &destination, TransferMode::Copy)
                .with_policy(OverwritePolicy::Fail),
        );

        assert!(matches!(result.error, Some(Error::DestinationExists { .. })));
        assert!(destination.join("keep.txt").exists());
    }
}

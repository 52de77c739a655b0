//! Registry lifecycle through the library crates: init, store, drop,
//! recent, forget.

use std::fs;

use dropdir_core::{
    ConfigStore, Error, create_folder, init_location, recent_folders, remove_folder, resolve_folder,
};
use dropdir_fs::{
    OverwritePolicy, PathSanitizer, ScriptedConfirm, TransferEngine, TransferMode, TransferRequest,
};
use dropdir_test_utils::storage::TestStorage;
use dropdir_test_utils::tree::{assert_same_tree, sample_tree};
use pretty_assertions::assert_eq;

#[test]
fn full_lifecycle() {
    let env = TestStorage::new();
    let store = ConfigStore::open(env.config_path_with("toml")).unwrap();
    let sanitizer = PathSanitizer::with_home(env.root());
    let mut confirm = ScriptedConfirm::new(["y"]);

    // Base location does not exist yet; the single "y" creates it.
    let location = init_location(&store, "'~/drop zone'", &sanitizer, &mut confirm).unwrap();
    assert_eq!(location, env.root().join("drop zone"));
    assert!(location.is_dir());

    create_folder(&store, "code", Some("Projects".into()), &mut confirm).unwrap();
    create_folder(&store, "docs", None, &mut confirm).unwrap();
    assert_eq!(confirm.asked().len(), 1);

    let config = store.load().unwrap();
    let code = resolve_folder(&config, "code").unwrap();
    let project = sample_tree(&env.incoming(), "sample");
    let mut engine = TransferEngine::new(ScriptedConfirm::default());
    let result = engine.transfer(&TransferRequest::into_folder(&project, &code.path, TransferMode::Copy).unwrap());
    assert!(result.is_success(), "{:?}", result.error);
    assert_same_tree(&project, &code.path.join("sample"));

    let names: Vec<&str> = recent_folders(&config, None).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"code") && names.contains(&"docs"));

    remove_folder(&store, "docs").unwrap();
    let config = store.load().unwrap();
    assert!(matches!(resolve_folder(&config, "docs"), Err(Error::FolderNotFound { .. })));
    assert!(location.join("docs").is_dir());
}

#[test]
fn dropped_line_lands_every_path() {
    let env = TestStorage::new();
    env.write_registry(&["inbox"]);
    let first = env.write_source("my notes.txt", "notes");
    let second = env.write_source("plain.txt", "plain");
    let line = format!("'{}' {}", first.display(), second.display());

    let sources = PathSanitizer::new().sanitize_dropped(&line);
    assert_eq!(sources, [first.clone(), second.clone()]);

    let inbox = env.folder("inbox");
    let mut engine = TransferEngine::new(ScriptedConfirm::default());
    for source in sources {
        let request = TransferRequest::into_folder(source, &inbox, TransferMode::Move)
            .unwrap()
            .with_policy(OverwritePolicy::Fail);
        assert!(engine.transfer(&request).is_success());
    }

    assert_eq!(fs::read_to_string(inbox.join("my notes.txt")).unwrap(), "notes");
    assert_eq!(fs::read_to_string(inbox.join("plain.txt")).unwrap(), "plain");
    assert!(!first.exists() && !second.exists());
}

#[test]
fn second_drop_with_fail_policy_keeps_first_copy() {
    let env = TestStorage::new();
    env.write_registry(&["inbox"]);
    let source = env.write_source("a.txt", "first");
    let inbox = env.folder("inbox");
    let mut engine = TransferEngine::new(ScriptedConfirm::default());
    let request = TransferRequest::into_folder(&source, &inbox, TransferMode::Copy)
        .unwrap()
        .with_policy(OverwritePolicy::Fail);

    assert!(engine.transfer(&request).is_success());
    fs::write(&source, "second").unwrap();
    let again = engine.transfer(&request);

    assert!(matches!(again.error, Some(dropdir_fs::Error::DestinationExists { .. })));
    assert_eq!(fs::read_to_string(inbox.join("a.txt")).unwrap(), "first");
}

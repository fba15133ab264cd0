//! Notebook discovery over real directory trees

use std::fs;
use std::path::{Path, PathBuf};

use testmynb::cli::discovery::{DiscoveryError, find_notebooks};

fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "{}").unwrap();
    path
}

fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_nested_directories_are_searched_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "test_b.ipynb");
    touch(dir.path(), "test_a.ipynb");
    touch(dir.path(), "nested/deeper/test_c.ipynb");
    touch(dir.path(), "nested/helpers.ipynb");
    touch(dir.path(), "test_notes.md");

    let found = find_notebooks(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(
        names(&found, dir.path()),
        vec!["nested/deeper/test_c.ipynb", "test_a.ipynb", "test_b.ipynb"]
    );
}

#[test]
fn test_checkpoint_copies_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "test_kept.ipynb");
    touch(dir.path(), ".ipynb_checkpoints/test_kept-checkpoint.ipynb");
    touch(dir.path(), "sub/.ipynb_checkpoints/test_other-checkpoint.ipynb");

    let found = find_notebooks(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(names(&found, dir.path()), vec!["test_kept.ipynb"]);
}

#[test]
fn test_checkpointed_fixture() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/checkpointed");
    let found = find_notebooks(std::slice::from_ref(&root)).unwrap();
    assert_eq!(names(&found, &root), vec!["test_kept.ipynb"]);
}

#[test]
fn test_named_files_are_taken_as_given() {
    let dir = tempfile::tempdir().unwrap();
    let explicit = touch(dir.path(), "scratch.ipynb");
    touch(dir.path(), "more/test_one.ipynb");

    let found = find_notebooks(&[explicit.clone(), dir.path().join("more")]).unwrap();
    assert_eq!(found, vec![explicit, dir.path().join("more/test_one.ipynb")]);
}

#[test]
fn test_missing_path_stops_discovery() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent");
    match find_notebooks(&[missing.clone()]) {
        Err(DiscoveryError::MissingPath(path)) => assert_eq!(path, missing),
        other => panic!("expected a missing-path error, got {other:?}"),
    }
}

#[test]
fn test_empty_directory_finds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(find_notebooks(&[dir.path().to_path_buf()]).unwrap().is_empty());
}

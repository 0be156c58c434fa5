//! Tests for capture discovery and the full export pipeline

use std::fs;
use std::path::Path;

use currimap::builder::TreeBuilder;
use currimap::capture::{discover, CaptureSet};
use currimap::emit::{emit, OutputFormat, SortOrder};
use currimap::errors::CaptureError;
use currimap::extract::extract;
use currimap::flatten::flatten;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const CURRICULUM_UUID: &str = "4bdc2f9a";

const USER_DOC: &str = r#"{
    "curriculum": "4bdc2f9a",
    "user_steps": [
        {"root": "root", "title": "Step 1"}
    ]
}"#;

const ITEMS_DOC: &str = r#"{
    "root": {"type": "X", "title": "Root", "children": ["a"]},
    "a": {"type": "X", "title": "A", "children": ["b", "c"]},
    "b": {"type": "O", "title": "Obj1", "children": null},
    "c": {"type": "X", "title": "C", "children": null}
}"#;

fn write_capture(dir: &Path, epoch: &str, items: &str) {
    let folder = dir.join(format!("responses_{epoch}"));
    fs::create_dir(&folder).expect("capture folder");
    fs::write(folder.join("100_user.json"), USER_DOC).expect("user doc");
    fs::write(folder.join(format!("200_{CURRICULUM_UUID}.json")), items).expect("items doc");
    fs::write(folder.join("300_other.json"), "{}").expect("extra doc");
}

/// Temp directory holding one complete capture at epoch 1700000000.
#[fixture]
fn capture_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    write_capture(dir.path(), "1700000000", ITEMS_DOC);
    dir
}

#[rstest]
fn given_capture_folder_when_discovering_then_documents_are_classified(capture_dir: TempDir) {
    let captures = discover(capture_dir.path()).expect("discovery succeeds");

    assert_eq!(captures.len(), 1);
    let capture = captures.get("1700000000").expect("capture by epoch");
    assert_eq!(capture.epoch, 1700000000);
    assert_eq!(capture.curriculum_uuid, CURRICULUM_UUID);
    assert!(capture.items_path.is_some());
    assert!(capture.schemas_path.is_none());
    assert!(capture.file("other").is_some());
    assert!(capture.file("missing").is_none());
}

#[rstest]
fn given_schema_document_when_discovering_then_it_is_not_mistaken_for_items() {
    let dir = TempDir::new().expect("temp dir");
    write_capture(
        dir.path(),
        "1700000000",
        r#"{"user_schema": {"fields": []}}"#,
    );

    let captures = discover(dir.path()).expect("discovery succeeds");

    let capture = captures.get("1700000000").expect("capture by epoch");
    assert!(capture.items_path.is_none());
    assert!(capture.schemas_path.is_some());
    assert!(capture.load_store().is_err());
}

#[rstest]
fn given_folder_without_user_document_when_discovering_then_it_is_skipped(capture_dir: TempDir) {
    let incomplete = capture_dir.path().join("responses_1700000001");
    fs::create_dir(&incomplete).expect("incomplete folder");
    fs::write(incomplete.join("100_orphan.json"), "{}").expect("orphan doc");

    let captures = discover(capture_dir.path()).expect("discovery succeeds");

    assert_eq!(captures.len(), 1);
    assert!(captures.get("1700000001").is_none());
}

#[rstest]
fn given_unrelated_entries_when_discovering_then_they_are_ignored(capture_dir: TempDir) {
    fs::create_dir(capture_dir.path().join("not_a_capture")).expect("stray folder");
    fs::write(capture_dir.path().join("responses_late.txt"), "").expect("stray file");

    let captures = discover(capture_dir.path()).expect("discovery succeeds");

    assert_eq!(captures.len(), 1);
}

#[rstest]
fn given_missing_directory_when_discovering_then_error_names_it() {
    let missing = Path::new("/nonexistent/captures");

    let result = discover(missing);

    assert!(matches!(result, Err(CaptureError::DirectoryNotFound(_))));
}

#[rstest]
fn given_empty_directory_when_discovering_then_set_is_empty() {
    let dir = TempDir::new().expect("temp dir");

    let captures: CaptureSet = discover(dir.path()).expect("discovery succeeds");

    assert!(captures.is_empty());
}

#[rstest]
fn given_capture_when_exporting_then_csv_artifacts_match_the_walk(capture_dir: TempDir) {
    let out = TempDir::new().expect("output dir");

    let captures = discover(capture_dir.path()).expect("discovery succeeds");
    let capture = captures.get("1700000000").expect("capture by epoch");
    let store = capture.load_store().expect("items load");
    let steps = capture.load_steps().expect("steps load");
    let root = steps.root_id(0).expect("first step root");

    let tree = TreeBuilder::new().build(&store, root).expect("buildable tree");
    let (paths, display_name) = extract(&tree, tree.root().unwrap(), true, None);
    let flattened = flatten(&tree, &paths);
    let artifact = emit(
        out.path(),
        &display_name,
        &flattened,
        SortOrder::None,
        true,
        OutputFormat::CsvDirectory,
    )
    .expect("csv emission succeeds");

    assert_eq!(artifact, out.path().join("Root"));

    let sheet = fs::read_to_string(artifact.join("Root.csv")).expect("readable sheet");
    assert_eq!(sheet.trim(), "A,Learning Objectives\nC,0");

    let objectives =
        fs::read_to_string(artifact.join("Learning_Objectives.csv")).expect("readable index");
    assert_eq!(objectives.trim(), "Index,Learning Objective\n0,Obj1");
}

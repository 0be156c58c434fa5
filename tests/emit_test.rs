//! Tests for table layout and artifact writers

use std::fs;

use currimap::arena::NodeTree;
use currimap::builder::TreeBuilder;
use currimap::emit::{build_tables, emit, OutputFormat, SortOrder};
use currimap::extract::extract;
use currimap::flatten::{flatten, FlattenedSheet};
use currimap::store::NodeStore;
use tempfile::TempDir;

const MIXED_STORE: &str = r#"{
    "root": {"type": "X", "title": "Root", "children": ["y", "zeta", "alpha"]},
    "y": {"type": "Y", "title": "Boundary", "children": ["orphan"]},
    "orphan": {"type": "X", "title": "Orphan", "children": null},
    "zeta": {"type": "Y", "title": "Cut", "children": ["zsheet"]},
    "zsheet": {"type": "X", "title": "Zeta", "children": ["z1"]},
    "z1": {"type": "X", "title": "ZLeaf", "children": ["obj"]},
    "obj": {"type": "O", "title": "Know things", "children": null},
    "alpha": {"type": "Y", "title": "Cut2", "children": ["asheet"]},
    "asheet": {"type": "X", "title": "Alpha", "children": ["a1"]},
    "a1": {"type": "X", "title": "ALeaf", "children": null}
}"#;

fn flatten_store(json: &str, root: &str) -> (NodeTree, FlattenedSheet) {
    let store = NodeStore::from_json(json).expect("valid store json");
    let tree = TreeBuilder::new().build(&store, root).expect("buildable tree");
    let (paths, _) = extract(&tree, tree.root().unwrap(), true, None);
    let flattened = flatten(&tree, &paths);
    (tree, flattened)
}

#[test]
fn given_mixed_content_when_building_tables_then_emission_order_is_fixed() {
    let (_, flattened) = flatten_store(MIXED_STORE, "root");

    let tables = build_tables(&flattened, SortOrder::None, true);

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    // level1 first, the objective index second, ordinary sheets ascending.
    // Whitespace in sheet names is sanitized to underscores.
    assert_eq!(names, ["level1", "Learning_Objectives", "Alpha", "Zeta"]);
}

#[test]
fn given_objectives_excluded_when_building_tables_then_index_sheet_is_absent() {
    let (_, flattened) = flatten_store(MIXED_STORE, "root");

    let tables = build_tables(&flattened, SortOrder::None, false);

    assert!(tables.iter().all(|t| t.name != "Learning_Objectives"));
    let zeta = tables.iter().find(|t| t.name == "Zeta").unwrap();
    // Without the index there is nothing for rows to reference.
    assert_eq!(zeta.columns, ["Values"]);
}

#[test]
fn given_objective_rows_when_building_tables_then_reference_column_is_appended() {
    let (_, flattened) = flatten_store(MIXED_STORE, "root");

    let tables = build_tables(&flattened, SortOrder::None, true);

    let objectives = tables
        .iter()
        .find(|t| t.name == "Learning_Objectives")
        .unwrap();
    assert_eq!(objectives.columns, ["Index", "Learning Objective"]);
    assert_eq!(objectives.rows, [["0".to_string(), "Know things".to_string()]]);

    let zeta = tables.iter().find(|t| t.name == "Zeta").unwrap();
    assert_eq!(zeta.columns, ["Values", "Learning Objectives"]);
    assert_eq!(zeta.rows, [["ZLeaf".to_string(), "0".to_string()]]);
}

#[test]
fn given_sort_directives_when_building_tables_then_rows_are_ordered() {
    let (_, flattened) = flatten_store(
        r#"{
            "root": {"type": "X", "title": "Sheet", "children": ["b", "a", "c"]},
            "b": {"type": "X", "title": "Banana", "children": null},
            "a": {"type": "X", "title": "Apple", "children": null},
            "c": {"type": "X", "title": "Cherry", "children": null}
        }"#,
        "root",
    );

    let values = |sort| {
        let tables = build_tables(&flattened, sort, true);
        tables[0]
            .rows
            .iter()
            .map(|r| r[0].clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(values(SortOrder::None), ["Banana", "Apple", "Cherry"]);
    assert_eq!(values(SortOrder::Ascending), ["Apple", "Banana", "Cherry"]);
    assert_eq!(values(SortOrder::Descending), ["Cherry", "Banana", "Apple"]);
}

#[test]
fn given_uneven_buckets_when_building_tables_then_shorter_ones_are_padded() {
    let (_, flattened) = flatten_store(
        r#"{
            "root": {"type": "X", "title": "Sheet", "children": ["col1", "col2"]},
            "col1": {"type": "X", "title": "Long", "children": ["l1", "l2"]},
            "col2": {"type": "X", "title": "Short", "children": ["s1"]},
            "l1": {"type": "X", "title": "L1", "children": null},
            "l2": {"type": "X", "title": "L2", "children": null},
            "s1": {"type": "X", "title": "S1", "children": null}
        }"#,
        "root",
    );

    let tables = build_tables(&flattened, SortOrder::None, true);

    let sheet = &tables[0];
    assert_eq!(sheet.columns, ["Long", "Short"]);
    assert_eq!(sheet.rows.len(), 2);
    assert_eq!(sheet.rows[0], ["L1", "S1"]);
    assert_eq!(sheet.rows[1], ["L2", ""]);
}

#[test]
fn given_csv_format_when_emitting_then_one_file_per_table_is_written() {
    let (_, flattened) = flatten_store(MIXED_STORE, "root");
    let out = TempDir::new().expect("temp dir");

    let artifact = emit(
        out.path(),
        "Root",
        &flattened,
        SortOrder::None,
        true,
        OutputFormat::CsvDirectory,
    )
    .expect("csv emission succeeds");

    assert_eq!(artifact, out.path().join("Root"));
    assert!(artifact.join("level1.csv").is_file());
    assert!(artifact.join("Learning_Objectives.csv").is_file());
    assert!(artifact.join("Alpha.csv").is_file());
    assert!(artifact.join("Zeta.csv").is_file());

    let level1 = fs::read_to_string(artifact.join("level1.csv")).expect("readable csv");
    assert_eq!(level1.trim(), "Values\nOrphan");
}

#[test]
fn given_workbook_format_when_emitting_then_single_xlsx_is_written() {
    let (_, flattened) = flatten_store(MIXED_STORE, "root");
    let out = TempDir::new().expect("temp dir");

    let artifact = emit(
        out.path(),
        "Root",
        &flattened,
        SortOrder::None,
        true,
        OutputFormat::Workbook,
    )
    .expect("workbook emission succeeds");

    assert_eq!(artifact, out.path().join("Root.xlsx"));
    assert!(artifact.is_file());
}

#[test]
fn given_unsafe_artifact_name_when_emitting_then_name_is_sanitized() {
    let (_, flattened) = flatten_store(MIXED_STORE, "root");
    let out = TempDir::new().expect("temp dir");

    let artifact = emit(
        out.path(),
        "a/b:c",
        &flattened,
        SortOrder::None,
        true,
        OutputFormat::CsvDirectory,
    )
    .expect("csv emission succeeds");

    assert_eq!(artifact, out.path().join("a_b_c"));
    assert!(artifact.is_dir());
}

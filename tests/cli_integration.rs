//! Integration tests for the `gd` CLI.
//!
//! Each test creates a temp guide directory, runs `gd` as a subprocess,
//! and verifies stdout and/or the data file.

use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::{Value, json};

/// Create a small guide with fixed ids in the given directory.
fn create_test_guide(root: &Path) {
    let guide_dir = root.join("guide");
    fs::create_dir_all(&guide_dir).unwrap();
    fs::write(
        guide_dir.join("guide.toml"),
        "[guide]\nname = \"Morro\"\n",
    )
    .unwrap();
    let data = json!({
        "categories": [
            {"id": "c1", "name": "Restaurantes", "sort_order": 0},
            {"id": "c2", "name": "Pousadas", "sort_order": 1},
            {"id": "c3", "name": "Passeios", "sort_order": 2}
        ],
        "subcategories": [
            {"id": "s1", "name": "Pizzarias", "category_id": "c1", "sort_order": 0},
            {"id": "s2", "name": "Cafeterias", "category_id": "c1", "sort_order": 1},
            {"id": "s3", "name": "Sorveterias", "category_id": "c1", "sort_order": 2},
            {"id": "s4", "name": "Hostels", "category_id": "c2", "sort_order": 0}
        ],
        "locations": [
            {"id": "l1", "name": "Centro", "sort_order": 0},
            {"id": "l2", "name": "Praia", "sort_order": 1, "hidden": true}
        ],
        "businesses": [
            {
                "id": "b1",
                "name": "Pizza Nostra",
                "category_id": "c1",
                "subcategory_id": "s1",
                "location_id": "l1"
            }
        ]
    });
    fs::write(
        guide_dir.join("data.json"),
        serde_json::to_string_pretty(&data).unwrap(),
    )
    .unwrap();
}

/// Run `gd` with the given args in the given directory, returning (stdout, stderr, success).
fn run_gd(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_gd"))
        .args(args)
        .current_dir(dir)
        .env_remove("GUIDE_LOG")
        .output()
        .expect("failed to run gd");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `gd` expecting success, return stdout.
fn run_gd_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_gd(dir, args);
    if !success {
        panic!(
            "gd {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `gd` expecting failure, return stderr.
fn run_gd_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_gd(dir, args);
    if success {
        panic!("gd {:?} unexpectedly succeeded:\nstdout: {}", args, stdout);
    }
    stderr
}

/// `sort_order` of every row in `table`, by id, as stored on disk.
fn stored_orders(root: &Path, table: &str) -> Vec<(String, i64)> {
    let text = fs::read_to_string(root.join("guide/data.json")).unwrap();
    let data: Value = serde_json::from_str(&text).unwrap();
    let mut rows: Vec<(String, i64)> = data[table]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| {
            (
                row["id"].as_str().unwrap().to_string(),
                row["sort_order"].as_i64().unwrap(),
            )
        })
        .collect();
    rows.sort();
    rows
}

fn pairs(items: &[(&str, i64)]) -> Vec<(String, i64)> {
    items.iter().map(|(id, o)| (id.to_string(), *o)).collect()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_list_categories() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let out = run_gd_ok(tmp.path(), &["list", "category"]);
    assert_eq!(
        out,
        "  0  Restaurantes  [c1]\n  1  Pousadas  [c2]\n  2  Passeios  [c3]\n"
    );
}

#[test]
fn test_list_hides_hidden_unless_all() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let out = run_gd_ok(tmp.path(), &["list", "location"]);
    assert!(!out.contains("Praia"));
    let out = run_gd_ok(tmp.path(), &["list", "location", "--all"]);
    assert!(out.contains("  1  Praia  [l2]  (hidden)"));
}

#[test]
fn test_list_subcategories_grouped_by_category() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let out = run_gd_ok(tmp.path(), &["list", "subcategory"]);
    assert_eq!(
        out,
        "Restaurantes [c1]\n  0  Pizzarias  [s1]\n  1  Cafeterias  [s2]\n  2  Sorveterias  [s3]\n\nPousadas [c2]\n  0  Hostels  [s4]\n"
    );

    let out = run_gd_ok(tmp.path(), &["list", "subcategory", "--category", "c2"]);
    assert_eq!(out, "  0  Hostels  [s4]\n");
}

#[test]
fn test_list_json_includes_usage() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let out = run_gd_ok(tmp.path(), &["list", "location", "--all", "--json"]);
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["kind"], "location");
    let items = parsed["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "l1");
    assert_eq!(items[0]["usage"], 1);
    assert_eq!(items[1]["hidden"], true);
    assert_eq!(items[1]["usage"], 0);
}

#[test]
fn test_outside_a_guide_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_gd_err(tmp.path(), &["list", "category"]);
    assert!(err.starts_with("error: not a guide workspace"));
}

// ---------------------------------------------------------------------------
// Reorder and undo
// ---------------------------------------------------------------------------

#[test]
fn test_reorder_writes_positions_and_prints_list() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let out = run_gd_ok(tmp.path(), &["reorder", "category", "c3", "c1"]);
    assert_eq!(
        out,
        "  0  Passeios  [c3]\n  1  Restaurantes  [c1]\n  2  Pousadas  [c2]\n"
    );
    assert_eq!(
        stored_orders(tmp.path(), "categories"),
        pairs(&[("c1", 1), ("c2", 2), ("c3", 0)])
    );
}

#[test]
fn test_undo_restores_then_runs_dry() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    run_gd_ok(tmp.path(), &["reorder", "category", "c3", "c1"]);
    let out = run_gd_ok(tmp.path(), &["undo", "category"]);
    assert!(out.starts_with("  0  Restaurantes  [c1]"));
    assert_eq!(
        stored_orders(tmp.path(), "categories"),
        pairs(&[("c1", 0), ("c2", 1), ("c3", 2)])
    );

    let out = run_gd_ok(tmp.path(), &["undo", "category"]);
    assert_eq!(out, "nothing to undo for categories\n");
}

#[test]
fn test_undo_slots_are_per_kind() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    run_gd_ok(tmp.path(), &["reorder", "category", "c2", "c1"]);
    run_gd_ok(tmp.path(), &["reorder", "location", "l2", "l1"]);
    run_gd_ok(tmp.path(), &["undo", "category"]);

    assert_eq!(
        stored_orders(tmp.path(), "categories"),
        pairs(&[("c1", 0), ("c2", 1), ("c3", 2)])
    );
    assert_eq!(
        stored_orders(tmp.path(), "locations"),
        pairs(&[("l1", 1), ("l2", 0)])
    );
}

#[test]
fn test_cross_category_reorder_is_a_no_op() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());
    let before = fs::read_to_string(tmp.path().join("guide/data.json")).unwrap();

    let out = run_gd_ok(tmp.path(), &["reorder", "subcategory", "s4", "s1"]);
    assert_eq!(out, "");
    let out = run_gd_ok(tmp.path(), &["reorder", "category", "c1", "nope"]);
    assert_eq!(out, "");

    let after = fs::read_to_string(tmp.path().join("guide/data.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_reorder_within_one_category() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    run_gd_ok(tmp.path(), &["reorder", "sub", "s3", "s1"]);
    assert_eq!(
        stored_orders(tmp.path(), "subcategories"),
        pairs(&[("s1", 1), ("s2", 2), ("s3", 0), ("s4", 0)])
    );
}

#[test]
fn test_top_bottom_up_down() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    run_gd_ok(tmp.path(), &["top", "subcategory", "s3"]);
    assert_eq!(
        stored_orders(tmp.path(), "subcategories"),
        pairs(&[("s1", 1), ("s2", 2), ("s3", 0), ("s4", 0)])
    );

    let out = run_gd_ok(tmp.path(), &["bottom", "subcategory", "s3"]);
    assert!(out.ends_with("  2  Sorveterias  [s3]\n"));

    run_gd_ok(tmp.path(), &["up", "category", "c2"]);
    run_gd_ok(tmp.path(), &["down", "category", "c3"]);
    let out = run_gd_ok(tmp.path(), &["list", "category"]);
    assert_eq!(
        out,
        "  0  Pousadas  [c2]\n  1  Restaurantes  [c1]\n  2  Passeios  [c3]\n"
    );
}

#[test]
fn test_normalize_closes_gaps() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());
    let path = tmp.path().join("guide/data.json");
    let text = fs::read_to_string(&path)
        .unwrap()
        .replace("\"sort_order\": 2\n", "\"sort_order\": 40\n");
    fs::write(&path, text).unwrap();

    let out = run_gd_ok(tmp.path(), &["normalize", "category"]);
    assert_eq!(out, "renumbered 1 row\n");
    assert_eq!(
        stored_orders(tmp.path(), "categories"),
        pairs(&[("c1", 0), ("c2", 1), ("c3", 2)])
    );
}

// ---------------------------------------------------------------------------
// Taxonomy edits
// ---------------------------------------------------------------------------

#[test]
fn test_add_appends_at_bottom() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let id = run_gd_ok(tmp.path(), &["add", "subcategory", "Hamburguerias", "--category", "c1"]);
    let id = id.trim();
    assert!(!id.is_empty());

    let out = run_gd_ok(tmp.path(), &["list", "subcategory", "--category", "c1"]);
    assert!(out.ends_with(&format!("  3  Hamburguerias  [{}]\n", id)));
}

#[test]
fn test_add_subcategory_needs_category() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let err = run_gd_err(tmp.path(), &["add", "subcategory", "Bares"]);
    assert!(err.contains("needs a category"));
    let err = run_gd_err(tmp.path(), &["add", "subcategory", "Bares", "--category", "c9"]);
    assert!(err.contains("category not found: c9"));
}

#[test]
fn test_rename_hide_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    run_gd_ok(tmp.path(), &["rename", "location", "l1", "Vila"]);
    run_gd_ok(tmp.path(), &["hide", "location", "l1"]);
    run_gd_ok(tmp.path(), &["show", "location", "l2"]);
    let out = run_gd_ok(tmp.path(), &["list", "location", "--all"]);
    assert_eq!(out, "  0  Vila  [l1]  (hidden)\n  1  Praia  [l2]\n");

    let err = run_gd_err(tmp.path(), &["rename", "location", "l9", "X"]);
    assert!(err.contains("location not found: l9"));
}

#[test]
fn test_delete_referenced_row_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());

    let err = run_gd_err(tmp.path(), &["delete", "category", "c1"]);
    assert!(err.contains("violates foreign key constraint"));
    let err = run_gd_err(tmp.path(), &["delete", "subcategory", "s1"]);
    assert!(err.contains("violates foreign key constraint"));

    run_gd_ok(tmp.path(), &["delete", "subcategory", "s3"]);
    run_gd_ok(tmp.path(), &["delete", "category", "c3"]);
    let out = run_gd_ok(tmp.path(), &["list", "category"]);
    assert!(!out.contains("Passeios"));
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_with_sample() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_gd_ok(tmp.path(), &["init", "--name", "Morro", "--sample"]);
    assert_eq!(out, "Initialized guide: Morro\n");
    assert!(tmp.path().join("guide/guide.toml").exists());

    let out = run_gd_ok(tmp.path(), &["list", "category"]);
    let names: Vec<&str> = out
        .lines()
        .map(|l| l.split("  ").nth(2).unwrap())
        .collect();
    assert_eq!(names, vec!["Restaurantes", "Pousadas", "Passeios", "Lojas"]);

    let err = run_gd_err(tmp.path(), &["init"]);
    assert!(err.contains("already exists"));
}

#[test]
fn test_guide_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_guide(tmp.path());
    let elsewhere = tempfile::TempDir::new().unwrap();

    let out = run_gd_ok(
        elsewhere.path(),
        &["-C", tmp.path().to_str().unwrap(), "list", "category"],
    );
    assert!(out.contains("Restaurantes"));
}

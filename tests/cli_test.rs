//! End-to-end tests for the `emdtree` subcommands on directory containers.

use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use emdtree::application::services::open_tree;
use emdtree::cli::{execute_command, Cli, CliError};
use emdtree::config::Settings;
use emdtree::domain::Forest;
use emdtree::exitcode;
use emdtree::infrastructure::DirGroup;
use emdtree::util::testing::init_test_setup;

fn run(args: &[&str]) -> Result<(), CliError> {
    let cli = Cli::try_parse_from(std::iter::once("emdtree").chain(args.iter().copied()))
        .expect("arguments parse");
    execute_command(&cli, &Settings::default())
}

fn paths(container: &Path, tree: Option<&str>) -> Vec<String> {
    let mut forest = Forest::new();
    let file = DirGroup::open(container).unwrap();
    let root = open_tree(&mut forest, &file, tree).unwrap();
    forest
        .iter_subtree(root)
        .map(|(id, _)| forest.path(id).unwrap().unwrap_or_default())
        .collect()
}

/// Container `c` with root `root` holding `a/b` and `d`.
fn populated(tmp: &TempDir) -> String {
    let c = tmp.path().join("c").display().to_string();
    run(&["init", &c]).unwrap();
    run(&["add", &c, "/", "a"]).unwrap();
    run(&["add", &c, "a", "b"]).unwrap();
    run(&["add", &c, "/", "d"]).unwrap();
    c
}

// ============================================================
// init / add / show / get
// ============================================================

#[test]
fn given_init_and_adds_when_reading_back_then_tree_has_all_nodes() {
    init_test_setup();
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    assert_eq!(paths(Path::new(&c), None), vec!["", "/a", "/a/b", "/d"]);
}

#[test]
fn given_named_root_when_init_then_tree_uses_that_name() {
    let tmp = TempDir::new().unwrap();
    let c = tmp.path().join("named").display().to_string();

    run(&["init", &c, "--name", "experiment"]).unwrap();

    assert_eq!(paths(Path::new(&c), Some("experiment")), vec![""]);
}

#[test]
fn given_existing_child_name_when_adding_then_usage_error_and_unchanged() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    let err = run(&["add", &c, "/", "a"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert_eq!(paths(Path::new(&c), None), vec!["", "/a", "/a/b", "/d"]);
}

#[test]
fn given_missing_path_when_getting_then_dataerr() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    let err = run(&["get", &c, "a/zzz"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(err.to_string().contains("zzz"));
}

#[test]
fn given_populated_container_when_showing_then_succeeds_in_both_styles() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    run(&["show", &c]).unwrap();
    run(&["show", &c, "a", "--style", "connectors", "--from-root"]).unwrap();
    run(&["get", &c, "a/b"]).unwrap();
}

#[test]
fn given_missing_container_when_showing_then_noinput() {
    let tmp = TempDir::new().unwrap();
    let c = tmp.path().join("absent").display().to_string();

    let err = run(&["show", &c]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

// ============================================================
// cut / graft
// ============================================================

#[test]
fn given_branch_when_cut_to_new_container_then_both_containers_updated() {
    init_test_setup();
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);
    let out = tmp.path().join("out").display().to_string();

    run(&["cut", &c, "a", "--out", &out]).unwrap();

    assert_eq!(paths(Path::new(&c), None), vec!["", "/d"]);
    assert_eq!(paths(Path::new(&out), Some("a")), vec!["", "/a", "/a/b"]);
}

#[test]
fn given_branch_when_cut_into_same_container_then_container_holds_two_trees() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    run(&["cut", &c, "a", "--out", &c]).unwrap();

    assert_eq!(paths(Path::new(&c), Some("root")), vec!["", "/d"]);
    assert_eq!(paths(Path::new(&c), Some("a")), vec!["", "/a", "/a/b"]);
    let err = run(&["show", &c]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_branch_when_grafted_within_container_then_moves() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    run(&["graft", &c, "a/b", "--at", "d"]).unwrap();

    assert_eq!(paths(Path::new(&c), None), vec!["", "/a", "/d", "/d/b"]);
}

#[test]
fn given_branch_when_grafted_across_containers_then_source_loses_it() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);
    let other = tmp.path().join("other").display().to_string();
    run(&["init", &other, "--name", "S"]).unwrap();

    run(&["graft", &c, "a", "--onto", &other, "--metadata", "copy"]).unwrap();

    assert_eq!(paths(Path::new(&c), None), vec!["", "/d"]);
    assert_eq!(paths(Path::new(&other), None), vec!["", "/a", "/a/b"]);
}

#[test]
fn given_graft_onto_own_branch_when_running_then_dataerr_and_unchanged() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    let err = run(&["graft", &c, "a", "--at", "a/b"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert_eq!(paths(Path::new(&c), None), vec!["", "/a", "/a/b", "/d"]);
}

#[test]
fn given_branch_named_like_existing_tree_when_cut_into_same_container_then_usage_error_and_unchanged() {
    init_test_setup();
    let tmp = TempDir::new().unwrap();
    let c = tmp.path().join("c").display().to_string();
    run(&["init", &c]).unwrap();
    run(&["add", &c, "/", "root"]).unwrap();
    run(&["add", &c, "root", "precious"]).unwrap();

    let err = run(&["cut", &c, "root", "--out", &c]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert_eq!(paths(Path::new(&c), None), vec!["", "/root", "/root/precious"]);
}

#[test]
fn given_out_container_holding_same_tree_name_when_cutting_then_usage_error_and_both_unchanged() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);
    let out = tmp.path().join("out").display().to_string();
    run(&["init", &out, "--name", "a"]).unwrap();

    let err = run(&["cut", &c, "a", "--out", &out]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert_eq!(paths(Path::new(&c), None), vec!["", "/a", "/a/b", "/d"]);
    assert_eq!(paths(Path::new(&out), None), vec![""]);
}

#[test]
fn given_target_with_same_named_child_when_grafting_then_usage_error_and_nothing_lost() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);
    run(&["add", &c, "d", "b"]).unwrap();
    run(&["add", &c, "d/b", "keep"]).unwrap();

    let err = run(&["graft", &c, "a/b", "--at", "d"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert_eq!(
        paths(Path::new(&c), None),
        vec!["", "/a", "/a/b", "/d", "/d/b", "/d/b/keep"]
    );
}

#[test]
fn given_container_saved_when_listing_parent_dir_then_no_staging_left_behind() {
    let tmp = TempDir::new().unwrap();
    populated(&tmp);

    let entries: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();

    assert_eq!(entries, vec!["c"]);
}

#[test]
fn given_reserved_metadata_name_when_adding_then_dataerr_and_unchanged() {
    let tmp = TempDir::new().unwrap();
    let c = populated(&tmp);

    let err = run(&["add", &c, "/", "_metadata"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert_eq!(paths(Path::new(&c), None), vec!["", "/a", "/a/b", "/d"]);
}

// ============================================================
// misc
// ============================================================

#[test]
fn given_no_subcommand_when_running_then_usage_error() {
    let err = run(&[]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_bad_merge_mode_when_parsing_then_rejected_by_clap() {
    let parsed = Cli::try_parse_from(["emdtree", "cut", "c", "a", "--out", "o", "--metadata", "sometimes"]);

    assert!(parsed.is_err());
}

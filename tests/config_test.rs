//! Integration tests for Settings config loading with layered precedence.
//!
//! These tests never touch the real global config: the global layer is
//! passed in explicitly as a temp file.

use std::fs;

use tempfile::TempDir;

use emdtree::application::ApplicationError;
use emdtree::config::{RenderStyle, Settings};
use emdtree::domain::MergeMode;

// ============================================================
// Layering
// ============================================================

#[test]
fn given_no_files_when_loading_then_defaults() {
    let settings = Settings::load_from(None, None).expect("load settings");

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.merge_mode, MergeMode::Keep);
    assert_eq!(settings.root_name, "root");
}

#[test]
fn given_global_file_when_loading_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("emdtree.toml");
    fs::write(&global, "merge_mode = \"copy\"\nrender = \"connectors\"\n").unwrap();

    // Act
    let settings = Settings::load_from(Some(&global), None).expect("load settings");

    // Assert
    assert_eq!(settings.merge_mode, MergeMode::Copy);
    assert_eq!(settings.render, RenderStyle::Connectors);
    assert_eq!(settings.root_name, "root", "untouched keys keep defaults");
}

#[test]
fn given_explicit_file_when_loading_then_wins_over_global() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("global.toml");
    let explicit = dir.path().join("project.toml");
    fs::write(&global, "merge_mode = \"copy\"\nroot_name = \"experiment\"\n").unwrap();
    fs::write(&explicit, "merge_mode = \"discard\"\n").unwrap();

    let settings = Settings::load_from(Some(&global), Some(&explicit)).expect("load settings");

    assert_eq!(settings.merge_mode, MergeMode::Discard);
    assert_eq!(settings.root_name, "experiment");
}

#[test]
fn given_boolean_style_merge_mode_when_loading_then_aliases_apply() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("project.toml");
    fs::write(&explicit, "merge_mode = \"false\"\n").unwrap();

    let settings = Settings::load_from(None, Some(&explicit)).expect("load settings");

    assert_eq!(settings.merge_mode, MergeMode::Discard);
}

// ============================================================
// Failures
// ============================================================

#[test]
fn given_missing_explicit_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = Settings::load_from(None, Some(&missing)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_unknown_merge_mode_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("project.toml");
    fs::write(&explicit, "merge_mode = \"sometimes\"\n").unwrap();

    let err = Settings::load_from(None, Some(&explicit)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

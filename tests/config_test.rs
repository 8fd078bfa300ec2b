//! Layered Settings loading from files

use std::fs;

use tempfile::TempDir;

use fractree::application::ApplicationError;
use fractree::config::{OutputFormat, Settings};
use fractree::domain::DisplayType;

#[test]
fn given_no_files_when_loading_then_defaults_apply() {
    let settings = Settings::load_from(None, None).expect("load settings");
    assert_eq!(settings.default_display_type, DisplayType::Plain);
    assert_eq!(settings.output.format, OutputFormat::Tree);
    assert!(!settings.recalculate_on_load);
}

#[test]
fn given_global_and_explicit_file_when_loading_then_explicit_wins_per_key() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("fractree.toml");
    let explicit = dir.path().join("local.toml");
    fs::write(
        &global,
        r#"
default_display_type = "exp"
recalculate_on_load = true

[output]
format = "json"
"#,
    )
    .unwrap();
    fs::write(&explicit, "default_display_type = \"fraction\"\n").unwrap();

    let settings = Settings::load_from(Some(&global), Some(&explicit)).expect("load settings");

    assert_eq!(settings.default_display_type, DisplayType::Fraction);
    assert!(settings.recalculate_on_load, "inherited from global");
    assert_eq!(settings.output.format, OutputFormat::Json, "inherited from global");
}

#[test]
fn given_missing_explicit_file_when_loading_then_operation_fails_with_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = Settings::load_from(None, Some(&missing)).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "default_display_type = \"sideways\"\n").unwrap();

    let err = Settings::load_from(None, Some(&bad)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

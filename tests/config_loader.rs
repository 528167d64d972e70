//! Config loading, defaults, and validation.

use std::path::Path;

use tempfile::TempDir;

use seashell::config::{Config, ConfigError};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn missing_file_yields_defaults() {
    let config = Config::load_from(Path::new("/nonexistent/config.toml")).unwrap();
    assert_eq!(config.terminal.scrollback_lines, 1000);
    assert_eq!(config.shell.profile, ".profile");
    assert!(config.variables.is_empty());
}

#[test]
fn full_config_parses() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[storage]
path = "/tmp/test-store.json"

[terminal]
scrollback_lines = 50
greeting = "hi there"

[shell]
profile = ".rc"

[logging]
level = "debug"

[variables]
HIST_FILE = ".hist"
HIST_SIZE = "10"
"#,
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.terminal.scrollback_lines, 50);
    assert_eq!(config.terminal.greeting, "hi there");
    assert_eq!(config.shell.profile, ".rc");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.variables.get("HIST_FILE").unwrap(), ".hist");
    assert_eq!(
        config.storage.resolved_path().unwrap(),
        Path::new("/tmp/test-store.json")
    );
}

#[test]
fn empty_storage_path_disables_persistence() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[storage]\npath = \"\"\n");
    let config = Config::load_from(&path).unwrap();
    assert!(config.storage.resolved_path().is_none());
}

#[test]
fn partial_config_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[terminal]\nscrollback_lines = 9\n");
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.terminal.scrollback_lines, 9);
    assert_eq!(config.shell.profile, ".profile");
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "not [ valid { toml");
    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn zero_scrollback_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[terminal]\nscrollback_lines = 0\n");
    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

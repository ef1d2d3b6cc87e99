use mdfold_lib::config::{Config, ConfigError, discover_config_upward};
use mdfold_lib::{Labeler, PlaceholderKind};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_load_config_file() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join("custom.toml");
    let config_content = r#"
[placeholder]
max-length = 20
suffix-length = 3
ellipsis = "…"

[labels]
h1 = "Chapter"
code-fence = "Listing"
"#;
    fs::write(&config_path, config_content).expect("Failed to write test config file");

    let config = Config::load(Some(&config_path)).expect("config should load");
    assert_eq!(config.placeholder.max_length, 20);
    assert_eq!(config.placeholder.ellipsis, "…");
    assert_eq!(config.labels.h1, "Chapter");
    assert_eq!(config.labels.h2, "Header 2");

    let labeler = Labeler::from_config(&config);
    assert_eq!(
        labeler.label(PlaceholderKind::CodeFence, "abcdefghijklmnopqrstuvwxyz"),
        "Listing: abcdefghijklmnop…xyz"
    );
    assert_eq!(labeler.label(PlaceholderKind::Header(1), "# Intro"), "Chapter: # Intro");
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let missing = temp_dir.path().join("nope.toml");
    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(matches!(err, ConfigError::IoError { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn test_invalid_toml_is_reported() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let config_path = temp_dir.path().join(".mdfold.toml");
    fs::write(&config_path, "[placeholder\nmax-length = ").expect("Failed to write config");
    assert!(matches!(Config::from_file(&config_path), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_discovery_walks_up_to_nearest_config() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let root = temp_dir.path();
    let nested = root.join("docs").join("guide");
    fs::create_dir_all(&nested).expect("Failed to create nested dirs");
    fs::create_dir(root.join(".git")).expect("Failed to create .git");
    fs::write(root.join("mdfold.toml"), "[labels]\ntable = \"Grid\"\n").expect("Failed to write config");

    let found = discover_config_upward(&nested).expect("config should be found");
    assert_eq!(found, root.join("mdfold.toml"));
    assert_eq!(Config::from_file(&found).unwrap().labels.table, "Grid");
}

#[test]
fn test_hidden_config_takes_precedence() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let root = temp_dir.path();
    fs::create_dir(root.join(".git")).expect("Failed to create .git");
    fs::write(root.join("mdfold.toml"), "").expect("Failed to write config");
    fs::write(root.join(".mdfold.toml"), "").expect("Failed to write config");

    assert_eq!(discover_config_upward(root), Some(root.join(".mdfold.toml")));
}

#[test]
fn test_discovery_stops_at_git_root() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let outer = temp_dir.path();
    let project = outer.join("project");
    fs::create_dir_all(project.join(".git")).expect("Failed to create .git");
    fs::write(outer.join(".mdfold.toml"), "").expect("Failed to write config");

    assert_eq!(discover_config_upward(&project), None);
}

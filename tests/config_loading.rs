//! Layered configuration: file, environment, and CLI overrides.

use chronolink::config::{ChronoConfig, ConfigOverrides, GraphOverrides, OutputOverrides};
use chronolink::OutputFormat;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn toml_file_sets_graph_and_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chronolink.toml");
    fs::write(
        &path,
        r#"
[graph]
anchor_node = "ei0"
add_inverted = true
dump_dir = "dumps"

[output]
format = "jsonl"
reduce = false
"#,
    )
    .unwrap();

    let config = ChronoConfig::from_env(path.to_str()).unwrap();
    assert_eq!(config.graph.anchor_node.as_deref(), Some("ei0"));
    assert!(config.graph.add_inverted);
    assert_eq!(config.graph.dump_dir, Some(PathBuf::from("dumps")));
    assert_eq!(config.output.format, OutputFormat::Jsonl);
    assert!(!config.output.reduce);
}

#[test]
fn cli_overrides_beat_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chronolink.toml");
    fs::write(&path, "[output]\nformat = \"dot\"\nreduce = false\n").unwrap();

    let overrides = ConfigOverrides {
        graph: Some(GraphOverrides {
            anchor_node: Some("t0".to_string()),
            ..GraphOverrides::default()
        }),
        output: Some(OutputOverrides {
            format: Some(OutputFormat::Table),
            reduce: None,
        }),
    };
    let config = ChronoConfig::load(path.to_str(), overrides).unwrap();
    assert_eq!(config.output.format, OutputFormat::Table);
    assert!(!config.output.reduce);
    assert_eq!(config.graph.anchor_node.as_deref(), Some("t0"));
    assert!(!config.graph.add_inverted);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let config = ChronoConfig::from_env(path.to_str()).unwrap();
    assert_eq!(config, ChronoConfig::default());
}

#[test]
fn invalid_value_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chronolink.toml");
    fs::write(&path, "[output]\nformat = \"xml\"\n").unwrap();
    let err = ChronoConfig::from_env(path.to_str()).unwrap_err();
    assert!(err.to_string().starts_with("configuration error"));
}

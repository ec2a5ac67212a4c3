//! Loading, layering and environment tests for configuration.

use std::{fs, path::Path};

use serial_test::serial;

use crate::{
    config::{load_config, load_toml_file, Config, PartialConfig},
    error::ConfigError,
};

const ENV_VARS: [&str; 4] = [
    "CODEFLARE_NAMESPACE",
    "CODEFLARE_LOG_LEVEL",
    "CODEFLARE_SUGGESTIONS_ENABLED",
    "CODEFLARE_SUGGESTIONS_MAX_DISTANCE",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

fn write(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, body).unwrap_or_else(|e| panic!("failed to write config: {e}"));
    path
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.namespace, "codeflare");
    assert_eq!(config.log.level, "warn");
    assert!(config.suggestions.enabled);
    assert_eq!(config.suggestions.max_distance, 3);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_layer_only_overrides_set_keys() {
    let layer = PartialConfig {
        namespace: Some("cf".to_string()),
        ..PartialConfig::default()
    };
    let config = Config::default().merge(layer);
    assert_eq!(config.namespace, "cf");
    assert_eq!(config.log.level, "warn");
    assert_eq!(config.suggestions.max_distance, 3);
}

#[test]
#[serial]
fn test_explicit_file_layer() {
    clear_env();
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let path = write(
        dir.path(),
        "namespace = \"cf\"\n[suggestions]\nmax_distance = 1\n",
    );

    let config = load_config(Some(&path)).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(config.namespace, "cf");
    assert_eq!(config.suggestions.max_distance, 1);
    assert!(config.suggestions.enabled);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let path = write(dir.path(), "[log]\nlevel = \"info\"\n");

    std::env::set_var("CODEFLARE_LOG_LEVEL", "debug");
    std::env::set_var("CODEFLARE_SUGGESTIONS_ENABLED", "false");
    let result = load_config(Some(&path));
    clear_env();

    let config = result.unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(config.log.level, "debug");
    assert!(!config.suggestions.enabled);
}

#[test]
#[serial]
fn test_invalid_env_value() {
    clear_env();
    std::env::set_var("CODEFLARE_SUGGESTIONS_MAX_DISTANCE", "many");
    let result = Config::default().apply_env_vars();
    clear_env();
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_unknown_key_rejected() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let path = write(dir.path(), "[suggestions]\nfuzzy = true\n");
    assert!(matches!(load_toml_file(&path), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_malformed_toml() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let path = write(dir.path(), "namespace = \n invalid [[[");
    assert!(matches!(load_toml_file(&path), Err(ConfigError::Parse { .. })));
}

#[test]
#[serial]
fn test_missing_explicit_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let result = load_config(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_validation_rejects_bad_values() {
    let bad_namespace = Config {
        namespace: "code flare".to_string(),
        ..Config::default()
    };
    assert!(bad_namespace.validate().is_err());

    let mut bad_level = Config::default();
    bad_level.log.level = "loud".to_string();
    assert!(bad_level.validate().is_err());

    let mut bad_distance = Config::default();
    bad_distance.suggestions.max_distance = 17;
    assert!(bad_distance.validate().is_err());
}

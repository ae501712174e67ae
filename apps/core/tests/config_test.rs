use std::time::{SystemTime, UNIX_EPOCH};

use quickmark_core::config::{load, save, validate, Config, ConfigError};
use quickmark_core::model::MatchField;
use quickmark_core::search::{MatchEngine, MatchOptions, PaletteError};

fn unique_config_path(label: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("quickmark-{label}-{unique}"))
        .join("config.toml")
}

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.provider, "edit-distance");
    assert_eq!(cfg.threshold, 0.4);
    assert_eq!(cfg.keys, vec![MatchField::Title, MatchField::Url]);
    assert!(cfg.config_path.to_string_lossy().contains("quickmark"));
    assert!(validate(&cfg).is_ok());
}

#[test]
fn rejects_out_of_range_values() {
    let threshold = Config {
        threshold: 1.5,
        ..Default::default()
    };
    let max_results = Config {
        max_results: 1_000,
        ..Default::default()
    };
    let keys = Config {
        keys: Vec::new(),
        ..Default::default()
    };

    assert!(validate(&threshold).is_err());
    assert!(validate(&max_results).is_err());
    assert!(validate(&keys).is_err());
}

#[test]
fn missing_file_loads_defaults_bound_to_path() {
    let path = unique_config_path("missing");
    let cfg = load(Some(&path)).unwrap();
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.max_results, 50);
}

#[test]
fn partial_file_overrides_only_given_fields() {
    let path = unique_config_path("partial");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "threshold = 0.25\nkeys = [\"url\"]\n").unwrap();

    let cfg = load(Some(&path)).unwrap();
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();

    assert_eq!(cfg.threshold, 0.25);
    assert_eq!(cfg.keys, vec![MatchField::Url]);
    assert_eq!(cfg.provider, "edit-distance");
}

#[test]
fn saved_config_loads_back() {
    let path = unique_config_path("save");
    let cfg = Config {
        provider: "subsequence".to_string(),
        max_results: 25,
        config_path: path.clone(),
        ..Default::default()
    };

    save(&cfg).unwrap();
    let loaded = load(Some(&path)).unwrap();
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();

    assert_eq!(loaded, cfg);
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = unique_config_path("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "threshold = [").unwrap();

    let result = load(Some(&path));
    std::fs::remove_dir_all(path.parent().unwrap()).unwrap();

    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn engine_options_follow_config() {
    let cfg = Config {
        threshold: 0.2,
        distance: 10,
        ..Default::default()
    };

    let engine = MatchEngine::from_config(&cfg).unwrap();

    assert_eq!(engine.options().threshold, 0.2);
    assert_eq!(engine.options().distance, 10);
    assert_eq!(MatchOptions::from(&cfg).max_results, 50);
}

#[test]
fn unknown_provider_is_engine_unavailable() {
    let cfg = Config {
        provider: "missing".to_string(),
        ..Default::default()
    };
    assert_eq!(
        MatchEngine::from_config(&cfg).unwrap_err(),
        PaletteError::EngineUnavailable("missing".to_string())
    );
}

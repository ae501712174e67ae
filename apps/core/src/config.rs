use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::MatchField;
use crate::search::{DEFAULT_DISTANCE, DEFAULT_PROVIDER, DEFAULT_THRESHOLD};

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: String,
    pub threshold: f64,
    pub distance: u32,
    pub keys: Vec<MatchField>,
    pub max_results: u16,
    pub log_dir: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            threshold: DEFAULT_THRESHOLD,
            distance: DEFAULT_DISTANCE,
            keys: vec![MatchField::Title, MatchField::Url],
            max_results: 50,
            log_dir: base.join("logs"),
            config_path: base.join(CONFIG_FILE_NAME),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "io error: {error}"),
            Self::Parse(error) => write!(f, "parse error: {error}"),
            Self::Serialize(error) => write!(f, "serialize error: {error}"),
            Self::Invalid(error) => write!(f, "invalid config: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialize(value)
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    std::env::temp_dir().join("quickmark")
}

pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| stable_app_data_dir().join(CONFIG_FILE_NAME));

    let mut cfg = if config_path.exists() {
        let raw = fs::read_to_string(&config_path)?;
        toml::from_str::<Config>(&raw)?
    } else {
        Config::default()
    };
    cfg.config_path = config_path;

    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg).map_err(ConfigError::Invalid)?;
    if let Some(parent) = cfg.config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(cfg)?;
    fs::write(&cfg.config_path, encoded)?;
    Ok(())
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.provider.trim().is_empty() {
        return Err("provider is required".into());
    }

    if !(0.0..=1.0).contains(&cfg.threshold) {
        return Err("threshold must be between 0.0 and 1.0".into());
    }

    if cfg.keys.is_empty() {
        return Err("at least one match key is required".into());
    }

    if cfg.max_results < 5 || cfg.max_results > 500 {
        return Err("max_results out of range".into());
    }

    if cfg.log_dir.as_os_str().is_empty() {
        return Err("log_dir is required".into());
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err("config_path is required".into());
    }

    Ok(())
}

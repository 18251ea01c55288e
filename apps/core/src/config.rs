use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::registry::{DEFAULT_CAPACITY, SEED_FILES};

pub const DEFAULT_ENDPOINT: &str =
    "https://xt6gsecaplq7ig2w2sg65fcqia0uihao.lambda-url.us-east-2.on.aws/";
pub const ENDPOINT_ENV: &str = "DOCSEARCH_ENDPOINT";
const APP_DIR_NAME: &str = "docsearch";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "config io error: {error}"),
            Self::Parse(error) => write!(f, "config parse error: {error}"),
            Self::Serialize(error) => write!(f, "config serialize error: {error}"),
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub max_files: usize,
    pub seed_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_files: DEFAULT_CAPACITY,
            seed_files: SEED_FILES.iter().map(|name| name.to_string()).collect(),
            request_timeout_secs: None,
            log_level: "info".to_string(),
            config_path: default_config_path(),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    let base = std::env::var_os("LOCALAPPDATA")
        .or_else(|| std::env::var_os("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
        })
        .unwrap_or_else(std::env::temp_dir);
    base.join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join(CONFIG_FILE_NAME)
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    let endpoint = cfg.endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err("endpoint must be an http(s) URL".into());
    }

    if cfg.max_files == 0 || cfg.max_files > 64 {
        return Err("max_files must be between 1 and 64".into());
    }

    if cfg.request_timeout_secs == Some(0) {
        return Err("request_timeout_secs must be positive when set".into());
    }

    if !LOG_LEVELS.contains(&cfg.log_level.to_ascii_lowercase().as_str()) {
        return Err(format!(
            "log_level must be one of {}",
            LOG_LEVELS.join(", ")
        ));
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err("config_path is required".into());
    }

    Ok(())
}

/// Reads the config at `path` (or the default location), falling back to defaults when
/// the file does not exist yet. Environment overrides are not applied here, so a loaded
/// config is always safe to save back.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let mut config = if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)?;
        toml::from_str::<Config>(&raw)?
    } else {
        Config::default()
    };
    config.config_path = config_path;

    validate(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

pub fn endpoint_from_env() -> Option<String> {
    std::env::var(ENDPOINT_ENV).ok()
}

/// Replaces the endpoint for this session only. Blank values are ignored. Returns whether
/// the endpoint changed.
pub fn apply_endpoint_override(
    cfg: &mut Config,
    endpoint: Option<&str>,
) -> Result<bool, ConfigError> {
    let Some(endpoint) = endpoint.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(false);
    };

    let mut candidate = cfg.clone();
    candidate.endpoint = endpoint.to_string();
    validate(&candidate).map_err(ConfigError::Invalid)?;
    *cfg = candidate;
    Ok(true)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = toml::to_string_pretty(cfg)?;
    std::fs::write(&cfg.config_path, encoded)?;
    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::placement::PlacementPreference;

pub const DEFAULT_MODIFIED_QUERY: &str = r#"SELECT name AS "Name",
       path AS "Path",
       strftime('%d.%m.%Y %H:%M', modified, 'unixepoch', 'localtime') AS "Date",
       tags AS "Tags"
FROM file
ORDER BY modified DESC
LIMIT 25"#;

pub const DEFAULT_CREATED_QUERY: &str = r#"SELECT name AS "Name",
       path AS "Path",
       strftime('%d.%m.%Y %H:%M', created, 'unixepoch', 'localtime') AS "Date",
       tags AS "Tags"
FROM file
ORDER BY created DESC
LIMIT 25"#;

const HOME_ENV: &str = "RECENTPICK_HOME";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON5 config: {0}")]
    Json5(#[from] json5::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub modified_query: String,
    pub created_query: String,
    pub placement: PlacementPreference,
    pub vault_root: Option<PathBuf>,
    pub index_db_path: PathBuf,
    pub workspace_path: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            modified_query: DEFAULT_MODIFIED_QUERY.to_string(),
            created_query: DEFAULT_CREATED_QUERY.to_string(),
            placement: PlacementPreference::default(),
            vault_root: None,
            index_db_path: base.join("index.sqlite3"),
            workspace_path: base.join("workspace.json"),
            config_path: base.join("config.toml"),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("recentpick")
}

/// Reads the config file, or returns defaults when it does not exist yet.
///
/// `.json` and `.json5` files are read as JSON5, anything else as TOML.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Config::default().config_path);

    let mut config = match fs::read_to_string(&config_path) {
        Ok(raw) if is_json_path(&config_path) => json5::from_str::<Config>(&raw)?,
        Ok(raw) => toml::from_str::<Config>(&raw)?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(error) => return Err(error.into()),
    };
    config.config_path = config_path;
    fill_empty_queries(&mut config);
    validate(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

pub fn save(config: &Config) -> Result<(), ConfigError> {
    validate(config).map_err(ConfigError::Invalid)?;
    if let Some(parent) = config.config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = if is_json_path(&config.config_path) {
        serde_json::to_string_pretty(config)
            .map_err(|error| ConfigError::Invalid(error.to_string()))?
    } else {
        toml::to_string_pretty(config)?
    };
    fs::write(&config.config_path, raw)?;
    Ok(())
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.modified_query.trim().is_empty() {
        return Err("modified_query is required".into());
    }

    if cfg.created_query.trim().is_empty() {
        return Err("created_query is required".into());
    }

    if cfg.index_db_path.as_os_str().is_empty() {
        return Err("index_db_path is required".into());
    }

    if cfg.workspace_path.as_os_str().is_empty() {
        return Err("workspace_path is required".into());
    }

    if cfg.config_path.as_os_str().is_empty() {
        return Err("config_path is required".into());
    }

    Ok(())
}

/// An emptied query text falls back to its default.
pub fn fill_empty_queries(config: &mut Config) {
    if config.modified_query.trim().is_empty() {
        config.modified_query = DEFAULT_MODIFIED_QUERY.to_string();
    }
    if config.created_query.trim().is_empty() {
        config.created_query = DEFAULT_CREATED_QUERY.to_string();
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false)
}

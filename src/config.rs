use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATA_DIR_ENV: &str = "CLIENT_AGENDA_DATA_DIR";
pub const HTTP_ADDR_ENV: &str = "CLIENT_AGENDA_HTTP_ADDR";
pub const LOG_ENV: &str = "CLIENT_AGENDA_LOG";
pub const CONFIG_PATH_ENV: &str = "CLIENT_AGENDA_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Runtime settings for the binaries.
///
/// ```toml
/// data_dir = "./data"
/// http_addr = "0.0.0.0:3000"
/// log_filter = "client_agenda=info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgendaConfig {
    pub data_dir: PathBuf,
    pub http_addr: String,
    pub log_filter: String,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            http_addr: "0.0.0.0:3000".to_string(),
            log_filter: "client_agenda=info".to_string(),
        }
    }
}

impl AgendaConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Config file named by `CLIENT_AGENDA_CONFIG` (if any), then
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from a key lookup, normally the process environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = lookup(HTTP_ADDR_ENV) {
            self.http_addr = addr;
        }
        if let Some(filter) = lookup(LOG_ENV) {
            self.log_filter = filter;
        }
        self
    }
}

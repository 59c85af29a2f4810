//! Runtime configuration: credential from the environment, everything else
//! from an optional TOML file.
//!
//! Example `config.toml`:
//!
//! ```toml
//! storage = "sqlite"
//! request_timeout_secs = 30
//! data_dir = "/var/lib/bookscout"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::catalog::DEFAULT_CATALOG_BASE_URL;
use crate::collection::StorageBackend;
use crate::error::{Result, ScoutError};
use crate::identify::vision::DEFAULT_GEMINI_BASE_URL;

/// Environment variables checked for the credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const MISSING_KEY_MESSAGE: &str =
    "API Key not found. Please ensure it's configured in your environment.";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub gemini_base_url: Option<String>,
    pub catalog_base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub storage: Option<StorageBackend>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    api_key: Option<String>,
    pub gemini_base_url: String,
    pub catalog_base_url: String,
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub request_timeout: Duration,
}

impl Config {
    /// Load from `path` (or the default location) and the process environment.
    ///
    /// An explicit `path` must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => load_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_file(&path)?,
                _ => {
                    debug!("No config file, using defaults");
                    FileConfig::default()
                }
            },
        };
        Self::from_sources(file, |name| std::env::var(name).ok())
    }

    /// Merge a parsed file with an environment lookup.
    pub fn from_sources<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|name| env(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty());

        let gemini_base_url = validate_url(
            "gemini_base_url",
            file.gemini_base_url.as_deref().unwrap_or(DEFAULT_GEMINI_BASE_URL),
        )?;
        let catalog_base_url = validate_url(
            "catalog_base_url",
            file.catalog_base_url.as_deref().unwrap_or(DEFAULT_CATALOG_BASE_URL),
        )?;

        let timeout_secs = file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ScoutError::Configuration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let data_dir = match file.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };

        Ok(Self {
            api_key,
            gemini_base_url,
            catalog_base_url,
            data_dir,
            storage: file.storage.unwrap_or_default(),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The AI credential, or the fatal configuration error when it is unset.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ScoutError::Configuration(MISSING_KEY_MESSAGE.to_string()))
    }
}

pub fn load_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScoutError::Configuration(format!("Failed to read config {:?}: {}", path, e))
    })?;
    let file: FileConfig = toml::from_str(&content).map_err(|e| {
        ScoutError::Configuration(format!("Invalid config {:?}: {}", path, e))
    })?;
    info!("Loaded config from {:?}", path);
    Ok(file)
}

/// `$CONFIG_DIR/bookscout/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("bookscout").join("config.toml"))
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("bookscout"))
        .ok_or_else(|| {
            ScoutError::Configuration(
                "Could not determine a data directory; set data_dir in config.toml".to_string(),
            )
        })
}

fn validate_url(key: &str, value: &str) -> Result<String> {
    let parsed = url::Url::parse(value)
        .map_err(|e| ScoutError::Configuration(format!("{} is not a valid URL ({}): {}", key, value, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScoutError::Configuration(format!(
            "{} must use http or https: {}",
            key, value
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}

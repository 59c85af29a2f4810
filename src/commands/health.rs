use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::collection::{open_storage, COLLECTION_KEY};
use crate::config::Config;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub api_key_set: bool,
    pub gemini_base_url: String,
    pub catalog_base_url: String,
    pub data_dir_path: String,
    pub storage_backend: String,
    pub storage_accessible: bool,
    pub storage_error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.api_key_set && self.storage_accessible
    }
}

pub fn check(config: &Config) -> HealthReport {
    info!("Running health check");

    let api_key_set = config.has_api_key();
    info!("API key set: {}", api_key_set);

    let storage_check = open_storage(config.storage, &config.data_dir)
        .and_then(|storage| storage.get(COLLECTION_KEY).map(|_| ()));
    let storage_error = match storage_check {
        Ok(()) => None,
        Err(e) => {
            warn!("Storage check failed: {}", e);
            Some(e.to_string())
        }
    };
    info!(
        "Storage accessible: {} at {:?}",
        storage_error.is_none(),
        config.data_dir
    );

    HealthReport {
        api_key_set,
        gemini_base_url: config.gemini_base_url.clone(),
        catalog_base_url: config.catalog_base_url.clone(),
        data_dir_path: config.data_dir.to_string_lossy().to_string(),
        storage_backend: config.storage.as_str().to_string(),
        storage_accessible: storage_error.is_none(),
        storage_error,
    }
}

/// Print the report as JSON. Returns whether everything checked out.
pub fn run(config: &Config, out: &mut dyn Write) -> Result<bool> {
    let report = check(config);
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(report.is_healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::StorageBackend;
    use crate::config::FileConfig;
    use tempfile::TempDir;

    fn config(dir: &TempDir, key: Option<&str>) -> Config {
        let file = FileConfig {
            data_dir: Some(dir.path().join("data")),
            storage: Some(StorageBackend::Sqlite),
            ..FileConfig::default()
        };
        let key = key.map(str::to_string);
        Config::from_sources(file, move |name| if name == "API_KEY" { key.clone() } else { None }).unwrap()
    }

    #[test]
    fn test_healthy_report() {
        let dir = TempDir::new().unwrap();
        let report = check(&config(&dir, Some("k")));
        assert!(report.api_key_set);
        assert!(report.storage_accessible);
        assert_eq!(report.storage_backend, "sqlite");
        assert!(report.is_healthy());
    }

    #[test]
    fn test_missing_key_is_unhealthy() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        let healthy = run(&config(&dir, None), &mut out).unwrap();
        assert!(!healthy);

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["api_key_set"], false);
        assert_eq!(json["storage_accessible"], true);
    }

    #[test]
    fn test_unwritable_data_dir_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "a file where the data dir should be").unwrap();

        let report = check(&config(&dir, Some("k")));
        assert!(!report.storage_accessible);
        assert!(report.storage_error.is_some());
    }
}

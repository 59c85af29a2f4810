//! Durable key-value storage for the collection.
//!
//! Two backends: a JSON object file rewritten atomically on every write, and
//! a single-table SQLite database. Both hold plain string values.

use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{Result, ScoutError};

/// String-valued key-value persistence.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Json => "json",
            StorageBackend::Sqlite => "sqlite",
        }
    }

    /// File name of the backend inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            StorageBackend::Json => "store.json",
            StorageBackend::Sqlite => "store.db",
        }
    }
}

/// Open the configured backend inside `data_dir`, creating the directory.
pub fn open_storage(backend: StorageBackend, data_dir: &Path) -> Result<Box<dyn Storage>> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| ScoutError::Storage(format!("Failed to create data dir {:?}: {}", data_dir, e)))?;

    let path = data_dir.join(backend.file_name());
    match backend {
        StorageBackend::Json => Ok(Box::new(JsonFileStorage::new(path))),
        StorageBackend::Sqlite => Ok(Box::new(SqliteStorage::new(&path)?)),
    }
}

/// JSON object file mapping keys to string values.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(serde_json::Map::new()),
            Err(e) => {
                return Err(ScoutError::Storage(format!(
                    "Failed to read {:?}: {}",
                    self.path, e
                )))
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| ScoutError::Storage(format!("Corrupt store file {:?}: {}", self.path, e)))
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map().unwrap_or_else(|e| {
            warn!("{}; starting a fresh store file", e);
            serde_json::Map::new()
        });
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));

        let json = serde_json::to_string_pretty(&map)
            .map_err(|e| ScoutError::Storage(format!("Failed to serialize store: {}", e)))?;

        let parent = self
            .path
            .parent()
            .ok_or_else(|| ScoutError::Storage(format!("Store path has no parent: {:?}", self.path)))?;
        std::fs::create_dir_all(parent)
            .map_err(|e| ScoutError::Storage(format!("Failed to create {:?}: {}", parent, e)))?;

        // Temp file in the same directory so the rename stays on one filesystem.
        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| ScoutError::Storage(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(json.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| ScoutError::Storage(format!("Failed to write store: {}", e)))?;
        temp.persist(&self.path)
            .map_err(|e| ScoutError::Storage(format!("Failed to replace {:?}: {}", self.path, e)))?;

        info!("Wrote key '{}' to {:?}", key, self.path);
        Ok(())
    }
}

/// SQLite-backed key-value table.
/// All operations are synchronous (rusqlite is blocking). Callers in async
/// contexts should run them through `tokio::task::spawn_blocking`.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| ScoutError::Storage(format!("Failed to open store database at {:?}: {}", db_path, e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| ScoutError::Storage(format!("Failed to create kv table: {}", e)))?;

        info!("Opened store database at {:?}", db_path);
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|e| ScoutError::Storage(format!("Store lookup failed: {}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| ScoutError::Storage(format!("Store write failed: {}", e)))?;
        Ok(())
    }
}

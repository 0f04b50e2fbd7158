use clap::ValueEnum;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Key the session is saved under
pub const STORAGE_KEY: &str = "placeguess.session";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
    Memory,
}

/// Opens the configured backend. File backends need a path.
pub fn open_store(
    backend: StoreBackend,
    path: Option<&Path>,
) -> Result<Box<dyn SessionStore>, StoreError> {
    let store: Box<dyn SessionStore> = match (backend, path) {
        (StoreBackend::Json, Some(p)) => Box::new(JsonFileStore::with_path(p)),
        (StoreBackend::Sqlite, Some(p)) => Box::new(SqliteStore::open(p)?),
        (StoreBackend::Memory, _) | (_, None) => {
            if backend != StoreBackend::Memory {
                tracing::warn!(%backend, "no state path available, progress will not survive a restart");
            }
            Box::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Key-value persistence for session snapshots
pub trait SessionStore {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }
}

/// Everything in one pretty-printed JSON object, one member per key
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionStore for JsonFileStore {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(StoreError::Json(error)) => {
                tracing::warn!(path = %self.path.display(), %error, "replacing unreadable session file");
                Map::new()
            }
            Err(e) => return Err(e),
        };
        all.insert(key.to_string(), value.clone());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // a crash mid-write leaves the old file intact
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&all)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }
}

/// SQLite-backed key-value table
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl SessionStore for SqliteStore {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, serde_json::to_string(value)?],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}

/// Non-persistent store, lost on exit
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }
}

use crate::errors::{AppError, AppResult};
use crate::models::NavigationState;
use crate::settings::AppSettings;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub const BOOKS_KEY: &str = "books";
pub const NAVIGATION_KEY: &str = "navigationState";
pub const SETTINGS_KEY: &str = "settings";

pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn put(&self, key: &str, value: &str) -> AppResult<()>;
}

#[derive(Debug)]
pub struct SqliteBlobStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteBlobStore {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let value = conn
            .query_row("SELECT value_json FROM kv_store WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> AppResult<()> {
        let conn = self.conn.lock().map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO kv_store (key, value_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal("memory store mutex poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| AppError::Internal("memory store mutex poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredLibrary {
    pub books: Vec<Value>,
    pub navigation_state: NavigationState,
}

#[derive(Clone)]
pub struct LibraryStore {
    blobs: Arc<dyn BlobStore>,
}

impl LibraryStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    pub fn load(&self) -> AppResult<StoredLibrary> {
        let books = match self.blobs.get(BOOKS_KEY)? {
            Some(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(books)) => books,
                Ok(Value::Null) => Vec::new(),
                Ok(_) => {
                    tracing::warn!("stored books are not a list; starting empty");
                    Vec::new()
                }
                Err(error) => {
                    return Err(AppError::Storage(format!("stored books are unreadable: {error}")));
                }
            },
            None => Vec::new(),
        };

        let navigation_state = match self.blobs.get(NAVIGATION_KEY)? {
            Some(raw) => serde_json::from_str::<NavigationState>(&raw).unwrap_or_else(|error| {
                tracing::warn!(error = %error, "navigation state unreadable; using default");
                NavigationState::default()
            }),
            None => NavigationState::default(),
        };

        Ok(StoredLibrary {
            books,
            navigation_state,
        })
    }

    pub fn save(&self, books: &[Value]) -> AppResult<()> {
        self.blobs.put(BOOKS_KEY, &serde_json::to_string(books)?)
    }

    pub fn save_state(&self, state: &NavigationState) -> AppResult<()> {
        self.blobs.put(NAVIGATION_KEY, &serde_json::to_string(state)?)
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        match self.blobs.get(SETTINGS_KEY)? {
            Some(raw) => Ok(serde_json::from_str::<AppSettings>(&raw).unwrap_or_default()),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn update_settings(&self, update: Value) -> AppResult<AppSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: AppSettings = serde_json::from_value(merged)
            .map_err(|error| AppError::Validation(format!("invalid settings: {error}")))?;
        settings.validate()?;

        self.blobs.put(SETTINGS_KEY, &serde_json::to_string(&settings)?)?;
        Ok(settings)
    }
}

fn merge_json(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}

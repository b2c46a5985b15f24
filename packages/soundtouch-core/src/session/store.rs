//! Key-value persistence for session state.
//!
//! Only two keys are ever written: the last connected device address and the
//! favorites list. Values are JSON so the file stays human-readable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur while persisting session state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenient Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> StoreResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store
// ─────────────────────────────────────────────────────────────────────────────

const STORE_FILE: &str = "soundtouch.json";

/// Global mutex to serialize all store file operations.
/// Prevents lost updates from concurrent read-modify-write cycles.
static STORE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn store_lock() -> &'static Mutex<()> {
    STORE_LOCK.get_or_init(|| Mutex::new(()))
}

/// Store backed by a single JSON object file in a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store writing to `soundtouch.json` inside `dir`.
    ///
    /// The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    /// Loads the whole file.
    ///
    /// Returns an empty map if the file doesn't exist or is invalid.
    fn load(&self) -> Map<String, Value> {
        match std::fs::read_to_string(self.path()) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("[Session] Ignoring unreadable store file: {}", e);
                Map::new()
            }),
            Err(_) => Map::new(),
        }
    }

    /// Saves the whole file.
    ///
    /// Uses atomic write (temp file + rename) to prevent corruption on crash.
    fn save(&self, map: &Map<String, Value>) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let temp_path = temp_path(&self.dir);
        let contents = serde_json::to_string_pretty(map)?;

        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, self.path())?;
        Ok(())
    }
}

fn temp_path(dir: &Path) -> PathBuf {
    dir.join(format!("{STORE_FILE}.tmp"))
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let _guard = store_lock().lock();
        Ok(self.load().remove(key))
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let _guard = store_lock().lock();
        let mut map = self.load();
        if map.get(key) == Some(&value) {
            return Ok(());
        }
        map.insert(key.to_string(), value);
        self.save(&map)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}

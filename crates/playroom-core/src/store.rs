//! Key-value persistence for UI preferences
//!
//! The playroom keeps one preference, the editor pane height under
//! [`EDITOR_SIZE_KEY`]. Stores hold arbitrary JSON values so hosts can keep
//! their own keys alongside it.

use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Key holding the last editor pane height in pixels
pub const EDITOR_SIZE_KEY: &str = "editorSize";

/// Async key-value store
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<Value>>;
    async fn set_item(&self, key: &str, value: Value) -> Result<()>;
}

/// Read the persisted editor height
///
/// Anything that is not a positive number counts as absent.
pub async fn load_editor_size(store: &dyn PreferenceStore) -> Result<Option<f64>> {
    let value = store.get_item(EDITOR_SIZE_KEY).await?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|height| height.is_finite() && *height > 0.0))
}

/// Persist the editor height
pub async fn save_editor_size(store: &dyn PreferenceStore, height: f64) -> Result<()> {
    store.set_item(EDITOR_SIZE_KEY, Value::from(height)).await
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, Value>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one item
    pub fn with_item(key: &str, value: Value) -> Self {
        let store = Self::new();
        store.items.lock().insert(key.to_string(), value);
        store
    }

    /// Number of `set_item` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Synchronous read, for inspection
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.items.lock().get(key).cloned()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.items.lock().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<()> {
        self.items.lock().insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store backed by a single JSON object file
///
/// The file is read on every `get_item` and rewritten on every `set_item`;
/// writes are rare since resize events are debounced.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `{config_dir}/playroom/preferences.json`
    pub fn open_default() -> Result<Self> {
        let path = dirs::config_dir()
            .map(|p| p.join("playroom").join("preferences.json"))
            .ok_or_else(|| Error::Store("Could not determine config directory".to_string()))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => match serde_json::from_str::<Value>(&contents)? {
                Value::Object(map) => Ok(map),
                _ => Err(Error::Store(format!(
                    "{} does not hold a JSON object",
                    self.path.display()
                ))),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PreferenceStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: Value) -> Result<()> {
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&Value::Object(items))?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Stored preference {key} in {}", self.path.display());
        Ok(())
    }
}

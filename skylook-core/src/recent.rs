//! Recently searched places, persisted in a key-value store.

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{
    model::PlaceLabel,
    ui::{RecentView, UiPorts},
};

/// Storage key for the recent list.
pub const RECENT_KEY: &str = "recent-weather";

/// Maximum number of remembered places.
pub const RECENT_CAPACITY: usize = 6;

/// Durable string-to-string storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries =
            self.entries.lock().map_err(|_| anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A single JSON object on disk, one member per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skylook", "skylook")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let all = self.read_all()?;
        Ok(all.get(key).and_then(Value::as_str).map(str::to_owned))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // An unreadable file is replaced rather than blocking every write.
        let mut all = self.read_all().unwrap_or_default();
        all.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create store directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(&all).context("Failed to serialize store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("Failed to write store file: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;

        Ok(())
    }
}

/// Bounded, deduplicated, most-recent-first list of place labels.
#[derive(Clone)]
pub struct RecentCache {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for RecentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentCache").finish_non_exhaustive()
    }
}

impl RecentCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Stored entries, most recent first. Anything unreadable counts as empty.
    pub fn entries(&self) -> Vec<PlaceLabel> {
        let raw = match self.store.get(RECENT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read recent searches: {e:#}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(items) => items.into_iter().filter_map(PlaceLabel::new).collect(),
            Err(e) => {
                tracing::warn!("Ignoring malformed recent searches: {e}");
                Vec::new()
            }
        }
    }

    /// Move `label` to the front, dropping any case-insensitive duplicate and
    /// anything past [`RECENT_CAPACITY`], then refresh the recent view.
    ///
    /// Blank labels are ignored. A failed write is logged and otherwise
    /// ignored: losing history must not fail the lookup that produced it.
    pub fn record(&self, label: &str, ui: &dyn UiPorts) {
        let Some(label) = PlaceLabel::new(label) else {
            return;
        };

        let list = push_front(self.entries(), label);
        if let Err(e) = self.write(&list) {
            tracing::warn!("Could not save recent searches: {e:#}");
        }

        self.render(ui);
    }

    pub fn clear(&self) -> Result<()> {
        self.write(&[])
    }

    pub fn view(&self) -> RecentView {
        let entries = self.entries();
        if entries.is_empty() {
            RecentView::Empty
        } else {
            RecentView::Items(entries)
        }
    }

    pub fn render(&self, ui: &dyn UiPorts) {
        ui.set_recent(self.view());
    }

    fn write(&self, list: &[PlaceLabel]) -> Result<()> {
        let json = serde_json::to_string(list).context("Failed to serialize recent searches")?;
        self.store.set(RECENT_KEY, &json)
    }
}

fn push_front(list: Vec<PlaceLabel>, label: PlaceLabel) -> Vec<PlaceLabel> {
    let mut out = Vec::with_capacity(RECENT_CAPACITY);
    out.extend(list.into_iter().filter(|l| !l.same_place(&label)));
    out.insert(0, label);
    out.truncate(RECENT_CAPACITY);
    out
}

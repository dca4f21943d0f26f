//!
//! partshop storage module
//! ------------------------
//! An embedded JSON document store standing in for the shop database. One
//! `DocStore` is one named database: a set of collections, each an ordered list
//! of JSON objects. Documents are kept in memory behind a `parking_lot::RwLock`
//! and persisted as one pretty-printed JSON array per collection under
//! `<root>/<db>/<collection>.json`.
//!
//! Key responsibilities:
//! - Collection lifecycle (create, list, drop) with name validation.
//! - Insert with `_id` assignment, equality-filtered find/update/delete.
//! - Snapshot load on open, explicit `flush`, optional periodic persistence.
//!
//! There are no indexes and no aggregation stages; queries are linear scans.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

mod filter;
mod snapshot;

pub use filter::Filter;

/// A single stored document.
pub type Document = serde_json::Map<String, JsonValue>;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PersistenceSettings {
    /// Enable periodic flushing of this database to disk
    #[serde(default)]
    pub enabled: bool,
    /// Interval in milliseconds between flushes
    #[serde(default = "PersistenceSettings::default_interval_ms")]
    pub interval_ms: u64,
}

impl PersistenceSettings {
    fn default_interval_ms() -> u64 { 5_000 }

    pub fn every(interval_ms: u64) -> Self { Self { enabled: interval_ms > 0, interval_ms } }
}

impl Default for PersistenceSettings {
    fn default() -> Self { Self { enabled: false, interval_ms: Self::default_interval_ms() } }
}

/// Handle to one named database. Clones share the same collections.
#[derive(Clone)]
pub struct DocStore {
    name: String,
    dir: PathBuf,
    collections: Arc<RwLock<BTreeMap<String, Vec<Document>>>>,
    /// Guard to ensure we only spawn one persistence task
    persist_started: Arc<Mutex<bool>>,
    /// Serializes flushes; they share temp file names and the stale-file sweep
    flush_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Collection names double as file stems.
pub fn validate_collection_name(name: &str) -> AppResult<()> {
    let ok = !name.is_empty()
        && !name.starts_with('.')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok { Ok(()) } else { Err(AppError::user("invalid_collection", &format!("invalid collection name '{}'", name))) }
}

fn document_id(doc: &Document) -> Option<String> {
    match doc.get("_id")? {
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl DocStore {
    /// Open `<root>/<name>`, loading any collections previously flushed there.
    pub async fn open(root: impl AsRef<Path>, name: &str) -> AppResult<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(AppError::user("invalid_database", &format!("invalid database name '{}'", name)));
        }
        let dir = root.as_ref().join(name);
        let loaded = snapshot::load_dir(&dir).await?;
        info!(target: "partshop::storage", "opened database '{}' at '{}' ({} collections)", name, dir.display(), loaded.len());
        Ok(Self {
            name: name.to_string(),
            dir,
            collections: Arc::new(RwLock::new(loaded)),
            persist_started: Arc::new(Mutex::new(false)),
            flush_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// A store that is never loaded from disk; `flush` still writes to `dir`.
    pub fn in_memory(dir: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            dir: dir.into(),
            collections: Arc::new(RwLock::new(BTreeMap::new())),
            persist_started: Arc::new(Mutex::new(false)),
            flush_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn dir(&self) -> &Path { &self.dir }

    /// Create an empty collection. Fails with `Conflict` if it already exists.
    pub fn create_collection(&self, coll: &str) -> AppResult<()> {
        validate_collection_name(coll)?;
        let mut w = self.collections.write();
        if w.contains_key(coll) {
            return Err(AppError::conflict("collection_exists", &format!("collection '{}' already exists", coll)));
        }
        w.insert(coll.to_string(), Vec::new());
        debug!(target: "partshop::storage", "create_collection: db='{}' coll='{}'", self.name, coll);
        Ok(())
    }

    /// Drop a collection. Returns true if it existed.
    pub fn drop_collection(&self, coll: &str) -> bool {
        self.collections.write().remove(coll).is_some()
    }

    pub fn has_collection(&self, coll: &str) -> bool { self.collections.read().contains_key(coll) }

    pub fn list_collections(&self) -> Vec<String> { self.collections.read().keys().cloned().collect() }

    /// Insert one document, assigning a UUID `_id` when absent. Returns the id.
    pub fn insert_one(&self, coll: &str, mut doc: Document) -> AppResult<String> {
        validate_collection_name(coll)?;
        if !doc.contains_key("_id") {
            doc.insert("_id".into(), JsonValue::String(uuid::Uuid::new_v4().to_string()));
        }
        let id = document_id(&doc).unwrap_or_default();
        self.collections.write().entry(coll.to_string()).or_default().push(doc);
        debug!(target: "partshop::storage", "insert_one: coll='{}' id='{}'", coll, id);
        Ok(id)
    }

    /// Insert many documents; returns the inserted count.
    pub fn insert_many(&self, coll: &str, docs: Vec<Document>) -> AppResult<usize> {
        validate_collection_name(coll)?;
        let n = docs.len();
        let mut w = self.collections.write();
        let target = w.entry(coll.to_string()).or_default();
        for mut doc in docs {
            if !doc.contains_key("_id") {
                doc.insert("_id".into(), JsonValue::String(uuid::Uuid::new_v4().to_string()));
            }
            target.push(doc);
        }
        debug!(target: "partshop::storage", "insert_many: coll='{}' n={}", coll, n);
        Ok(n)
    }

    /// Matching documents in insertion order. A missing collection is empty.
    pub fn find(&self, coll: &str, filter: &Filter) -> Vec<Document> {
        let r = self.collections.read();
        r.get(coll)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn find_one(&self, coll: &str, filter: &Filter) -> Option<Document> {
        let r = self.collections.read();
        r.get(coll)?.iter().find(|d| filter.matches(d)).cloned()
    }

    /// Client-side predicate scan for conditions that are not plain equality.
    pub fn find_where<F>(&self, coll: &str, pred: F) -> Vec<Document>
    where
        F: Fn(&Document) -> bool,
    {
        let r = self.collections.read();
        r.get(coll)
            .map(|docs| docs.iter().filter(|d| pred(d)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, coll: &str, filter: &Filter) -> usize {
        let r = self.collections.read();
        r.get(coll).map(|docs| docs.iter().filter(|d| filter.matches(d)).count()).unwrap_or(0)
    }

    /// Set fields (dotted paths allowed) on the first matching document.
    /// Returns 1 if the document changed, 0 otherwise.
    pub fn update_one(&self, coll: &str, filter: &Filter, set: Document) -> AppResult<usize> {
        if set.contains_key("_id") {
            return Err(AppError::user("immutable_id", "the _id field cannot be updated"));
        }
        let mut w = self.collections.write();
        let Some(doc) = w.get_mut(coll).and_then(|docs| docs.iter_mut().find(|d| filter.matches(d))) else {
            return Ok(0);
        };
        let mut changed = false;
        for (path, value) in set {
            changed |= filter::set_path(doc, &path, value);
        }
        debug!(target: "partshop::storage", "update_one: coll='{}' changed={}", coll, changed);
        Ok(usize::from(changed))
    }

    pub fn delete_one(&self, coll: &str, filter: &Filter) -> usize {
        let mut w = self.collections.write();
        let Some(docs) = w.get_mut(coll) else { return 0; };
        match docs.iter().position(|d| filter.matches(d)) {
            Some(i) => { docs.remove(i); 1 }
            None => 0,
        }
    }

    pub fn delete_many(&self, coll: &str, filter: &Filter) -> usize {
        let mut w = self.collections.write();
        let Some(docs) = w.get_mut(coll) else { return 0; };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        let removed = before - docs.len();
        debug!(target: "partshop::storage", "delete_many: coll='{}' removed={}", coll, removed);
        removed
    }

    /// Write every collection to disk and remove files of dropped collections.
    /// Concurrent calls run one after another.
    pub async fn flush(&self) -> AppResult<()> {
        let _guard = self.flush_lock.lock().await;
        let snap: BTreeMap<String, Vec<Document>> = self.collections.read().clone();
        snapshot::write_all(&self.dir, &snap).await?;
        debug!(target: "partshop::storage", "flush: db='{}' collections={}", self.name, snap.len());
        Ok(())
    }

    /// Spawn a background task flushing at the configured interval. Only the
    /// first call per store spawns; later calls return `None`.
    pub fn start_persistence(&self, settings: &PersistenceSettings) -> Option<tokio::task::JoinHandle<()>> {
        if !settings.enabled { return None; }
        let mut started = self.persist_started.lock();
        if *started { return None; }
        *started = true;
        drop(started);
        let interval = Duration::from_millis(settings.interval_ms.max(1));
        let this = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = this.flush().await {
                    warn!(target: "partshop::storage", "periodic flush of '{}' failed: {}", this.name, e);
                }
            }
        }))
    }
}

//! Persisted publish history.
//!
//! An append-only, newest-first log of completed publishes, stored under a
//! fixed namespace key through an injected storage backend. The log is
//! read once at load and rewritten wholesale on each append; corrupt or
//! missing storage degrades to an empty list without failing startup.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use crate::errors::{Result, StoryreelError};
use crate::providers::youtube::playlist_url;

/// The namespace key the history is stored under.
pub const HISTORY_KEY: &str = "storyreel.publish_history";

/// Key-value storage the history is persisted through.
pub trait StorageBackend: Send + Sync {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.entries.lock().insert(key.into(), value.into());
        storage
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed storage: one file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Creates a backend rooted at `root`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted namespaces, safe as file names.
        self.root.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoryreelError::Storage(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .map_err(|err| StoryreelError::Storage(err.to_string()))?;
        std::fs::write(self.path_for(key), value)
            .map_err(|err| StoryreelError::Storage(err.to_string()))
    }
}

/// One completed publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    /// The collection (playlist) identifier.
    pub collection_id: String,
    /// The published item identifiers, in part order.
    pub item_ids: Vec<String>,
    /// The story title.
    pub title: String,
    /// The source trend topic.
    pub topic: String,
    /// When the publish completed.
    pub published_at: DateTime<Utc>,
}

impl PublishRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        collection_id: impl Into<String>,
        item_ids: Vec<String>,
        title: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            collection_id: collection_id.into(),
            item_ids,
            title: title.into(),
            topic: topic.into(),
            published_at: Utc::now(),
        }
    }

    /// Renders the collection view link for this record.
    #[must_use]
    pub fn playlist_url(&self) -> String {
        playlist_url(&self.collection_id)
    }
}

/// The publish history: newest-first records behind a storage backend.
pub struct PublishHistory {
    backend: Arc<dyn StorageBackend>,
    records: RwLock<Vec<PublishRecord>>,
}

impl PublishHistory {
    /// Loads the history from the backend.
    ///
    /// Missing or corrupt storage degrades to an empty history.
    #[must_use]
    pub fn load(backend: Arc<dyn StorageBackend>) -> Self {
        let records = match backend.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<PublishRecord>>(&raw) {
                Ok(records) => records,
                Err(err) => {
                    warn!(error = %err, "publish history is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "publish history unreadable, starting empty");
                Vec::new()
            }
        };
        Self {
            backend,
            records: RwLock::new(records),
        }
    }

    /// Appends a record as the newest entry and rewrites the stored list.
    pub fn append(&self, record: PublishRecord) -> Result<()> {
        let mut records = self.records.write();
        records.insert(0, record);
        let raw = serde_json::to_string(&*records)?;
        self.backend.set(HISTORY_KEY, &raw)
    }

    /// Returns the records, newest first.
    #[must_use]
    pub fn records(&self) -> Vec<PublishRecord> {
        self.records.read().clone()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(n: usize) -> PublishRecord {
        PublishRecord::new(
            format!("PL{n}"),
            vec![format!("v{n}a"), format!("v{n}b")],
            format!("Story {n}"),
            format!("trend {n}"),
        )
    }

    #[test]
    fn missing_storage_loads_empty() {
        let history = PublishHistory::load(Arc::new(MemoryStorage::new()));
        assert!(history.is_empty());
    }

    #[test]
    fn corrupt_storage_loads_empty() {
        let backend = MemoryStorage::with_entry(HISTORY_KEY, "{not json");
        let history = PublishHistory::load(Arc::new(backend));
        assert!(history.is_empty());
    }

    #[test]
    fn append_prepends_and_persists() {
        let backend = Arc::new(MemoryStorage::new());
        let history = PublishHistory::load(Arc::clone(&backend) as Arc<dyn StorageBackend>);
        history.append(record(1)).unwrap();
        history.append(record(2)).unwrap();

        let records = history.records();
        assert_eq!(records[0].collection_id, "PL2");
        assert_eq!(records[1].collection_id, "PL1");

        // A reload sees the same list.
        let reloaded = PublishHistory::load(backend);
        assert_eq!(reloaded.records(), records);
    }

    #[test]
    fn append_preserves_existing_records() {
        let backend = Arc::new(MemoryStorage::new());
        let seeded = PublishHistory::load(Arc::clone(&backend) as Arc<dyn StorageBackend>);
        for n in 1..=3 {
            seeded.append(record(n)).unwrap();
        }
        let before = seeded.records();

        let history = PublishHistory::load(Arc::clone(&backend) as Arc<dyn StorageBackend>);
        history.append(record(4)).unwrap();

        let after = history.records();
        assert_eq!(after.len(), 4);
        assert_eq!(after[0].collection_id, "PL4");
        assert_eq!(&after[1..], &before[..]);
    }

    #[test]
    fn playlist_url_round_trips_collection_id() {
        let rec = record(7);
        assert_eq!(
            rec.playlist_url(),
            "https://www.youtube.com/playlist?list=PL7"
        );
    }

    #[test]
    fn file_storage_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileStorage::new(dir.path());
        assert_eq!(backend.get(HISTORY_KEY).unwrap(), None);
        backend.set(HISTORY_KEY, "[]").unwrap();
        assert_eq!(backend.get(HISTORY_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_storage_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FileStorage::new(dir.path()));
        let history = PublishHistory::load(Arc::clone(&backend) as Arc<dyn StorageBackend>);
        history.append(record(1)).unwrap();

        let reloaded = PublishHistory::load(backend);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records()[0].collection_id, "PL1");
    }
}

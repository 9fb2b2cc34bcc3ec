//! JSON-file document store
//!
//! Loads the whole household file into a [`MemoryStore`] on open and writes
//! it back atomically after every mutation. Mutations are serialized, and a
//! mutation whose write-back fails is rolled back in memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::document::{CollectionPath, Document, Fields, WriteMode};
use super::file_io::{read_json, write_json_atomic};
use super::memory::{MemoryStore, Snapshot};
use super::query::Query;
use super::subscription::{Listener, Subscription};
use super::DocumentStore;
use crate::error::{HearthError, HearthResult};

const STORE_SCHEMA_VERSION: u32 = 1;

/// On-disk layout of the store file
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    schema_version: u32,
    #[serde(default)]
    collections: BTreeMap<CollectionPath, BTreeMap<String, Fields>>,
}

/// Document store persisted to a single JSON file
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    writes: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file doesn't exist
    pub fn open(path: impl Into<PathBuf>) -> HearthResult<Self> {
        let path = path.into();
        let file: StoreFile = read_json(&path)?;

        let documents: usize = file.collections.values().map(|c| c.len()).sum();
        info!(
            path = %path.display(),
            collections = file.collections.len(),
            documents,
            "opened document store"
        );

        let snapshot: Snapshot = file.collections.into_iter().collect();
        Ok(Self {
            path,
            inner: MemoryStore::from_snapshot(snapshot),
            writes: Mutex::new(()),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Refuse new subscriptions
    pub fn close(&self) {
        self.inner.close();
    }

    fn persist(&self) -> HearthResult<()> {
        let file = StoreFile {
            schema_version: STORE_SCHEMA_VERSION,
            collections: self.inner.snapshot()?.into_iter().collect(),
        };
        debug!(path = %self.path.display(), "persisting document store");
        write_json_atomic(&self.path, &file)
    }

    /// Apply `mutate` to the working set and write the result to disk
    fn write<T, F>(&self, mutate: F) -> HearthResult<T>
    where
        F: FnOnce(&MemoryStore) -> HearthResult<T>,
    {
        let _writes = self
            .writes
            .lock()
            .map_err(|e| HearthError::Storage(format!("Failed to acquire store write lock: {}", e)))?;

        let before = self.inner.snapshot()?;
        let result = mutate(&self.inner)?;

        if let Err(e) = self.persist() {
            warn!(path = %self.path.display(), error = %e, "persist failed, rolling back");
            if let Err(restore_err) = self.inner.restore(before) {
                warn!(error = %restore_err, "rollback failed");
            }
            return Err(e);
        }
        Ok(result)
    }
}

impl DocumentStore for JsonFileStore {
    fn create(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()> {
        self.write(|inner| inner.create(path, id, fields))
    }

    fn get(&self, path: &CollectionPath, id: &str) -> HearthResult<Option<Document>> {
        self.inner.get(path, id)
    }

    fn set(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: Fields,
        mode: WriteMode,
    ) -> HearthResult<()> {
        self.write(|inner| inner.set(path, id, fields, mode))
    }

    fn update(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()> {
        self.write(|inner| inner.update(path, id, fields))
    }

    fn delete(&self, path: &CollectionPath, id: &str) -> HearthResult<bool> {
        self.write(|inner| inner.delete(path, id))
    }

    fn query(&self, path: &CollectionPath, query: &Query) -> HearthResult<Vec<Document>> {
        self.inner.query(path, query)
    }

    fn subscribe(
        &self,
        path: &CollectionPath,
        query: Query,
        listener: Listener,
    ) -> HearthResult<Subscription> {
        self.inner.subscribe(path, query, listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn path() -> CollectionPath {
        CollectionPath::parse("households/h/expenses").unwrap()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path().join("household.json")).unwrap();
        assert!(store.query(&path(), &Query::all()).unwrap().is_empty());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("household.json");

        {
            let store = JsonFileStore::open(&file).unwrap();
            let fields = json!({"amount": 12.5}).as_object().unwrap().clone();
            store.create(&path(), "e1", fields.clone()).unwrap();
            store.create(&path(), "e2", fields).unwrap();
            store.delete(&path(), "e2").unwrap();
        }

        let reopened = JsonFileStore::open(&file).unwrap();
        let docs = reopened.query(&path(), &Query::all()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "e1");
        assert_eq!(docs[0].field("amount"), Some(&json!(12.5)));
    }

    #[test]
    fn test_concurrent_writers_all_commit() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("household.json");
        let store = Arc::new(JsonFileStore::open(&file).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        let fields = json!({"amount": i}).as_object().unwrap().clone();
                        store.create(&path(), &format!("t{}-e{}", t, i), fields)?;
                    }
                    Ok::<(), HearthError>(())
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(store.query(&path(), &Query::all()).unwrap().len(), 200);
        let reopened = JsonFileStore::open(&file).unwrap();
        assert_eq!(reopened.query(&path(), &Query::all()).unwrap().len(), 200);

        let leftovers = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_failed_persist_rolls_back_memory() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = JsonFileStore::open(blocker.join("household.json")).unwrap();
        let fields = json!({"amount": 3}).as_object().unwrap().clone();
        let result = store.create(&path(), "e1", fields);

        assert!(matches!(result, Err(HearthError::Storage(_))));
        assert!(store.get(&path(), "e1").unwrap().is_none());
    }
}

//! In-memory document store
//!
//! Holds every collection in a `RwLock`-guarded map. Used directly in tests
//! and embedded setups, and as the working set of [`JsonFileStore`].
//!
//! [`JsonFileStore`]: super::JsonFileStore

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use super::document::{CollectionPath, Document, Fields, WriteMode};
use super::query::Query;
use super::subscription::{Listener, Subscription, SubscriptionRegistry};
use super::DocumentStore;
use crate::error::{HearthError, HearthResult};

/// Raw contents of a store: collection path -> document id -> fields
pub type Snapshot = HashMap<CollectionPath, BTreeMap<String, Fields>>;

/// Document store kept entirely in memory
pub struct MemoryStore {
    collections: RwLock<Snapshot>,
    subscriptions: Arc<SubscriptionRegistry>,
    closed: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::new())
    }

    /// Create a store pre-populated with the given contents
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            collections: RwLock::new(snapshot),
            subscriptions: SubscriptionRegistry::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Copy out the full contents of the store
    pub fn snapshot(&self) -> HearthResult<Snapshot> {
        let collections = self
            .collections
            .read()
            .map_err(|e| HearthError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(collections.clone())
    }

    /// Replace the full contents of the store and re-deliver every
    /// subscribed collection whose contents may have changed.
    pub fn restore(&self, snapshot: Snapshot) -> HearthResult<()> {
        let paths: Vec<CollectionPath> = {
            let mut collections = self.collections.write().map_err(|e| {
                HearthError::Storage(format!("Failed to acquire write lock: {}", e))
            })?;
            let mut paths: Vec<CollectionPath> = collections
                .keys()
                .chain(snapshot.keys())
                .cloned()
                .collect();
            paths.sort();
            paths.dedup();
            *collections = snapshot;
            paths
        };
        for path in &paths {
            self.notify_changed(path);
        }
        Ok(())
    }

    /// Close the store. Reads and writes keep working; new subscriptions
    /// are refused.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    fn documents(&self, path: &CollectionPath) -> HearthResult<Vec<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| HearthError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(collections
            .get(path)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// The write has already committed, so a failed delivery is only logged.
    fn notify_changed(&self, path: &CollectionPath) {
        if let Err(e) = self.subscriptions.notify(path, || self.documents(path)) {
            warn!(path = %path, error = %e, "failed to notify subscribers");
        }
    }

    fn write<F, T>(&self, path: &CollectionPath, f: F) -> HearthResult<T>
    where
        F: FnOnce(&mut BTreeMap<String, Fields>) -> HearthResult<T>,
    {
        let result = {
            let mut collections = self.collections.write().map_err(|e| {
                HearthError::Storage(format!("Failed to acquire write lock: {}", e))
            })?;
            f(collections.entry(path.clone()).or_default())?
        };
        self.notify_changed(path);
        Ok(result)
    }
}

impl DocumentStore for MemoryStore {
    fn create(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()> {
        debug!(path = %path, id, "create document");
        self.write(path, |docs| {
            if docs.contains_key(id) {
                return Err(HearthError::Duplicate {
                    entity_type: "Document",
                    identifier: format!("{}/{}", path, id),
                });
            }
            docs.insert(id.to_string(), fields);
            Ok(())
        })
    }

    fn get(&self, path: &CollectionPath, id: &str) -> HearthResult<Option<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| HearthError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(collections
            .get(path)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    fn set(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: Fields,
        mode: WriteMode,
    ) -> HearthResult<()> {
        debug!(path = %path, id, ?mode, "set document");
        self.write(path, |docs| {
            match (mode, docs.get_mut(id)) {
                (WriteMode::Merge, Some(existing)) => existing.extend(fields),
                _ => {
                    docs.insert(id.to_string(), fields);
                }
            }
            Ok(())
        })
    }

    fn update(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()> {
        debug!(path = %path, id, "update document");
        self.write(path, |docs| match docs.get_mut(id) {
            Some(existing) => {
                existing.extend(fields);
                Ok(())
            }
            None => Err(HearthError::NotFound {
                entity_type: "Document",
                identifier: format!("{}/{}", path, id),
            }),
        })
    }

    fn delete(&self, path: &CollectionPath, id: &str) -> HearthResult<bool> {
        debug!(path = %path, id, "delete document");
        self.write(path, |docs| Ok(docs.remove(id).is_some()))
    }

    fn query(&self, path: &CollectionPath, query: &Query) -> HearthResult<Vec<Document>> {
        Ok(query.apply(self.documents(path)?))
    }

    fn subscribe(
        &self,
        path: &CollectionPath,
        query: Query,
        listener: Listener,
    ) -> HearthResult<Subscription> {
        if self.is_closed() {
            return Err(HearthError::Storage(format!(
                "Cannot subscribe to {}: store is closed",
                path
            )));
        }

        listener(&query.apply(self.documents(path)?));
        self.subscriptions.register(path.clone(), query, listener)
    }
}

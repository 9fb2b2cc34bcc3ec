//! Live query subscriptions
//!
//! A subscription re-delivers the full result set of its query every time
//! its collection changes. The caller owns the returned [`Subscription`]
//! handle: dropping it, or calling [`Subscription::cancel`], stops delivery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use super::document::{CollectionPath, Document};
use super::query::Query;
use crate::error::{HearthError, HearthResult};

/// Callback invoked with the current result set of a subscribed query
pub type Listener = Box<dyn Fn(&[Document]) + Send + Sync>;

struct Entry {
    path: CollectionPath,
    query: Query,
    listener: Arc<dyn Fn(&[Document]) + Send + Sync>,
}

/// Active subscriptions of one store
#[derive(Default)]
pub struct SubscriptionRegistry {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, Entry>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listener and hand back its owning handle
    pub fn register(
        self: &Arc<Self>,
        path: CollectionPath,
        query: Query,
        listener: Listener,
    ) -> HearthResult<Subscription> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| HearthError::Storage(format!("Failed to acquire subscription lock: {}", e)))?;

        debug!(subscription = id, path = %path, "registering subscription");
        entries.insert(
            id,
            Entry {
                path,
                query,
                listener: Arc::from(listener),
            },
        );

        Ok(Subscription {
            id,
            registry: Arc::downgrade(self),
        })
    }

    /// Deliver fresh results to every listener on `path`.
    ///
    /// `load` returns the unfiltered contents of the collection. Listeners
    /// run after the registry lock is released, so a listener may cancel
    /// subscriptions.
    pub fn notify<F>(&self, path: &CollectionPath, load: F) -> HearthResult<()>
    where
        F: Fn() -> HearthResult<Vec<Document>>,
    {
        let targets: Vec<(Query, Arc<dyn Fn(&[Document]) + Send + Sync>)> = {
            let entries = self.entries.lock().map_err(|e| {
                HearthError::Storage(format!("Failed to acquire subscription lock: {}", e))
            })?;
            entries
                .values()
                .filter(|e| &e.path == path)
                .map(|e| (e.query.clone(), Arc::clone(&e.listener)))
                .collect()
        };

        if targets.is_empty() {
            return Ok(());
        }

        let documents = load()?;
        for (query, listener) in targets {
            let results = query.apply(documents.iter().cloned());
            listener(&results);
        }

        Ok(())
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _entries = self.entries.lock();
                    panic!("subscription lock poisoned");
                })
                .join();
        });
    }

    fn remove(&self, id: u64) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.remove(&id).is_some() {
                debug!(subscription = id, "subscription cancelled");
            }
        }
    }
}

/// Handle owning one live subscription
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    id: u64,
    registry: Weak<SubscriptionRegistry>,
}

impl Subscription {
    /// Stop delivery. Equivalent to dropping the handle.
    pub fn cancel(self) {}

    /// Whether the subscription can still receive updates
    pub fn is_active(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry
                .entries
                .lock()
                .map(|e| e.contains_key(&self.id))
                .unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn path() -> CollectionPath {
        CollectionPath::parse("households/h/expenses").unwrap()
    }

    fn docs() -> HearthResult<Vec<Document>> {
        Ok(vec![Document::new(
            "e1",
            json!({"amount": 5}).as_object().unwrap().clone(),
        )])
    }

    #[test]
    fn test_notify_reaches_matching_path_only() {
        let registry = SubscriptionRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let _sub = registry
            .register(
                path(),
                Query::all(),
                Box::new(move |results| {
                    assert_eq!(results.len(), 1);
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        registry.notify(&path(), docs).unwrap();
        let other = CollectionPath::parse("households/h/budgets").unwrap();
        registry.notify(&other, docs).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_cancels() {
        let registry = SubscriptionRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let sub = registry
            .register(
                path(),
                Query::all(),
                Box::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        assert!(sub.is_active());
        assert_eq!(registry.len(), 1);

        sub.cancel();
        assert!(registry.is_empty());

        registry.notify(&path(), docs).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}

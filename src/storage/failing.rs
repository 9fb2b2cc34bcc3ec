//! Fault-injecting store wrapper
//!
//! Lets a fixed number of writes through to the wrapped store and fails every
//! write after that. Reads always pass through. Used to exercise the
//! partial-failure paths of multi-step budget operations.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::document::{CollectionPath, Document, Fields, WriteMode};
use super::query::Query;
use super::subscription::{Listener, Subscription};
use super::DocumentStore;
use crate::error::{HearthError, HearthResult};

/// Store wrapper that starts failing writes after a budget of successes
pub struct FailingStore<S> {
    inner: S,
    remaining: AtomicUsize,
}

impl<S: DocumentStore> FailingStore<S> {
    /// Allow `successful_writes` writes, then fail
    pub fn new(inner: S, successful_writes: usize) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(successful_writes),
        }
    }

    /// Reset the number of writes allowed before failing
    pub fn allow_writes(&self, successful_writes: usize) {
        self.remaining.store(successful_writes, Ordering::SeqCst);
    }

    /// Access the wrapped store, bypassing fault injection
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn take_write(&self, path: &CollectionPath, id: &str) -> HearthResult<()> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if allowed {
            Ok(())
        } else {
            Err(HearthError::Storage(format!(
                "Injected write failure at {}/{}",
                path, id
            )))
        }
    }
}

impl<S: DocumentStore> DocumentStore for FailingStore<S> {
    fn create(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()> {
        self.take_write(path, id)?;
        self.inner.create(path, id, fields)
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
        self.take_write(path, id)?;
        self.inner.set(path, id, fields, mode)
    }

    fn update(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()> {
        self.take_write(path, id)?;
        self.inner.update(path, id, fields)
    }

    fn delete(&self, path: &CollectionPath, id: &str) -> HearthResult<bool> {
        self.take_write(path, id)?;
        self.inner.delete(path, id)
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

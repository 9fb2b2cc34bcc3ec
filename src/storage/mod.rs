//! Storage layer for Hearth
//!
//! The document store is an external collaborator. This module defines the
//! [`DocumentStore`] contract the core relies on, plus the implementations
//! shipped with the crate:
//!
//! - [`MemoryStore`]: everything in memory
//! - [`JsonFileStore`]: one JSON file per household with atomic writes
//! - [`FailingStore`]: fault injection for partial-failure tests

pub mod document;
pub mod failing;
pub mod file_io;
pub mod init;
pub mod json_file;
pub mod memory;
pub mod query;
pub mod records;
pub mod subscription;

pub use document::{CollectionPath, Document, Fields, WriteMode};
pub use failing::FailingStore;
pub use init::initialize_household;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use query::{Direction, Filter, FilterOp, Query};
pub use subscription::{Listener, Subscription};

use crate::error::HearthResult;

/// Per-collection document storage with queries and live subscriptions.
///
/// Each call is an independent operation: nothing groups several calls into
/// a transaction.
pub trait DocumentStore: Send + Sync {
    /// Create a document. Fails with `Duplicate` if the id is taken.
    fn create(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()>;

    /// Fetch a document by id
    fn get(&self, path: &CollectionPath, id: &str) -> HearthResult<Option<Document>>;

    /// Write a document, creating it if absent. `WriteMode::Merge` keeps
    /// existing fields the write does not mention.
    fn set(
        &self,
        path: &CollectionPath,
        id: &str,
        fields: Fields,
        mode: WriteMode,
    ) -> HearthResult<()>;

    /// Merge fields into an existing document. Fails with `NotFound` if absent.
    fn update(&self, path: &CollectionPath, id: &str, fields: Fields) -> HearthResult<()>;

    /// Delete a document, returning whether it existed
    fn delete(&self, path: &CollectionPath, id: &str) -> HearthResult<bool>;

    /// Run a query against one collection
    fn query(&self, path: &CollectionPath, query: &Query) -> HearthResult<Vec<Document>>;

    /// Deliver the query's results now and again after every change to the
    /// collection, until the returned handle is dropped.
    ///
    /// Fails instead of returning an inert handle when the subscription
    /// cannot be set up.
    fn subscribe(
        &self,
        path: &CollectionPath,
        query: Query,
        listener: Listener,
    ) -> HearthResult<Subscription>;
}

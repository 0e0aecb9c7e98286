use std::sync::Arc;

use async_trait::async_trait;
use rudby_types::RecordId;
use serde_json::{Map, Value};

use crate::document::{Document, Filter};
use crate::error::StoreResult;

/// Durable document store consumed by the catalog core.
///
/// All implementations must satisfy these invariants:
/// - `atomic_increment` reads and advances a counter as one indivisible
///   operation, creating the counter (at 1) inside that same operation when
///   it is absent. Two concurrent callers never observe the same value.
/// - Collection operations on unrelated documents are independent; no
///   ordering between them is promised.
/// - `find_one` / `find_many` return documents in the collection's natural
///   (insertion) order.
/// - After [`close`](Self::close) every call fails with `StoreError::Closed`.
/// - All backend errors are propagated, never silently ignored.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Atomically increment the named counter and return its new value.
    ///
    /// An absent counter is initialized so that this call returns 1.
    async fn atomic_increment(&self, counter_key: &str) -> StoreResult<u64>;

    /// Insert a new document and return the id assigned to it.
    async fn insert(&self, collection: &str, body: Map<String, Value>) -> StoreResult<RecordId>;

    /// First document matching `filter`, or `None`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Every document matching `filter`.
    async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    /// Replace the body of the document with this id.
    ///
    /// Returns `false` if no such document exists.
    async fn replace(
        &self,
        collection: &str,
        id: &RecordId,
        body: Map<String, Value>,
    ) -> StoreResult<bool>;

    /// Remove the document with this id. Returns `true` if it existed.
    async fn remove(&self, collection: &str, id: &RecordId) -> StoreResult<bool>;

    /// Tear the store down. Idempotent.
    async fn close(&self) -> StoreResult<()>;

    /// Whether the store still accepts operations.
    fn is_open(&self) -> bool;

    /// Fetch a document by id.
    async fn find_by_id(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>> {
        self.find_one(collection, &Filter::by_id(*id)).await
    }
}

/// Shared handle to a durable store, injected into every component that
/// needs storage.
pub type StoreHandle = Arc<dyn DurableStore>;

//! Store doubles for exercising failure and interleaving paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rudby_store::{
    Document, DurableStore, Filter, InMemoryDurableStore, StoreError, StoreHandle, StoreResult,
};
use rudby_types::RecordId;
use serde_json::{Map, Value};

/// Wraps an in-memory store, yields before every call so concurrent tasks
/// interleave, and can be told to fail specific operations.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub inner: InMemoryDurableStore,
    pub fail_increment: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_reads: AtomicBool,
    pub increments: AtomicUsize,
    pub inserts: AtomicUsize,
}

impl FlakyStore {
    pub fn handle() -> (Arc<Self>, StoreHandle) {
        let store = Arc::new(Self::default());
        let handle: StoreHandle = store.clone();
        (store, handle)
    }

    fn check(flag: &AtomicBool, op: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn atomic_increment(&self, counter_key: &str) -> StoreResult<u64> {
        tokio::task::yield_now().await;
        self.increments.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_increment, "increment")?;
        self.inner.atomic_increment(counter_key).await
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> StoreResult<RecordId> {
        tokio::task::yield_now().await;
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_insert, "insert")?;
        self.inner.insert(collection, body).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        tokio::task::yield_now().await;
        Self::check(&self.fail_reads, "read")?;
        self.inner.find_one(collection, filter).await
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        tokio::task::yield_now().await;
        Self::check(&self.fail_reads, "read")?;
        self.inner.find_many(collection, filter).await
    }

    async fn replace(
        &self,
        collection: &str,
        id: &RecordId,
        body: Map<String, Value>,
    ) -> StoreResult<bool> {
        tokio::task::yield_now().await;
        self.inner.replace(collection, id, body).await
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> StoreResult<bool> {
        tokio::task::yield_now().await;
        self.inner.remove(collection, id).await
    }

    async fn close(&self) -> StoreResult<()> {
        self.inner.close().await
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }
}

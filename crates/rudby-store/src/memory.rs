use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use rudby_types::RecordId;
use serde_json::{Map, Value};

use crate::document::{Document, Filter};
use crate::error::{StoreError, StoreResult};
use crate::state::StoreState;
use crate::traits::DurableStore;

/// In-memory durable store.
///
/// Intended for tests and embedding. All state lives behind one `RwLock`;
/// every operation takes the lock for a single synchronous critical section,
/// so a counter increment (including lazy creation) is indivisible.
pub struct InMemoryDurableStore {
    state: RwLock<StoreState>,
    open: AtomicBool,
}

impl InMemoryDurableStore {
    /// Create a new, open, empty store.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            open: AtomicBool::new(true),
        }
    }

    /// Current value of a counter, if it has been created.
    pub fn counter(&self, counter_key: &str) -> StoreResult<Option<u64>> {
        Ok(self.read_state()?.counter(counter_key))
    }

    /// Force a counter to a value, e.g. when importing an existing catalog.
    pub fn set_counter(&self, counter_key: &str, value: u64) -> StoreResult<()> {
        self.write_state()?.set_counter(counter_key, value);
        Ok(())
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> StoreResult<usize> {
        Ok(self.read_state()?.len(collection))
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    // `open` is checked while the guard is held; `close` flips it under the
    // write lock, so no operation succeeds once `close` has returned.

    fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        let guard = self
            .state
            .read()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        self.ensure_open()?;
        Ok(guard)
    }

    fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        let guard = self
            .state
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        self.ensure_open()?;
        Ok(guard)
    }
}

impl Default for InMemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn atomic_increment(&self, counter_key: &str) -> StoreResult<u64> {
        self.write_state()?.increment(counter_key)
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> StoreResult<RecordId> {
        Ok(self.write_state()?.insert(collection, body))
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        Ok(self.read_state()?.find_one(collection, filter))
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        Ok(self.read_state()?.find_many(collection, filter))
    }

    async fn replace(
        &self,
        collection: &str,
        id: &RecordId,
        body: Map<String, Value>,
    ) -> StoreResult<bool> {
        Ok(self.write_state()?.replace(collection, id, body))
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> StoreResult<bool> {
        Ok(self.write_state()?.remove(collection, id))
    }

    async fn close(&self) -> StoreResult<()> {
        let _state = self
            .state
            .write()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        if self.open.swap(false, Ordering::AcqRel) {
            tracing::debug!("in-memory store closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for InMemoryDurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDurableStore")
            .field("open", &self.is_open())
            .finish()
    }
}

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rudby_types::RecordId;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::document::{Document, Filter};
use crate::error::{StoreError, StoreResult};
use crate::state::StoreState;
use crate::traits::DurableStore;

/// Durable store that snapshots its whole state to a JSON file.
///
/// Every mutation rewrites the snapshot through a temporary file in the same
/// directory followed by an atomic rename, while still holding the state
/// lock. The file therefore always reflects a prefix of the operation
/// history, and a counter value that was handed out is never handed out
/// again after a restart.
///
/// Lock acquisition and snapshot I/O run on tokio's blocking pool, so an
/// fsync never stalls a runtime worker.
///
/// Suited to single-process deployments with modest catalogs; every write
/// costs a full snapshot.
pub struct FileDurableStore {
    inner: Arc<Shared>,
}

struct Shared {
    path: PathBuf,
    state: Mutex<StoreState>,
    open: AtomicBool,
}

impl Shared {
    /// Lock the state. `open` is checked under the lock, so nothing succeeds
    /// once `close` has returned.
    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
        if !self.open.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(guard)
    }

    /// Apply a mutation and persist the resulting state. The in-memory state
    /// only changes once the snapshot is on disk.
    fn mutate<T>(&self, op: impl FnOnce(&mut StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.lock()?;
        let mut next = state.clone();
        let out = op(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }

    fn persist(&self, state: &StoreState) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec(state).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }
}

impl FileDurableStore {
    /// Open (or create) the store backed by the file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreState::default(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), "file store opened");
        Ok(Self {
            inner: Arc::new(Shared {
                path,
                state: Mutex::new(state),
                open: AtomicBool::new(true),
            }),
        })
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Current value of a counter, if it has been created.
    pub async fn counter(&self, counter_key: &str) -> StoreResult<Option<u64>> {
        let key = counter_key.to_string();
        self.blocking(move |shared| Ok(shared.lock()?.counter(&key)))
            .await
    }

    /// Run `op` against the shared state on the blocking pool.
    async fn blocking<T>(
        &self,
        op: impl FnOnce(&Shared) -> StoreResult<T> + Send + 'static,
    ) -> StoreResult<T>
    where
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&shared))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl DurableStore for FileDurableStore {
    async fn atomic_increment(&self, counter_key: &str) -> StoreResult<u64> {
        let key = counter_key.to_string();
        self.blocking(move |shared| shared.mutate(|state| state.increment(&key)))
            .await
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> StoreResult<RecordId> {
        let collection = collection.to_string();
        self.blocking(move |shared| shared.mutate(|state| Ok(state.insert(&collection, body))))
            .await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.blocking(move |shared| Ok(shared.lock()?.find_one(&collection, &filter)))
            .await
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let collection = collection.to_string();
        let filter = filter.clone();
        self.blocking(move |shared| Ok(shared.lock()?.find_many(&collection, &filter)))
            .await
    }

    async fn replace(
        &self,
        collection: &str,
        id: &RecordId,
        body: Map<String, Value>,
    ) -> StoreResult<bool> {
        let collection = collection.to_string();
        let id = *id;
        self.blocking(move |shared| shared.mutate(|state| Ok(state.replace(&collection, &id, body))))
            .await
    }

    async fn remove(&self, collection: &str, id: &RecordId) -> StoreResult<bool> {
        let collection = collection.to_string();
        let id = *id;
        self.blocking(move |shared| shared.mutate(|state| Ok(state.remove(&collection, &id))))
            .await
    }

    async fn close(&self) -> StoreResult<()> {
        // Flip the flag under the state lock: in-flight operations finish
        // first, later ones see the store closed.
        let was_open = self
            .blocking(|shared| {
                let _state = shared
                    .state
                    .lock()
                    .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))?;
                Ok(shared.open.swap(false, Ordering::AcqRel))
            })
            .await?;
        if was_open {
            info!(path = %self.inner.path.display(), "file store closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for FileDurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDurableStore")
            .field("path", &self.inner.path)
            .field("open", &self.is_open())
            .finish()
    }
}

use chrono::Utc;
use rudby_store::{Document, Filter, StoreHandle};
use rudby_types::{CatalogRecord, PrincipalId, RecordDraft, RecordId, RecordPatch};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::allocator::SerialNumberAllocator;
use crate::error::{CatalogError, CatalogResult};

/// Collection catalog records live in.
pub const DEFAULT_COLLECTION: &str = "jewelleries";

/// Result of a delete. A missing record is an outcome, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    pub fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// CRUD over catalog records.
///
/// Every read goes to the durable store; nothing is cached between calls.
/// The store does no ownership checks of its own, callers go through
/// [`CatalogService`](crate::CatalogService) for that.
#[derive(Clone)]
pub struct RecordStore {
    store: StoreHandle,
    allocator: SerialNumberAllocator,
    collection: String,
}

impl RecordStore {
    /// Record store over the default collection and counter.
    pub fn new(store: StoreHandle) -> Self {
        let allocator = SerialNumberAllocator::new(store.clone());
        Self::with_allocator(store, allocator, DEFAULT_COLLECTION)
    }

    pub fn with_allocator(
        store: StoreHandle,
        allocator: SerialNumberAllocator,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            allocator,
            collection: collection.into(),
        }
    }

    pub fn allocator(&self) -> &SerialNumberAllocator {
        &self.allocator
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Close the underlying durable store. Every later call fails.
    pub async fn close(&self) -> CatalogResult<()> {
        self.store.close().await?;
        info!(collection = %self.collection, "record store closed");
        Ok(())
    }

    /// Create a record owned by `owner`.
    ///
    /// Exactly one serial number is allocated per call. If allocation fails
    /// (`StorageUnavailable` or `AllocationFailed`) nothing is written. If
    /// the insert fails afterwards, the serial stays consumed.
    pub async fn create(&self, draft: RecordDraft, owner: &PrincipalId) -> CatalogResult<CatalogRecord> {
        let draft = draft.sanitized();
        let serial_number = self.allocator.allocate().await?;
        let body = CatalogRecord::draft_body(serial_number, owner, &draft, Utc::now())?;

        let id = match self.store.insert(&self.collection, body.clone()).await {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    serial = %serial_number,
                    owner = %owner,
                    error = %e,
                    "insert failed after allocation; serial number is consumed"
                );
                return Err(CatalogError::StorageUnavailable(e));
            }
        };

        let record = CatalogRecord::from_document(id, body)?;
        info!(id = %record.id, serial = %record.serial_number, owner = %owner, "record created");
        Ok(record)
    }

    pub async fn get_by_id(&self, id: &RecordId) -> CatalogResult<Option<CatalogRecord>> {
        self.store
            .find_by_id(&self.collection, id)
            .await?
            .map(decode)
            .transpose()
    }

    /// Every record, in insertion order.
    pub async fn get_all(&self) -> CatalogResult<Vec<CatalogRecord>> {
        self.find_many(&Filter::all()).await
    }

    /// First record (in insertion order) whose type equals `kind`.
    pub async fn find_by_type(&self, kind: &str) -> CatalogResult<Option<CatalogRecord>> {
        self.find_first(&Filter::eq("type", kind)).await
    }

    /// First record (in insertion order) in collection `name`.
    pub async fn find_by_collection(&self, name: &str) -> CatalogResult<Option<CatalogRecord>> {
        self.find_first(&Filter::eq("collection", name)).await
    }

    /// Replace every mutable field of record `id` with `patch`.
    ///
    /// Re-reads the stored record first so the fixed fields come from the
    /// store, not from the caller. `NotFound` if the record is missing, also
    /// when it disappears between the read and the replace.
    pub async fn update(&self, id: &RecordId, patch: RecordPatch) -> CatalogResult<CatalogRecord> {
        let mut record = self.get_by_id(id).await?.ok_or(CatalogError::NotFound(*id))?;
        record.apply_patch(patch, Utc::now());

        let body = record.document_body()?;
        if !self.store.replace(&self.collection, id, body).await? {
            debug!(%id, "record vanished before replace");
            return Err(CatalogError::NotFound(*id));
        }
        info!(%id, serial = %record.serial_number, "record updated");
        Ok(record)
    }

    /// Remove record `id`. Idempotent.
    pub async fn delete(&self, id: &RecordId) -> CatalogResult<DeleteOutcome> {
        if self.store.remove(&self.collection, id).await? {
            info!(%id, "record deleted");
            Ok(DeleteOutcome::Deleted)
        } else {
            debug!(%id, "delete matched nothing");
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn find_first(&self, filter: &Filter) -> CatalogResult<Option<CatalogRecord>> {
        self.store
            .find_one(&self.collection, filter)
            .await?
            .map(decode)
            .transpose()
    }

    async fn find_many(&self, filter: &Filter) -> CatalogResult<Vec<CatalogRecord>> {
        self.store
            .find_many(&self.collection, filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("collection", &self.collection)
            .field("allocator", &self.allocator)
            .finish()
    }
}

fn decode(document: Document) -> CatalogResult<CatalogRecord> {
    Ok(CatalogRecord::from_document(document.id, document.body)?)
}

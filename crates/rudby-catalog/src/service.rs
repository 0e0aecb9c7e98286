use rudby_gate::{AccessAction, AccessDecision, GateConfig, OwnershipGate};
use rudby_store::StoreHandle;
use rudby_types::{CatalogRecord, PrincipalId, RecordDraft, RecordId, RecordPatch};
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::records::{DeleteOutcome, RecordStore};

/// The catalog as callers see it: record operations on behalf of an
/// authenticated principal, with every single-record access gated on
/// ownership.
///
/// Single-record operations fetch first, authorize against what was just
/// read, and only then return or mutate. With `conceal_denied` set, a
/// denial takes exactly the path a miss would: the same error or outcome,
/// carrying only what the caller supplied.
pub struct CatalogService {
    records: RecordStore,
    gate: OwnershipGate,
}

impl CatalogService {
    pub fn new(records: RecordStore, gate: OwnershipGate) -> Self {
        Self { records, gate }
    }

    /// Service over the default collection and counter with the default gate
    /// pipeline.
    pub fn with_store(store: StoreHandle, config: GateConfig) -> Self {
        Self::new(
            RecordStore::new(store),
            OwnershipGate::with_default_stages(config),
        )
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn gate(&self) -> &OwnershipGate {
        &self.gate
    }

    /// Create a record owned by `caller`.
    pub async fn create(&self, caller: &PrincipalId, draft: RecordDraft) -> CatalogResult<CatalogRecord> {
        debug!(%caller, "create");
        self.records.create(draft, caller).await
    }

    /// Read one record. `NotFound` if it does not exist.
    pub async fn get(&self, caller: &PrincipalId, id: &RecordId) -> CatalogResult<CatalogRecord> {
        debug!(%caller, %id, "get");
        let record = self
            .records
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(*id))?;
        if !self.check(caller, &record, AccessAction::Read)? {
            return Err(CatalogError::NotFound(*id));
        }
        Ok(record)
    }

    /// Bulk listing, filtered by the configured listing scope.
    pub async fn list(&self, caller: &PrincipalId) -> CatalogResult<Vec<CatalogRecord>> {
        let mut records = self.records.get_all().await?;
        records.retain(|record| self.gate.admits_in_listing(caller, record));
        debug!(%caller, count = records.len(), "list");
        Ok(records)
    }

    /// First record of type `kind`, if the caller may read it.
    pub async fn find_by_type(&self, caller: &PrincipalId, kind: &str) -> CatalogResult<Option<CatalogRecord>> {
        debug!(%caller, kind, "find by type");
        let found = self.records.find_by_type(kind).await?;
        self.check_found(caller, found)
    }

    /// First record in collection `name`, if the caller may read it.
    pub async fn find_by_collection(
        &self,
        caller: &PrincipalId,
        name: &str,
    ) -> CatalogResult<Option<CatalogRecord>> {
        debug!(%caller, collection = name, "find by collection");
        let found = self.records.find_by_collection(name).await?;
        self.check_found(caller, found)
    }

    /// Replace the mutable fields of a record the caller owns.
    pub async fn update(
        &self,
        caller: &PrincipalId,
        id: &RecordId,
        patch: RecordPatch,
    ) -> CatalogResult<CatalogRecord> {
        debug!(%caller, %id, "update");
        let record = self
            .records
            .get_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound(*id))?;
        if !self.check(caller, &record, AccessAction::Update)? {
            return Err(CatalogError::NotFound(*id));
        }
        self.records.update(id, patch).await
    }

    /// Delete a record the caller owns. A missing record is
    /// [`DeleteOutcome::NotFound`].
    pub async fn delete(&self, caller: &PrincipalId, id: &RecordId) -> CatalogResult<DeleteOutcome> {
        debug!(%caller, %id, "delete");
        let Some(record) = self.records.get_by_id(id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };
        if !self.check(caller, &record, AccessAction::Delete)? {
            return Ok(DeleteOutcome::NotFound);
        }
        self.records.delete(id).await
    }

    /// Close the underlying store.
    pub async fn shutdown(&self) -> CatalogResult<()> {
        self.records.close().await
    }

    fn check_found(
        &self,
        caller: &PrincipalId,
        found: Option<CatalogRecord>,
    ) -> CatalogResult<Option<CatalogRecord>> {
        let Some(record) = found else {
            return Ok(None);
        };
        if self.check(caller, &record, AccessAction::Read)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// `Ok(true)` when the gate allows `action`. A denial is `AccessDenied`,
    /// or `Ok(false)` when denials are concealed and the caller should see
    /// a miss instead.
    fn check(&self, caller: &PrincipalId, record: &CatalogRecord, action: AccessAction) -> CatalogResult<bool> {
        let result = self.gate.authorize(caller, record, action)?;
        match result.decision {
            AccessDecision::Allowed => Ok(true),
            AccessDecision::Denied { reason } => {
                warn!(
                    %caller,
                    id = %record.id,
                    serial = %record.serial_number,
                    %action,
                    reason = %reason,
                    "access denied"
                );
                if self.gate.config().conceal_denied {
                    Ok(false)
                } else {
                    Err(CatalogError::AccessDenied {
                        caller: caller.clone(),
                        record: record.id,
                        action,
                    })
                }
            }
        }
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("records", &self.records)
            .field("gate_stages", &self.gate.stage_count())
            .field("gate_config", self.gate.config())
            .finish()
    }
}

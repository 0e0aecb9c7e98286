use rudby_gate::{AccessAction, GateError};
use rudby_store::StoreError;
use rudby_types::{PrincipalId, RecordId, TypeError};

/// Errors surfaced by the catalog core.
///
/// Every failure reaches the caller unchanged in kind. Nothing is retried
/// here and nothing is replaced by a default value.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The durable store is unreachable or failed the operation.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] StoreError),

    /// No record with this id exists (or, with concealment on, the caller
    /// may not know that it does).
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The ownership gate rejected the caller.
    #[error("access denied: {caller} may not {action} record {record}")]
    AccessDenied {
        caller: PrincipalId,
        record: RecordId,
        action: AccessAction,
    },

    /// The store answered but the serial counter cannot yield a valid next
    /// value (exhausted, or a zero from a misbehaving backend). No record
    /// was written.
    #[error("serial number allocation failed: {0}")]
    AllocationFailed(#[source] StoreError),

    /// The gate could not reach a decision.
    #[error("gate error: {0}")]
    Gate(#[from] GateError),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        Self::StorageUnavailable(e)
    }
}

impl From<TypeError> for CatalogError {
    fn from(e: TypeError) -> Self {
        Self::StorageUnavailable(StoreError::Serialization(e.to_string()))
    }
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

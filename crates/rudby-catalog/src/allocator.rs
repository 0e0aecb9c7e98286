use rudby_store::{StoreError, StoreHandle};
use rudby_types::SerialNumber;
use tracing::{debug, warn};

use crate::error::{CatalogError, CatalogResult};

/// Counter key the catalog's serial numbers are drawn from.
pub const DEFAULT_COUNTER_KEY: &str = "jewellery.serial_number";

/// Hands out catalog serial numbers.
///
/// Allocation is a single `atomic_increment` against the durable store:
/// read-and-advance happens in one indivisible step on the store's side, so
/// concurrent allocators never see the same value and the counter's lazy
/// creation cannot race. Nothing is cached in process.
///
/// A serial handed out here is consumed even if the caller later fails to
/// use it. Gaps are possible; duplicates are not.
#[derive(Clone)]
pub struct SerialNumberAllocator {
    store: StoreHandle,
    counter_key: String,
}

impl SerialNumberAllocator {
    pub fn new(store: StoreHandle) -> Self {
        Self::with_counter_key(store, DEFAULT_COUNTER_KEY)
    }

    pub fn with_counter_key(store: StoreHandle, counter_key: impl Into<String>) -> Self {
        Self {
            store,
            counter_key: counter_key.into(),
        }
    }

    pub fn counter_key(&self) -> &str {
        &self.counter_key
    }

    /// Allocate the next serial number.
    ///
    /// The first allocation on a fresh store returns 1; a counter at `k`
    /// yields `k + 1`. An unreachable store is `StorageUnavailable`; a
    /// counter that cannot produce a valid serial is `AllocationFailed`.
    pub async fn allocate(&self) -> CatalogResult<SerialNumber> {
        match self.store.atomic_increment(&self.counter_key).await {
            // A conforming store never yields 0; refuse rather than hand it out.
            Ok(0) => Err(CatalogError::AllocationFailed(StoreError::Unavailable(format!(
                "counter '{}' returned 0",
                self.counter_key
            )))),
            Ok(value) => {
                debug!(counter = %self.counter_key, serial = value, "serial number allocated");
                Ok(SerialNumber::new(value))
            }
            Err(e @ StoreError::CounterOverflow(_)) => {
                warn!(counter = %self.counter_key, error = %e, "serial number allocation failed");
                Err(CatalogError::AllocationFailed(e))
            }
            Err(e) => {
                warn!(counter = %self.counter_key, error = %e, "store unavailable during allocation");
                Err(CatalogError::StorageUnavailable(e))
            }
        }
    }
}

impl std::fmt::Debug for SerialNumberAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialNumberAllocator")
            .field("counter_key", &self.counter_key)
            .finish()
    }
}

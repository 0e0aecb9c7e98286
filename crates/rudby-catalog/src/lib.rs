//! Catalog core for Rudby.
//!
//! Three layers, each usable on its own:
//!
//! - [`SerialNumberAllocator`]: hands out unique serial numbers from one
//!   persistent counter through the store's atomic increment.
//! - [`RecordStore`]: create, read, query, update and delete catalog records.
//! - [`CatalogService`]: the record store behind the ownership gate, acting
//!   on behalf of an authenticated principal.
//!
//! All three share one [`StoreHandle`](rudby_store::StoreHandle), constructed
//! by the caller and closed through [`CatalogService::shutdown`].

pub mod allocator;
pub mod error;
pub mod records;
pub mod service;

#[cfg(test)]
mod testing;

// Re-exports for convenience.
pub use allocator::{SerialNumberAllocator, DEFAULT_COUNTER_KEY};
pub use error::{CatalogError, CatalogResult};
pub use records::{DeleteOutcome, RecordStore, DEFAULT_COLLECTION};
pub use service::CatalogService;

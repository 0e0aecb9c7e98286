//! Foundation types for Rudby.
//!
//! Every other Rudby crate depends on `rudby-types`. The types here carry no
//! behaviour beyond construction, parsing and serialization; allocation,
//! persistence and authorization live in their own crates.
//!
//! # Key Types
//!
//! - [`PrincipalId`]: opaque identity of an authenticated caller
//! - [`RecordId`]: UUID v7 identity assigned to a stored document
//! - [`SerialNumber`]: catalog serial drawn from the single counter
//! - [`CatalogRecord`]: a persisted jewellery item
//! - [`RecordDraft`] / [`RecordPatch`]: caller-supplied record fields

pub mod error;
pub mod identity;
pub mod record;

pub use error::TypeError;
pub use identity::{PrincipalId, RecordId, SerialNumber};
pub use record::{CatalogRecord, RecordDraft, RecordPatch, RESERVED_FIELDS};

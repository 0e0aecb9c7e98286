//! Ownership gate for Rudby.
//!
//! Every single-record read, update or delete passes through the gate after
//! the record has been fetched and before its contents are returned or a
//! mutation is applied. The gate runs a small pipeline of stages and produces
//! an allow/deny decision together with the per-stage trail.
//!
//! # Quick Start
//!
//! ```rust
//! use rudby_gate::{AccessAction, GateConfig, OwnershipGate};
//! use rudby_types::{CatalogRecord, PrincipalId, RecordDraft, RecordId, SerialNumber};
//!
//! let owner = PrincipalId::new("alice");
//! let draft = RecordDraft::new("ring", "Aurora");
//! let body = CatalogRecord::draft_body(SerialNumber::new(1), &owner, &draft, chrono::Utc::now())
//!     .unwrap();
//! let record = CatalogRecord::from_document(RecordId::new(), body).unwrap();
//!
//! let gate = OwnershipGate::with_default_stages(GateConfig::default());
//! assert!(gate.authorize(&owner, &record, AccessAction::Read).unwrap().is_allowed());
//! let intruder = PrincipalId::new("bob");
//! assert!(!gate.authorize(&intruder, &record, AccessAction::Delete).unwrap().is_allowed());
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod stage;
pub mod stages;

// Re-exports for convenience.
pub use config::{GateConfig, ListingScope};
pub use error::GateError;
pub use gate::{AccessDecision, GateResult, OwnershipGate};
pub use stage::{AccessAction, AccessRequest, GateStage, StageDecision, StageResult};
pub use stages::ownership::OwnershipStage;
pub use stages::principal::PrincipalStage;

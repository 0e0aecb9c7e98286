//! Durable document storage for Rudby.
//!
//! The catalog core never talks to a database directly. It consumes the
//! [`DurableStore`] contract: named atomic counters plus CRUD over named
//! collections of JSON documents.
//!
//! # Storage Backends
//!
//! - [`InMemoryDurableStore`] -- lock-protected maps for tests and embedding
//! - [`FileDurableStore`] -- the same state, snapshotted to a JSON file
//!   after every mutation
//!
//! # Design Rules
//!
//! 1. `atomic_increment` is one indivisible read-and-advance. A missing
//!    counter is created inside the same critical section.
//! 2. No lock is held across an `.await`.
//! 3. Every store has an explicit lifecycle: constructing it opens it,
//!    [`DurableStore::close`] tears it down, and later calls fail with
//!    [`StoreError::Closed`].
//! 4. The store never interprets document bodies beyond filter matching.

pub mod document;
pub mod error;
pub mod file;
pub mod memory;
mod state;
pub mod traits;

pub use document::{Document, Filter};
pub use error::{StoreError, StoreResult};
pub use file::FileDurableStore;
pub use memory::InMemoryDurableStore;
pub use traits::{DurableStore, StoreHandle};

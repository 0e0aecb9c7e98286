use std::fmt;
use std::time::Duration;

use rudby_types::{CatalogRecord, PrincipalId};
use serde::{Deserialize, Serialize};

use crate::error::GateError;

// ---------------------------------------------------------------------------
// AccessAction
// ---------------------------------------------------------------------------

/// What the caller wants to do with a single record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    Read,
    Update,
    Delete,
}

impl AccessAction {
    pub const ALL: [AccessAction; 3] = [Self::Read, Self::Update, Self::Delete];
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

// ---------------------------------------------------------------------------
// AccessRequest
// ---------------------------------------------------------------------------

/// One access check: a caller, a freshly fetched record, and an action.
#[derive(Clone, Copy, Debug)]
pub struct AccessRequest<'a> {
    pub caller: &'a PrincipalId,
    pub record: &'a CatalogRecord,
    pub action: AccessAction,
}

impl<'a> AccessRequest<'a> {
    pub fn new(caller: &'a PrincipalId, record: &'a CatalogRecord, action: AccessAction) -> Self {
        Self {
            caller,
            record,
            action,
        }
    }
}

// ---------------------------------------------------------------------------
// StageDecision
// ---------------------------------------------------------------------------

/// The outcome of a single gate stage evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageDecision {
    /// The stage passed; proceed to the next stage.
    Pass,
    /// The stage failed; access is denied.
    Fail { reason: String },
}

impl StageDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ---------------------------------------------------------------------------
// StageResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed stage evaluation.
#[derive(Clone, Debug)]
pub struct StageResult {
    /// Name of the stage that produced this result.
    pub stage_name: String,
    /// Whether the stage passed.
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    /// Wall-clock time the stage took to evaluate.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// GateStage trait
// ---------------------------------------------------------------------------

/// A single evaluation stage in the gate pipeline.
///
/// Stages are evaluated in order and must be stateless: every decision is
/// derived from the request alone, never from earlier requests.
///
/// The trait is object-safe and `Send + Sync` so stages can be stored in
/// a `Vec<Box<dyn GateStage>>`.
pub trait GateStage: Send + Sync {
    /// Human-readable name of this stage (e.g., "principal", "ownership").
    fn name(&self) -> &str;

    /// Evaluate the request and return a decision.
    fn evaluate(&self, request: &AccessRequest<'_>) -> Result<StageDecision, GateError>;
}

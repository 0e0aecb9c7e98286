use std::time::{Duration, Instant};

use rudby_types::{CatalogRecord, PrincipalId};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::stage::{AccessAction, AccessRequest, GateStage, StageDecision, StageResult};
use crate::stages::{OwnershipStage, PrincipalStage};

// ---------------------------------------------------------------------------
// AccessDecision / GateResult
// ---------------------------------------------------------------------------

/// Final answer of the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied { reason: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// The outcome of running one access request through the pipeline.
#[derive(Clone, Debug)]
pub struct GateResult {
    pub decision: AccessDecision,
    /// Per-stage results in evaluation order.
    pub stage_results: Vec<StageResult>,
    /// Total wall-clock time for the pipeline evaluation.
    pub elapsed: Duration,
}

impl GateResult {
    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }
}

// ---------------------------------------------------------------------------
// OwnershipGate
// ---------------------------------------------------------------------------

/// The ownership gate: a fail-fast pipeline of stages that every
/// single-record read or mutation passes through after the record is fetched
/// and before its contents are returned or changed.
///
/// The gate holds no per-request state. Each call is decided from the record
/// handed in, which the caller must have just read from the store.
pub struct OwnershipGate {
    stages: Vec<Box<dyn GateStage>>,
    config: GateConfig,
}

impl OwnershipGate {
    /// Create a gate with an empty pipeline.
    ///
    /// An empty pipeline allows everything; use [`Self::with_default_stages`]
    /// for the standard checks.
    pub fn new(config: GateConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Create a gate with the default pipeline: Principal -> Ownership
    pub fn with_default_stages(config: GateConfig) -> Self {
        let mut gate = Self::new(config);
        gate.add_stage(Box::new(PrincipalStage));
        gate.add_stage(Box::new(OwnershipStage));
        gate
    }

    /// Append a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.stages.push(stage);
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Decide whether `caller` may perform `action` on `record`.
    ///
    /// Fail-fast: the first failing stage stops evaluation and produces a
    /// `Denied` decision.
    pub fn authorize(
        &self,
        caller: &PrincipalId,
        record: &CatalogRecord,
        action: AccessAction,
    ) -> Result<GateResult, GateError> {
        let pipeline_start = Instant::now();
        let request = AccessRequest::new(caller, record, action);
        let mut stage_results = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_start = Instant::now();
            let decision = stage.evaluate(&request)?;
            let elapsed = stage_start.elapsed();

            let reason = match &decision {
                StageDecision::Pass => None,
                StageDecision::Fail { reason } => Some(reason.clone()),
            };
            stage_results.push(StageResult {
                stage_name: stage.name().to_string(),
                passed: decision.is_pass(),
                reason,
                elapsed,
            });

            if let StageDecision::Fail { reason } = decision {
                tracing::debug!(
                    stage = stage.name(),
                    caller = %caller,
                    record = %record.id,
                    %action,
                    "access denied"
                );
                return Ok(GateResult {
                    decision: AccessDecision::Denied { reason },
                    stage_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(GateResult {
            decision: AccessDecision::Allowed,
            stage_results,
            elapsed: pipeline_start.elapsed(),
        })
    }

    /// Whether `record` belongs in a listing requested by `caller`, per the
    /// configured [`ListingScope`](crate::ListingScope).
    pub fn admits_in_listing(&self, caller: &PrincipalId, record: &CatalogRecord) -> bool {
        self.config.listing.admits(caller, record)
    }
}

impl Default for OwnershipGate {
    fn default() -> Self {
        Self::with_default_stages(GateConfig::default())
    }
}

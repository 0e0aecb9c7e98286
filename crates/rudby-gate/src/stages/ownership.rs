use crate::error::GateError;
use crate::stage::{AccessRequest, GateStage, StageDecision};

/// Ownership stage.
///
/// Passes iff the caller is the record's owner. The same rule applies to
/// every action; there is no read-only sharing.
pub struct OwnershipStage;

impl GateStage for OwnershipStage {
    fn name(&self) -> &str {
        "ownership"
    }

    fn evaluate(&self, request: &AccessRequest<'_>) -> Result<StageDecision, GateError> {
        if *request.caller == request.record.owner_id {
            return Ok(StageDecision::Pass);
        }
        Ok(StageDecision::Fail {
            reason: format!(
                "{} may not {} record {}: owned by another principal",
                request.caller, request.action, request.record.id
            ),
        })
    }
}

use crate::error::GateError;
use crate::stage::{AccessRequest, GateStage, StageDecision};

/// Principal sanity stage.
///
/// A blank caller id never identifies anyone. Rejecting it up front keeps a
/// record that was somehow stored with a blank owner from matching an
/// unauthenticated caller.
pub struct PrincipalStage;

impl GateStage for PrincipalStage {
    fn name(&self) -> &str {
        "principal"
    }

    fn evaluate(&self, request: &AccessRequest<'_>) -> Result<StageDecision, GateError> {
        if request.caller.is_blank() {
            return Ok(StageDecision::Fail {
                reason: "caller identity must not be blank".into(),
            });
        }
        Ok(StageDecision::Pass)
    }
}

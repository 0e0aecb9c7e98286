use std::fmt;

/// Errors that can occur during gate evaluation.
///
/// A denial is not an error: it is reported through
/// [`AccessDecision::Denied`](crate::AccessDecision::Denied). These errors mean
/// the gate itself could not reach a decision.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A stage returned an unexpected error.
    #[error("stage error in '{stage}': {message}")]
    StageError { stage: String, message: String },
}

impl GateError {
    /// Create a stage error with a name and message.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StageError {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl PartialEq for GateError {
    fn eq(&self, other: &Self) -> bool {
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for GateError {}

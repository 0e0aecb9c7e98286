use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid record id: {0}")]
    InvalidRecordId(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors from durable store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store was closed; no further operations are accepted.
    #[error("store is closed")]
    Closed,

    /// The backend cannot serve requests (poisoned lock, lost connection).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A counter reached `u64::MAX` and cannot advance.
    #[error("counter '{0}' overflowed")]
    CounterOverflow(String),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

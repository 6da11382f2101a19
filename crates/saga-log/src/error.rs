use common::SagaId;
use thiserror::Error;

/// Errors that can occur when interacting with the saga log.
#[derive(Debug, Error)]
pub enum SagaLogError {
    /// The backing store is unreachable. Appends must surface this rather
    /// than silently dropping the entry.
    #[error("saga log storage unavailable: {0}")]
    StorageUnavailable(String),

    /// No saga-level summary entry exists for the given saga.
    #[error("no saga-level entry for saga {0}")]
    NoSagaEntry(SagaId),
}

impl From<sqlx::Error> for SagaLogError {
    fn from(err: sqlx::Error) -> Self {
        SagaLogError::StorageUnavailable(err.to_string())
    }
}

/// Result type for saga log operations.
pub type Result<T> = std::result::Result<T, SagaLogError>;

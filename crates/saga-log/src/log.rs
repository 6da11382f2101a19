//! The saga log contract.

use async_trait::async_trait;
use common::SagaId;

use crate::entry::LogEntry;
use crate::error::Result;

/// Shared, concurrently-appended record of saga state transitions.
///
/// Appends are individually atomic: concurrent sagas never interleave
/// within a single entry, and entries of one saga come back from
/// [`find_by_saga_id`](SagaLog::find_by_saga_id) in insertion order. No
/// ordering across sagas is promised.
#[async_trait]
pub trait SagaLog: Send + Sync {
    /// Appends one entry. Fails with
    /// [`StorageUnavailable`](crate::SagaLogError::StorageUnavailable) if
    /// the backing store is unreachable; the entry is never dropped
    /// silently.
    async fn append(&self, entry: LogEntry) -> Result<()>;

    /// Returns all entries for a saga in insertion order.
    async fn find_by_saga_id(&self, saga_id: SagaId) -> Result<Vec<LogEntry>>;

    /// Rewrites the state of the saga-level summary entry.
    ///
    /// This deliberately breaks strict append-only semantics for exactly
    /// one record per saga: the summary entry appended when the saga run
    /// starts acts as a mutable "current status" row layered on top of the
    /// immutable step history.
    async fn update_latest_state(&self, saga_id: SagaId, new_state: &str) -> Result<()>;
}

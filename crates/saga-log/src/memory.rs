use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::SagaId;
use tokio::sync::RwLock;

use crate::entry::LogEntry;
use crate::error::{Result, SagaLogError};
use crate::log::SagaLog;

/// In-memory saga log for tests and the demo server.
///
/// Provides the same interface as the PostgreSQL implementation. The
/// `set_fail_appends` toggle simulates a storage outage so callers can
/// exercise their degraded-logging path.
#[derive(Clone, Default)]
pub struct InMemorySagaLog {
    entries: Arc<RwLock<Vec<LogEntry>>>,
    fail_appends: Arc<AtomicBool>,
}

impl InMemorySagaLog {
    /// Creates a new empty in-memory log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures all subsequent appends and updates to fail as if the
    /// backing store were unreachable.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Returns the total number of entries stored.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Clears all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    fn unavailable(&self) -> bool {
        self.fail_appends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SagaLog for InMemorySagaLog {
    async fn append(&self, entry: LogEntry) -> Result<()> {
        if self.unavailable() {
            return Err(SagaLogError::StorageUnavailable(
                "simulated outage".to_string(),
            ));
        }
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn find_by_saga_id(&self, saga_id: SagaId) -> Result<Vec<LogEntry>> {
        if self.unavailable() {
            return Err(SagaLogError::StorageUnavailable(
                "simulated outage".to_string(),
            ));
        }
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.saga_id == saga_id)
            .cloned()
            .collect())
    }

    async fn update_latest_state(&self, saga_id: SagaId, new_state: &str) -> Result<()> {
        if self.unavailable() {
            return Err(SagaLogError::StorageUnavailable(
                "simulated outage".to_string(),
            ));
        }
        let mut entries = self.entries.write().await;
        match entries
            .iter_mut()
            .find(|e| e.saga_id == saga_id && e.is_saga_entry())
        {
            Some(entry) => {
                entry.state = new_state.to_string();
                Ok(())
            }
            None => Err(SagaLogError::NoSagaEntry(saga_id)),
        }
    }
}

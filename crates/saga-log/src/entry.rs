//! Log entry types.

use chrono::{DateTime, Utc};
use common::SagaId;
use serde::{Deserialize, Serialize};

/// What a log entry describes: the saga as a whole, or one named step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Subject {
    /// The saga-level summary record.
    Saga,
    /// A single step, identified by its name.
    Step(String),
}

/// One recorded state transition.
///
/// Insertion order is causal order for entries of the same saga; no
/// ordering is guaranteed between entries of different sagas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// The saga this entry belongs to.
    pub saga_id: SagaId,
    /// The saga itself or a step name.
    pub subject: Subject,
    /// The state the subject transitioned to.
    pub state: String,
    /// When the transition was recorded.
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Creates a saga-level entry.
    pub fn saga(saga_id: SagaId, state: impl Into<String>) -> Self {
        Self {
            saga_id,
            subject: Subject::Saga,
            state: state.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a step-level entry.
    pub fn step(saga_id: SagaId, step_name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            saga_id,
            subject: Subject::Step(step_name.into()),
            state: state.into(),
            timestamp: Utc::now(),
        }
    }

    /// Returns the step name, if this is a step-level entry.
    pub fn step_name(&self) -> Option<&str> {
        match &self.subject {
            Subject::Saga => None,
            Subject::Step(name) => Some(name),
        }
    }

    /// Returns true if this is the saga-level summary entry.
    pub fn is_saga_entry(&self) -> bool {
        self.subject == Subject::Saga
    }
}

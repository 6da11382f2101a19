//! Step and saga state machines.

use serde::{Deserialize, Serialize};

/// The state of a single saga step.
///
/// State transitions:
/// ```text
/// Created ──► Running ──┬──► Succeeded ──┬──► Compensated
///                       │                └──► CompensationFailed
///                       └──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StepStatus {
    /// Step has not started yet.
    #[default]
    Created,

    /// The action is executing.
    Running,

    /// The action completed successfully.
    Succeeded,

    /// The action was rejected or could not be completed.
    Failed,

    /// The compensation undid a previously succeeded action.
    Compensated,

    /// The compensation itself failed; the remote side is left
    /// inconsistent and requires operator attention.
    CompensationFailed,
}

impl StepStatus {
    /// Returns true if the action may still run.
    pub fn can_run(&self) -> bool {
        matches!(self, StepStatus::Created)
    }

    /// Returns true if the compensation may run.
    pub fn can_compensate(&self) -> bool {
        matches!(self, StepStatus::Succeeded)
    }

    /// Returns true if no further transition occurs for this step.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepStatus::Created | StepStatus::Running)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Created => "Created",
            StepStatus::Running => "Running",
            StepStatus::Succeeded => "Succeeded",
            StepStatus::Failed => "Failed",
            StepStatus::Compensated => "Compensated",
            StepStatus::CompensationFailed => "CompensationFailed",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The state of a saga in its lifecycle.
///
/// Transitions monotonically: `Created ──► Running ──► {Succeeded | Failed}`.
/// Once terminal, a saga instance cannot be re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaStatus {
    /// Saga has not started yet.
    #[default]
    Created,

    /// Saga steps are being executed or compensated.
    Running,

    /// Every step succeeded (terminal state).
    Succeeded,

    /// At least one step failed, regardless of compensation outcome
    /// (terminal state).
    Failed,
}

impl SagaStatus {
    /// Returns true if the saga can begin running.
    pub fn can_run(&self) -> bool {
        matches!(self, SagaStatus::Created)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaStatus::Succeeded | SagaStatus::Failed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::Created => "Created",
            SagaStatus::Running => "Running",
            SagaStatus::Succeeded => "Succeeded",
            SagaStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_statuses_are_created() {
        assert_eq!(StepStatus::default(), StepStatus::Created);
        assert_eq!(SagaStatus::default(), SagaStatus::Created);
    }

    #[test]
    fn step_can_run_only_from_created() {
        assert!(StepStatus::Created.can_run());
        assert!(!StepStatus::Running.can_run());
        assert!(!StepStatus::Succeeded.can_run());
        assert!(!StepStatus::Failed.can_run());
        assert!(!StepStatus::Compensated.can_run());
        assert!(!StepStatus::CompensationFailed.can_run());
    }

    #[test]
    fn step_can_compensate_only_from_succeeded() {
        assert!(StepStatus::Succeeded.can_compensate());
        assert!(!StepStatus::Created.can_compensate());
        assert!(!StepStatus::Running.can_compensate());
        assert!(!StepStatus::Failed.can_compensate());
        assert!(!StepStatus::Compensated.can_compensate());
        assert!(!StepStatus::CompensationFailed.can_compensate());
    }

    #[test]
    fn step_terminal_states() {
        assert!(!StepStatus::Created.is_terminal());
        assert!(!StepStatus::Running.is_terminal());
        assert!(StepStatus::Succeeded.is_terminal());
        assert!(StepStatus::Failed.is_terminal());
        assert!(StepStatus::Compensated.is_terminal());
        assert!(StepStatus::CompensationFailed.is_terminal());
    }

    #[test]
    fn saga_can_run_only_from_created() {
        assert!(SagaStatus::Created.can_run());
        assert!(!SagaStatus::Running.can_run());
        assert!(!SagaStatus::Succeeded.can_run());
        assert!(!SagaStatus::Failed.can_run());
    }

    #[test]
    fn saga_terminal_states() {
        assert!(!SagaStatus::Created.is_terminal());
        assert!(!SagaStatus::Running.is_terminal());
        assert!(SagaStatus::Succeeded.is_terminal());
        assert!(SagaStatus::Failed.is_terminal());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(StepStatus::CompensationFailed.to_string(), "CompensationFailed");
        assert_eq!(SagaStatus::Succeeded.to_string(), "Succeeded");
    }

    #[test]
    fn status_serialization_roundtrip() {
        let status = StepStatus::Compensated;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: StepStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}

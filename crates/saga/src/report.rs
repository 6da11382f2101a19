//! Caller-facing outcome of a saga run.

use std::collections::BTreeMap;

use common::SagaId;
use serde::{Deserialize, Serialize};

use crate::status::{SagaStatus, StepStatus};

/// Terminal outcome of one step, shaped for error rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// The step name.
    pub name: String,
    /// The step's terminal status (or `Created` if it never started).
    pub status: StepStatus,
    /// Why the step failed, if it did.
    pub failure: Option<String>,
}

/// Outcome of one saga run.
///
/// Produced once the saga reaches a terminal status; the caller maps it
/// to a user-facing result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaReport {
    /// The saga this report describes.
    pub saga_id: SagaId,
    /// The saga's terminal status.
    pub status: SagaStatus,
    /// Per-step outcomes in declared order.
    pub steps: Vec<StepReport>,
    /// True if one or more audit log writes failed; the trail may be
    /// incomplete.
    pub log_degraded: bool,
}

impl SagaReport {
    /// Returns true if every step succeeded.
    pub fn succeeded(&self) -> bool {
        self.status == SagaStatus::Succeeded
    }

    /// Returns the `{step name: terminal status}` map for error bodies.
    pub fn step_statuses(&self) -> BTreeMap<String, StepStatus> {
        self.steps
            .iter()
            .map(|step| (step.name.clone(), step.status))
            .collect()
    }

    /// Returns the names of steps whose compensation failed. A non-empty
    /// result means remote state was actually left inconsistent and
    /// requires operator attention.
    pub fn compensation_failures(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|step| step.status == StepStatus::CompensationFailed)
            .map(|step| step.name.as_str())
            .collect()
    }

    /// Returns true if any step's compensation failed.
    pub fn has_compensation_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|step| step.status == StepStatus::CompensationFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with(statuses: &[(&str, StepStatus)]) -> SagaReport {
        SagaReport {
            saga_id: SagaId::new(),
            status: SagaStatus::Failed,
            steps: statuses
                .iter()
                .map(|(name, status)| StepReport {
                    name: name.to_string(),
                    status: *status,
                    failure: None,
                })
                .collect(),
            log_degraded: false,
        }
    }

    #[test]
    fn step_statuses_map() {
        let report = report_with(&[
            ("Decrease a", StepStatus::Compensated),
            ("Decrease b", StepStatus::Failed),
            ("Payment", StepStatus::Created),
        ]);

        let map = report.step_statuses();
        assert_eq!(map.len(), 3);
        assert_eq!(map["Decrease a"], StepStatus::Compensated);
        assert_eq!(map["Decrease b"], StepStatus::Failed);
        assert_eq!(map["Payment"], StepStatus::Created);
    }

    #[test]
    fn compensation_failures_are_surfaced() {
        let report = report_with(&[
            ("Decrease a", StepStatus::CompensationFailed),
            ("Decrease b", StepStatus::Failed),
        ]);

        assert!(report.has_compensation_failures());
        assert_eq!(report.compensation_failures(), vec!["Decrease a"]);
        assert!(!report.succeeded());
    }

    #[test]
    fn report_serialization_roundtrip() {
        let report = report_with(&[("Payment", StepStatus::Succeeded)]);
        let json = serde_json::to_string(&report).unwrap();
        let deserialized: SagaReport = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.steps.len(), 1);
        assert_eq!(deserialized.status, SagaStatus::Failed);
    }
}

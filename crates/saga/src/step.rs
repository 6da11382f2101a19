//! Saga step: one action paired with its compensation.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::invoker::Invoker;
use crate::status::StepStatus;

/// A named unit of saga work.
///
/// The action runs at most once; the compensation runs at most once and
/// only after the action reached `Succeeded`. The step records why it
/// failed so the caller can render a per-step error map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    name: String,
    action: Command,
    compensation: Command,
    status: StepStatus,
    failure: Option<String>,
    pub(crate) phase: usize,
}

impl Step {
    /// Creates a step in the `Created` state.
    pub fn new(name: impl Into<String>, action: Command, compensation: Command) -> Self {
        Self {
            name: name.into(),
            action,
            compensation,
            status: StepStatus::Created,
            failure: None,
            phase: 0,
        }
    }

    /// Returns the step name, unique within its saga.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current status.
    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Returns the recorded failure reason, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Returns the action command.
    pub fn action(&self) -> &Command {
        &self.action
    }

    /// Returns the compensation command.
    pub fn compensation(&self) -> &Command {
        &self.compensation
    }

    /// Executes the action exactly once.
    ///
    /// A business rejection and a transport error both end in `Failed`,
    /// with the transport error recorded distinctly in the failure
    /// reason. Calling this again after a terminal status is a no-op.
    pub(crate) async fn run(&mut self, invoker: &dyn Invoker) -> StepStatus {
        if !self.status.can_run() {
            return self.status;
        }
        self.status = StepStatus::Running;
        self.status = match invoker.invoke(&self.action).await {
            Ok(true) => StepStatus::Succeeded,
            Ok(false) => {
                self.failure = Some(format!("{} rejected by downstream service", self.action.kind()));
                StepStatus::Failed
            }
            Err(err) => {
                self.failure = Some(err.to_string());
                StepStatus::Failed
            }
        };
        self.status
    }

    /// Executes the compensation exactly once, only from `Succeeded`.
    pub(crate) async fn compensate(&mut self, invoker: &dyn Invoker) -> StepStatus {
        if !self.status.can_compensate() {
            return self.status;
        }
        self.status = match invoker.invoke(&self.compensation).await {
            Ok(true) => StepStatus::Compensated,
            Ok(false) => {
                self.failure = Some(format!(
                    "{} rejected by downstream service",
                    self.compensation.kind()
                ));
                StepStatus::CompensationFailed
            }
            Err(err) => {
                self.failure = Some(err.to_string());
                StepStatus::CompensationFailed
            }
        };
        self.status
    }
}

//! The saga: an ordered collection of steps for one business transaction.

use common::SagaId;
use futures_util::future::join_all;
use saga_log::{LogEntry, SagaLog};

use crate::invoker::Invoker;
use crate::report::{SagaReport, StepReport};
use crate::status::{SagaStatus, StepStatus};
use crate::step::Step;

/// One business transaction instance.
///
/// Steps are grouped into phases. Steps of one phase are causally
/// independent and run concurrently; phases run strictly in declared
/// order, and a phase containing any failed step stops all forward
/// progress — later phases never start. On failure, every step that
/// succeeded is compensated exactly once in strict reverse declared
/// order, one at a time.
#[derive(Debug)]
pub struct Saga {
    saga_id: SagaId,
    steps: Vec<Step>,
    status: SagaStatus,
    next_phase: usize,
}

impl Saga {
    /// Creates an empty saga in the `Created` state.
    pub fn new(saga_id: SagaId) -> Self {
        Self {
            saga_id,
            steps: Vec::new(),
            status: SagaStatus::Created,
            next_phase: 0,
        }
    }

    /// Returns the saga ID.
    pub fn saga_id(&self) -> SagaId {
        self.saga_id
    }

    /// Returns the current status.
    pub fn status(&self) -> SagaStatus {
        self.status
    }

    /// Returns the steps in declared order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Appends a step as its own sequential phase: it only starts once
    /// every earlier phase succeeded.
    pub fn add_step(&mut self, mut step: Step) {
        step.phase = self.next_phase;
        self.next_phase += 1;
        self.steps.push(step);
    }

    /// Appends a group of causally independent steps as one phase. The
    /// group runs concurrently, and the phase is healthy only if every
    /// step in it succeeded.
    pub fn add_concurrent_steps(&mut self, steps: Vec<Step>) {
        if steps.is_empty() {
            return;
        }
        for mut step in steps {
            step.phase = self.next_phase;
            self.steps.push(step);
        }
        self.next_phase += 1;
    }

    /// Runs the saga to a terminal status.
    ///
    /// Execution never panics the process over remote failures: the
    /// first failed step triggers compensation of everything that
    /// succeeded, and the outcome is returned as a [`SagaReport`]. Audit
    /// log failures degrade the run (execution proceeds) and are flagged
    /// on the report.
    pub async fn run(&mut self, invoker: &dyn Invoker, log: &dyn SagaLog) -> SagaReport {
        if !self.status.can_run() {
            tracing::warn!(saga_id = %self.saga_id, status = %self.status, "saga already ran");
            return self.report(false);
        }

        let saga_id = self.saga_id;
        let mut degraded = self.open_summary(log).await;

        // Forward execution, phase by phase
        let mut idx = 0;
        let mut failed = false;
        while idx < self.steps.len() {
            let phase = self.steps[idx].phase;
            let end = idx
                + self.steps[idx..]
                    .iter()
                    .take_while(|step| step.phase == phase)
                    .count();

            let flags = join_all(
                self.steps[idx..end]
                    .iter_mut()
                    .map(|step| run_step(step, saga_id, invoker, log)),
            )
            .await;
            degraded |= flags.into_iter().any(|flag| flag);

            if self.steps[idx..end]
                .iter()
                .any(|step| step.status() == StepStatus::Failed)
            {
                failed = true;
                break;
            }
            idx = end;
        }

        if failed {
            degraded |= self.compensate(invoker, log).await;
            degraded |= self.close_summary(SagaStatus::Failed, log).await;
        } else {
            degraded |= self.close_summary(SagaStatus::Succeeded, log).await;
        }

        self.report(degraded)
    }

    /// Compensates every succeeded step in strict reverse declared
    /// order, each compensation awaited before the previous one starts.
    async fn compensate(&mut self, invoker: &dyn Invoker, log: &dyn SagaLog) -> bool {
        let saga_id = self.saga_id;
        let mut degraded = false;
        for step in self.steps.iter_mut().rev() {
            if step.status() != StepStatus::Succeeded {
                continue;
            }
            let status = step.compensate(invoker).await;
            if status == StepStatus::CompensationFailed {
                tracing::error!(
                    %saga_id,
                    step = step.name(),
                    failure = step.failure().unwrap_or("unknown"),
                    "compensation failed; remote state left inconsistent"
                );
            }
            degraded |= log_step(log, saga_id, step.name(), status).await;
        }
        degraded
    }

    /// Appends the saga-level summary entry and moves to `Running`.
    async fn open_summary(&mut self, log: &dyn SagaLog) -> bool {
        let degraded = match log
            .append(LogEntry::saga(self.saga_id, SagaStatus::Running.as_str()))
            .await
        {
            Ok(()) => false,
            Err(err) => {
                tracing::warn!(saga_id = %self.saga_id, %err, "audit log append failed; continuing");
                true
            }
        };
        self.status = SagaStatus::Running;
        degraded
    }

    /// Rewrites the summary entry with the terminal status.
    async fn close_summary(&mut self, status: SagaStatus, log: &dyn SagaLog) -> bool {
        let degraded = match log.update_latest_state(self.saga_id, status.as_str()).await {
            Ok(()) => false,
            Err(err) => {
                tracing::warn!(saga_id = %self.saga_id, %err, "audit log update failed; continuing");
                true
            }
        };
        self.status = status;
        degraded
    }

    fn report(&self, log_degraded: bool) -> SagaReport {
        SagaReport {
            saga_id: self.saga_id,
            status: self.status,
            steps: self
                .steps
                .iter()
                .map(|step| StepReport {
                    name: step.name().to_string(),
                    status: step.status(),
                    failure: step.failure().map(String::from),
                })
                .collect(),
            log_degraded,
        }
    }
}

/// Logs the `Running` transition, executes the step, logs the outcome.
/// Returns true if any log write failed.
async fn run_step(
    step: &mut Step,
    saga_id: SagaId,
    invoker: &dyn Invoker,
    log: &dyn SagaLog,
) -> bool {
    let mut degraded = log_step(log, saga_id, step.name(), StepStatus::Running).await;
    let status = step.run(invoker).await;
    degraded |= log_step(log, saga_id, step.name(), status).await;
    degraded
}

async fn log_step(log: &dyn SagaLog, saga_id: SagaId, name: &str, status: StepStatus) -> bool {
    match log
        .append(LogEntry::step(saga_id, name, status.as_str()))
        .await
    {
        Ok(()) => false,
        Err(err) => {
            tracing::warn!(%saga_id, step = name, %err, "audit log append failed; continuing");
            true
        }
    }
}

//! Checkout coordinator: the caller of record for checkout sagas.

use std::time::Duration;

use common::{OrderId, SagaId};
use saga_log::{LogEntry, SagaLog, SagaLogError};

use crate::builder::CheckoutBuilder;
use crate::error::SagaError;
use crate::invoker::ServiceInvoker;
use crate::report::SagaReport;
use crate::services::{OrderService, PaymentService, StockService};

/// Wires the workflow builder, action invoker, and saga log together and
/// drives one checkout per request.
///
/// All dependencies are constructed and passed in; coordinators for
/// different requests share the same stateless invoker and log.
pub struct CheckoutCoordinator<O, St, P, L> {
    orders: O,
    builder: CheckoutBuilder<O, St>,
    invoker: ServiceInvoker<St, P>,
    log: L,
}

impl<O, St, P, L> CheckoutCoordinator<O, St, P, L>
where
    O: OrderService + Clone,
    St: StockService + Clone,
    P: PaymentService,
    L: SagaLog,
{
    /// Creates a new coordinator over the given collaborators.
    pub fn new(orders: O, stock: St, payment: P, log: L) -> Self {
        Self {
            builder: CheckoutBuilder::new(orders.clone(), stock.clone()),
            invoker: ServiceInvoker::new(stock, payment),
            orders,
            log,
        }
    }

    /// Overrides the per-call timeout applied to every remote call.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.invoker = self.invoker.with_call_timeout(call_timeout);
        self
    }

    /// Executes the checkout saga for an order.
    ///
    /// Returns `Err` only for failures that abort before any step runs
    /// (unknown order, already paid, empty order, collaborator unreachable
    /// at build time). Step failures during execution are recovered by
    /// compensation and reported through the returned [`SagaReport`].
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, order_id: OrderId) -> Result<SagaReport, SagaError> {
        metrics::counter!("checkout_sagas_total").increment(1);
        let start = std::time::Instant::now();

        let mut saga = self.builder.build(order_id).await?;
        let report = saga.run(&self.invoker, &self.log).await;

        if report.succeeded() {
            // Only a fully successful saga marks the order paid
            self.orders.mark_order_paid(order_id).await?;
            metrics::counter!("checkout_sagas_succeeded").increment(1);
            tracing::info!(%order_id, "checkout succeeded");
        } else {
            metrics::counter!("checkout_sagas_failed").increment(1);
            tracing::warn!(%order_id, steps = ?report.step_statuses(), "checkout failed");
            for step in report.compensation_failures() {
                metrics::counter!("checkout_compensation_failures").increment(1);
                tracing::error!(%order_id, step, "compensation failed; operator attention required");
            }
        }
        if report.log_degraded {
            tracing::warn!(%order_id, "audit trail may be incomplete");
        }

        metrics::histogram!("checkout_saga_duration_seconds").record(start.elapsed().as_secs_f64());
        Ok(report)
    }

    /// Returns the audit trail recorded for an order's checkout saga.
    pub async fn audit_trail(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<LogEntry>, SagaLogError> {
        self.log.find_by_saga_id(SagaId::from(order_id)).await
    }
}

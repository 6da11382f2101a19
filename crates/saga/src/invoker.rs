//! Remote action invoker.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::command::Command;
use crate::services::{PaymentService, ServiceError, StockService};

/// Default timeout for one remote call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// A remote call that could not be completed.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The call did not finish within the configured timeout.
    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    /// The collaborator service reported a failure.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Executes one action or compensation command against a downstream
/// service.
///
/// `Ok(true)` means the remote side accepted the call, `Ok(false)` a
/// business rejection, and `Err` a transport failure. Invokers are
/// stateless and shared across all concurrently running steps and sagas.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Performs the remote call described by `command`.
    async fn invoke(&self, command: &Command) -> Result<bool, InvokeError>;
}

/// Invoker that dispatches commands to stock and payment collaborators.
///
/// Every call is bounded by a timeout so a hung collaborator surfaces as
/// a failed outcome instead of stalling the saga indefinitely.
#[derive(Debug, Clone)]
pub struct ServiceInvoker<St, P> {
    stock: St,
    payment: P,
    call_timeout: Duration,
}

impl<St, P> ServiceInvoker<St, P> {
    /// Creates a new invoker over the given collaborators.
    pub fn new(stock: St, payment: P) -> Self {
        Self {
            stock,
            payment,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

#[async_trait]
impl<St, P> Invoker for ServiceInvoker<St, P>
where
    St: StockService,
    P: PaymentService,
{
    async fn invoke(&self, command: &Command) -> Result<bool, InvokeError> {
        let call = async {
            match *command {
                Command::DecrementStock { item_id, quantity } => {
                    self.stock.decrement_stock(item_id, quantity).await
                }
                Command::IncrementStock { item_id, quantity } => {
                    self.stock.increment_stock(item_id, quantity).await
                }
                Command::DebitUser {
                    user_id,
                    order_id,
                    amount,
                } => self.payment.debit_user(user_id, order_id, amount).await,
                Command::CreditUser {
                    user_id,
                    order_id,
                    amount,
                } => self.payment.credit_user(user_id, order_id, amount).await,
            }
        };

        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(outcome) => Ok(outcome?),
            Err(_) => Err(InvokeError::Timeout(self.call_timeout)),
        }
    }
}

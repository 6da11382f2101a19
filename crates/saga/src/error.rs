//! Saga error types.

use common::OrderId;
use thiserror::Error;

use crate::services::ServiceError;

/// Errors that abort a checkout before any saga step runs.
///
/// Failures during execution are never surfaced this way: the saga
/// recovers locally via compensation and reports them through
/// [`SagaReport`](crate::SagaReport).
#[derive(Debug, Error)]
pub enum SagaError {
    /// The order was already paid; a terminal saga cannot be re-run.
    #[error("order {0} is already paid")]
    AlreadyPaid(OrderId),

    /// The order has no line items to reserve.
    #[error("order {0} has no items")]
    EmptyOrder(OrderId),

    /// A collaborator call failed while building or finalizing the saga.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;

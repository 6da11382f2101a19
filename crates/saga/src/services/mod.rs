//! Collaborator service contracts and in-memory implementations.
//!
//! The saga engine only sees these traits; the in-memory implementations
//! back the demo server and tests. Cross-saga isolation is delegated to
//! the conditional decrement/debit guards implemented here.

pub mod order;
pub mod payment;
pub mod stock;

use common::{ItemId, OrderId, UserId};
use thiserror::Error;

pub use order::{InMemoryOrderService, Order, OrderService};
pub use payment::{InMemoryPaymentService, PaymentService};
pub use stock::{InMemoryStockService, Item, StockService};

/// Errors returned by collaborator services.
///
/// A transport error means the remote call could not be completed; it is
/// distinct from a business rejection, which is a well-formed `false`
/// outcome of the call itself.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// Item does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// User does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The service was unreachable.
    #[error("transport error: {0}")]
    Transport(String),
}

//! Saga orchestration engine for order checkout.
//!
//! This crate coordinates a multi-step checkout that spans
//! independently-owned stock and payment services with no shared database
//! transaction. A checkout saga:
//! 1. Decrements stock for each line item (one independent sub-phase)
//! 2. Debits the user's balance (only once every reservation succeeded)
//!
//! The first step to fail stops forward progress; every step that already
//! succeeded is compensated in strict reverse declared order. Each state
//! transition is recorded in the saga log before execution proceeds.

pub mod builder;
pub mod checkout;
pub mod command;
pub mod error;
pub mod invoker;
pub mod report;
pub mod saga;
pub mod services;
pub mod status;
pub mod step;

pub use builder::CheckoutBuilder;
pub use checkout::CheckoutCoordinator;
pub use command::Command;
pub use error::SagaError;
pub use invoker::{DEFAULT_CALL_TIMEOUT, InvokeError, Invoker, ServiceInvoker};
pub use report::{SagaReport, StepReport};
pub use saga::Saga;
pub use services::{
    InMemoryOrderService, InMemoryPaymentService, InMemoryStockService, Item, Order, OrderService,
    PaymentService, ServiceError, StockService,
};
pub use status::{SagaStatus, StepStatus};
pub use step::Step;

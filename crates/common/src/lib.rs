//! Shared types used across the checkout saga workspace.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{ItemId, OrderId, SagaId, UserId};

//! Parameterized remote commands.
//!
//! Steps carry commands as data rather than opaque closures, so a step's
//! intent can be serialized, logged, and tested without real I/O.

use common::{ItemId, Money, OrderId, UserId};
use serde::{Deserialize, Serialize};

/// One remote call against a downstream service.
///
/// Executing a command yields `true` (the remote side accepted it),
/// `false` (rejected, e.g. insufficient stock or balance), or a transport
/// error (the call could not be completed at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Command {
    /// Decrement stock of an item; rejected when stock is insufficient.
    DecrementStock { item_id: ItemId, quantity: u32 },

    /// Increment stock of an item (undo of a decrement).
    IncrementStock { item_id: ItemId, quantity: u32 },

    /// Debit a user's balance for an order; rejected when the balance is
    /// insufficient. Idempotent per `(user_id, order_id)`.
    DebitUser {
        user_id: UserId,
        order_id: OrderId,
        amount: Money,
    },

    /// Credit a user's balance back for an order (undo of a debit).
    /// Idempotent per `(user_id, order_id)`.
    CreditUser {
        user_id: UserId,
        order_id: OrderId,
        amount: Money,
    },
}

impl Command {
    /// Returns the command kind as a string, for log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::DecrementStock { .. } => "decrement_stock",
            Command::IncrementStock { .. } => "increment_stock",
            Command::DebitUser { .. } => "debit_user",
            Command::CreditUser { .. } => "credit_user",
        }
    }
}

//! Payment service trait and in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId, UserId};

use super::ServiceError;

/// Trait for payment operations used by the saga.
///
/// Both operations are idempotent per `(user_id, order_id)`: a repeated
/// debit for an already-paid order does not double-charge, and a repeated
/// credit does not double-refund.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Debits a user's balance for an order. Returns `false` when the
    /// balance is insufficient.
    async fn debit_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
        amount: Money,
    ) -> Result<bool, ServiceError>;

    /// Credits a user's balance back for an order. Returns `false` when
    /// no matching debit exists to undo.
    async fn credit_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
        amount: Money,
    ) -> Result<bool, ServiceError>;
}

#[derive(Debug, Default)]
struct UserAccount {
    balance: Money,
    paid_orders: HashSet<OrderId>,
    refunded_orders: HashSet<OrderId>,
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    users: HashMap<UserId, UserAccount>,
    fail_on_debit: bool,
    fail_on_credit: bool,
}

/// In-memory payment service for the demo server and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures debit calls to fail with a transport error.
    pub fn set_fail_on_debit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_debit = fail;
    }

    /// Configures credit calls to fail with a transport error.
    pub fn set_fail_on_credit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_credit = fail;
    }

    /// Creates a user with zero balance and returns its ID.
    pub fn create_user(&self) -> UserId {
        let user_id = UserId::new();
        self.state
            .write()
            .unwrap()
            .users
            .insert(user_id, UserAccount::default());
        user_id
    }

    /// Adds funds to a user's balance.
    pub fn add_funds(&self, user_id: UserId, amount: Money) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        let account = state
            .users
            .get_mut(&user_id)
            .ok_or(ServiceError::UserNotFound(user_id))?;
        account.balance += amount;
        Ok(())
    }

    /// Returns a user's current balance.
    pub fn balance_of(&self, user_id: UserId) -> Option<Money> {
        self.state
            .read()
            .unwrap()
            .users
            .get(&user_id)
            .map(|account| account.balance)
    }

    /// Returns true if the user has paid for the given order.
    pub fn has_paid(&self, user_id: UserId, order_id: OrderId) -> bool {
        self.state
            .read()
            .unwrap()
            .users
            .get(&user_id)
            .is_some_and(|account| account.paid_orders.contains(&order_id))
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn debit_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
        amount: Money,
    ) -> Result<bool, ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_debit {
            return Err(ServiceError::Transport(
                "payment service unreachable".to_string(),
            ));
        }
        let Some(account) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        // Repeated debit for an already-paid order is a no-op success
        if account.paid_orders.contains(&order_id) {
            return Ok(true);
        }
        if account.balance < amount {
            return Ok(false);
        }
        account.balance = account.balance - amount;
        account.paid_orders.insert(order_id);
        Ok(true)
    }

    async fn credit_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
        amount: Money,
    ) -> Result<bool, ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_credit {
            return Err(ServiceError::Transport(
                "payment service unreachable".to_string(),
            ));
        }
        let Some(account) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        // Repeated credit for an already-refunded order is a no-op success
        if account.refunded_orders.contains(&order_id) {
            return Ok(true);
        }
        if !account.paid_orders.remove(&order_id) {
            return Ok(false);
        }
        account.balance += amount;
        account.refunded_orders.insert(order_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn debit_and_credit() {
        let service = InMemoryPaymentService::new();
        let user_id = service.create_user();
        let order_id = OrderId::new();
        service.add_funds(user_id, Money::from_cents(10000)).unwrap();

        assert!(
            service
                .debit_user(user_id, order_id, Money::from_cents(1500))
                .await
                .unwrap()
        );
        assert_eq!(service.balance_of(user_id), Some(Money::from_cents(8500)));
        assert!(service.has_paid(user_id, order_id));

        assert!(
            service
                .credit_user(user_id, order_id, Money::from_cents(1500))
                .await
                .unwrap()
        );
        assert_eq!(service.balance_of(user_id), Some(Money::from_cents(10000)));
        assert!(!service.has_paid(user_id, order_id));
    }

    #[tokio::test]
    async fn debit_is_rejected_on_insufficient_balance() {
        let service = InMemoryPaymentService::new();
        let user_id = service.create_user();
        service.add_funds(user_id, Money::from_cents(800)).unwrap();

        let accepted = service
            .debit_user(user_id, OrderId::new(), Money::from_cents(1500))
            .await
            .unwrap();
        assert!(!accepted);
        assert_eq!(service.balance_of(user_id), Some(Money::from_cents(800)));
    }

    #[tokio::test]
    async fn debit_is_idempotent_per_order() {
        let service = InMemoryPaymentService::new();
        let user_id = service.create_user();
        let order_id = OrderId::new();
        service.add_funds(user_id, Money::from_cents(10000)).unwrap();

        assert!(
            service
                .debit_user(user_id, order_id, Money::from_cents(1500))
                .await
                .unwrap()
        );
        // Second debit for the same (user, order) must not change the balance
        assert!(
            service
                .debit_user(user_id, order_id, Money::from_cents(1500))
                .await
                .unwrap()
        );
        assert_eq!(service.balance_of(user_id), Some(Money::from_cents(8500)));
    }

    #[tokio::test]
    async fn credit_is_idempotent_per_order() {
        let service = InMemoryPaymentService::new();
        let user_id = service.create_user();
        let order_id = OrderId::new();
        service.add_funds(user_id, Money::from_cents(10000)).unwrap();

        service
            .debit_user(user_id, order_id, Money::from_cents(1500))
            .await
            .unwrap();
        service
            .credit_user(user_id, order_id, Money::from_cents(1500))
            .await
            .unwrap();
        // Second credit must not change the balance again
        assert!(
            service
                .credit_user(user_id, order_id, Money::from_cents(1500))
                .await
                .unwrap()
        );
        assert_eq!(service.balance_of(user_id), Some(Money::from_cents(10000)));
    }

    #[tokio::test]
    async fn credit_without_debit_is_rejected() {
        let service = InMemoryPaymentService::new();
        let user_id = service.create_user();

        let accepted = service
            .credit_user(user_id, OrderId::new(), Money::from_cents(1500))
            .await
            .unwrap();
        assert!(!accepted);
    }

    #[tokio::test]
    async fn transport_failures() {
        let service = InMemoryPaymentService::new();
        let user_id = service.create_user();
        let order_id = OrderId::new();

        service.set_fail_on_debit(true);
        assert!(matches!(
            service.debit_user(user_id, order_id, Money::zero()).await,
            Err(ServiceError::Transport(_))
        ));

        service.set_fail_on_debit(false);
        service.set_fail_on_credit(true);
        assert!(matches!(
            service.credit_user(user_id, order_id, Money::zero()).await,
            Err(ServiceError::Transport(_))
        ));
    }
}

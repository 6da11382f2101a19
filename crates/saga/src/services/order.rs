//! Order service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ItemId, OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::ServiceError;

/// An order as seen by the checkout workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// The user who placed the order.
    pub user_id: UserId,
    /// Line items, each reserved with quantity 1. Set semantics: adding
    /// an item twice has no effect.
    pub items: Vec<ItemId>,
    /// Whether a checkout saga has already completed for this order.
    pub paid: bool,
}

/// Trait for order management operations used by the saga.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Loads an order by ID.
    async fn find_order(&self, order_id: OrderId) -> Result<Order, ServiceError>;

    /// Marks an order as paid. Invoked only after a successful saga.
    async fn mark_order_paid(&self, order_id: OrderId) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, Order>,
    fail_transport: bool,
}

/// In-memory order service for the demo server and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderService {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderService {
    /// Creates a new in-memory order service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures all subsequent calls to fail with a transport error.
    pub fn set_fail_transport(&self, fail: bool) {
        self.state.write().unwrap().fail_transport = fail;
    }

    /// Creates an empty, unpaid order for a user and returns its ID.
    pub fn create_order(&self, user_id: UserId) -> OrderId {
        let order_id = OrderId::new();
        self.state.write().unwrap().orders.insert(
            order_id,
            Order {
                user_id,
                items: Vec::new(),
                paid: false,
            },
        );
        order_id
    }

    /// Adds an item to an order. Adding the same item twice is a no-op.
    pub fn add_item(&self, order_id: OrderId, item_id: ItemId) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(ServiceError::OrderNotFound(order_id))?;
        if !order.items.contains(&item_id) {
            order.items.push(item_id);
        }
        Ok(())
    }

    /// Removes an item from an order.
    pub fn remove_item(&self, order_id: OrderId, item_id: ItemId) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(ServiceError::OrderNotFound(order_id))?;
        order.items.retain(|id| *id != item_id);
        Ok(())
    }

    /// Deletes an order.
    pub fn remove_order(&self, order_id: OrderId) -> Result<(), ServiceError> {
        let mut state = self.state.write().unwrap();
        state
            .orders
            .remove(&order_id)
            .map(|_| ())
            .ok_or(ServiceError::OrderNotFound(order_id))
    }

    /// Returns the number of orders stored.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    fn check_transport(&self) -> Result<(), ServiceError> {
        if self.state.read().unwrap().fail_transport {
            return Err(ServiceError::Transport(
                "order service unreachable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn find_order(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        self.check_transport()?;
        let state = self.state.read().unwrap();
        state
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(ServiceError::OrderNotFound(order_id))
    }

    async fn mark_order_paid(&self, order_id: OrderId) -> Result<(), ServiceError> {
        self.check_transport()?;
        let mut state = self.state.write().unwrap();
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or(ServiceError::OrderNotFound(order_id))?;
        order.paid = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_find_order() {
        let service = InMemoryOrderService::new();
        let user_id = UserId::new();
        let item_id = ItemId::new();

        let order_id = service.create_order(user_id);
        service.add_item(order_id, item_id).unwrap();

        let order = service.find_order(order_id).await.unwrap();
        assert_eq!(order.user_id, user_id);
        assert_eq!(order.items, vec![item_id]);
        assert!(!order.paid);
    }

    #[tokio::test]
    async fn add_item_twice_is_a_no_op() {
        let service = InMemoryOrderService::new();
        let order_id = service.create_order(UserId::new());
        let item_id = ItemId::new();

        service.add_item(order_id, item_id).unwrap();
        service.add_item(order_id, item_id).unwrap();

        let order = service.find_order(order_id).await.unwrap();
        assert_eq!(order.items.len(), 1);
    }

    #[tokio::test]
    async fn remove_item_and_order() {
        let service = InMemoryOrderService::new();
        let order_id = service.create_order(UserId::new());
        let item_id = ItemId::new();
        service.add_item(order_id, item_id).unwrap();

        service.remove_item(order_id, item_id).unwrap();
        assert!(service.find_order(order_id).await.unwrap().items.is_empty());

        service.remove_order(order_id).unwrap();
        assert!(matches!(
            service.find_order(order_id).await,
            Err(ServiceError::OrderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn mark_order_paid() {
        let service = InMemoryOrderService::new();
        let order_id = service.create_order(UserId::new());

        service.mark_order_paid(order_id).await.unwrap();
        assert!(service.find_order(order_id).await.unwrap().paid);
    }

    #[tokio::test]
    async fn transport_failure() {
        let service = InMemoryOrderService::new();
        let order_id = service.create_order(UserId::new());

        service.set_fail_transport(true);
        assert!(matches!(
            service.find_order(order_id).await,
            Err(ServiceError::Transport(_))
        ));
    }
}

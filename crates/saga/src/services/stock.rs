//! Stock service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ItemId, Money};
use serde::{Deserialize, Serialize};

use super::ServiceError;

/// A stock item: its unit price and the quantity on hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Item {
    /// Unit price.
    pub price: Money,
    /// Quantity available.
    pub stock: u32,
}

/// Trait for stock operations used by the saga.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Loads an item by ID.
    async fn find_item(&self, item_id: ItemId) -> Result<Item, ServiceError>;

    /// Decrements stock of an item. Returns `false` when the stock is
    /// insufficient; the decrement is conditional, so two concurrent
    /// sagas cannot both take the last unit.
    async fn decrement_stock(&self, item_id: ItemId, quantity: u32) -> Result<bool, ServiceError>;

    /// Increments stock of an item (undo of a decrement).
    async fn increment_stock(&self, item_id: ItemId, quantity: u32) -> Result<bool, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryStockState {
    items: HashMap<ItemId, Item>,
    fail_on_decrement: bool,
    fail_on_increment: bool,
}

/// In-memory stock service for the demo server and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockService {
    state: Arc<RwLock<InMemoryStockState>>,
}

impl InMemoryStockService {
    /// Creates a new in-memory stock service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures decrement calls to fail with a transport error.
    pub fn set_fail_on_decrement(&self, fail: bool) {
        self.state.write().unwrap().fail_on_decrement = fail;
    }

    /// Configures increment calls to fail with a transport error.
    pub fn set_fail_on_increment(&self, fail: bool) {
        self.state.write().unwrap().fail_on_increment = fail;
    }

    /// Creates an item with the given price and zero stock.
    pub fn create_item(&self, price: Money) -> ItemId {
        let item_id = ItemId::new();
        self.state
            .write()
            .unwrap()
            .items
            .insert(item_id, Item { price, stock: 0 });
        item_id
    }

    /// Creates an item with the given price and starting stock.
    pub fn create_item_with_stock(&self, price: Money, stock: u32) -> ItemId {
        let item_id = ItemId::new();
        self.state
            .write()
            .unwrap()
            .items
            .insert(item_id, Item { price, stock });
        item_id
    }

    /// Returns the quantity on hand for an item.
    pub fn stock_of(&self, item_id: ItemId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .items
            .get(&item_id)
            .map(|item| item.stock)
    }
}

#[async_trait]
impl StockService for InMemoryStockService {
    async fn find_item(&self, item_id: ItemId) -> Result<Item, ServiceError> {
        let state = self.state.read().unwrap();
        state
            .items
            .get(&item_id)
            .copied()
            .ok_or(ServiceError::ItemNotFound(item_id))
    }

    async fn decrement_stock(&self, item_id: ItemId, quantity: u32) -> Result<bool, ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_decrement {
            return Err(ServiceError::Transport(
                "stock service unreachable".to_string(),
            ));
        }
        let item = state
            .items
            .get_mut(&item_id)
            .ok_or(ServiceError::ItemNotFound(item_id))?;
        if item.stock < quantity {
            return Ok(false);
        }
        item.stock -= quantity;
        Ok(true)
    }

    async fn increment_stock(&self, item_id: ItemId, quantity: u32) -> Result<bool, ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_increment {
            return Err(ServiceError::Transport(
                "stock service unreachable".to_string(),
            ));
        }
        let item = state
            .items
            .get_mut(&item_id)
            .ok_or(ServiceError::ItemNotFound(item_id))?;
        item.stock += quantity;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_find_item() {
        let service = InMemoryStockService::new();
        let item_id = service.create_item_with_stock(Money::from_cents(1000), 5);

        let item = service.find_item(item_id).await.unwrap();
        assert_eq!(item.price, Money::from_cents(1000));
        assert_eq!(item.stock, 5);
    }

    #[tokio::test]
    async fn decrement_is_conditional() {
        let service = InMemoryStockService::new();
        let item_id = service.create_item_with_stock(Money::from_cents(1000), 1);

        assert!(service.decrement_stock(item_id, 1).await.unwrap());
        // Second decrement is rejected, not applied
        assert!(!service.decrement_stock(item_id, 1).await.unwrap());
        assert_eq!(service.stock_of(item_id), Some(0));
    }

    #[tokio::test]
    async fn increment_restores_stock() {
        let service = InMemoryStockService::new();
        let item_id = service.create_item_with_stock(Money::from_cents(1000), 1);

        service.decrement_stock(item_id, 1).await.unwrap();
        service.increment_stock(item_id, 1).await.unwrap();
        assert_eq!(service.stock_of(item_id), Some(1));
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let service = InMemoryStockService::new();
        let result = service.decrement_stock(ItemId::new(), 1).await;
        assert!(matches!(result, Err(ServiceError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn transport_failures() {
        let service = InMemoryStockService::new();
        let item_id = service.create_item_with_stock(Money::from_cents(1000), 1);

        service.set_fail_on_decrement(true);
        assert!(matches!(
            service.decrement_stock(item_id, 1).await,
            Err(ServiceError::Transport(_))
        ));

        service.set_fail_on_decrement(false);
        service.set_fail_on_increment(true);
        assert!(matches!(
            service.increment_stock(item_id, 1).await,
            Err(ServiceError::Transport(_))
        ));
    }
}

//! Checkout workflow builder.

use common::{Money, OrderId, SagaId};

use crate::command::Command;
use crate::error::SagaError;
use crate::saga::Saga;
use crate::services::{OrderService, StockService};
use crate::step::Step;

/// Translates a checkout request into a populated saga.
///
/// One step per line item (decrement stock by 1, undone by an increment)
/// grouped as a single concurrent phase, followed by exactly one payment
/// step declared last, so payment is only attempted once every
/// reservation succeeded. Item prices are read once at build time and not
/// re-validated at execution time.
#[derive(Debug, Clone)]
pub struct CheckoutBuilder<O, St> {
    orders: O,
    stock: St,
}

impl<O, St> CheckoutBuilder<O, St>
where
    O: OrderService,
    St: StockService,
{
    /// Creates a builder over the given collaborators.
    pub fn new(orders: O, stock: St) -> Self {
        Self { orders, stock }
    }

    /// Builds the saga for an order.
    #[tracing::instrument(skip(self))]
    pub async fn build(&self, order_id: OrderId) -> Result<Saga, SagaError> {
        let order = self.orders.find_order(order_id).await?;

        if order.paid {
            return Err(SagaError::AlreadyPaid(order_id));
        }
        if order.items.is_empty() {
            return Err(SagaError::EmptyOrder(order_id));
        }

        let mut total_cost = Money::zero();
        let mut reservations = Vec::with_capacity(order.items.len());
        for item_id in &order.items {
            let item = self.stock.find_item(*item_id).await?;
            total_cost += item.price;
            reservations.push(Step::new(
                format!("Decrease {item_id}"),
                Command::DecrementStock {
                    item_id: *item_id,
                    quantity: 1,
                },
                Command::IncrementStock {
                    item_id: *item_id,
                    quantity: 1,
                },
            ));
        }

        let mut saga = Saga::new(SagaId::from(order_id));
        saga.add_concurrent_steps(reservations);
        saga.add_step(Step::new(
            format!("Payment user {}", order.user_id),
            Command::DebitUser {
                user_id: order.user_id,
                order_id,
                amount: total_cost,
            },
            Command::CreditUser {
                user_id: order.user_id,
                order_id,
                amount: total_cost,
            },
        ));

        tracing::debug!(%order_id, steps = saga.steps().len(), total = %total_cost, "saga built");
        Ok(saga)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{InMemoryOrderService, InMemoryStockService, ServiceError};
    use crate::status::SagaStatus;
    use common::UserId;

    fn setup() -> (
        CheckoutBuilder<InMemoryOrderService, InMemoryStockService>,
        InMemoryOrderService,
        InMemoryStockService,
    ) {
        let orders = InMemoryOrderService::new();
        let stock = InMemoryStockService::new();
        let builder = CheckoutBuilder::new(orders.clone(), stock.clone());
        (builder, orders, stock)
    }

    #[tokio::test]
    async fn builds_one_step_per_item_plus_payment_last() {
        let (builder, orders, stock) = setup();
        let user_id = UserId::new();
        let order_id = orders.create_order(user_id);
        let item_a = stock.create_item_with_stock(Money::from_cents(1000), 1);
        let item_b = stock.create_item_with_stock(Money::from_cents(500), 1);
        orders.add_item(order_id, item_a).unwrap();
        orders.add_item(order_id, item_b).unwrap();

        let saga = builder.build(order_id).await.unwrap();

        assert_eq!(saga.saga_id(), SagaId::from(order_id));
        assert_eq!(saga.status(), SagaStatus::Created);
        assert_eq!(saga.steps().len(), 3);
        assert_eq!(saga.steps()[0].name(), format!("Decrease {item_a}"));
        assert_eq!(saga.steps()[1].name(), format!("Decrease {item_b}"));
        assert_eq!(saga.steps()[2].name(), format!("Payment user {user_id}"));

        // Payment debits the sum of prices read at build time
        match saga.steps()[2].action() {
            Command::DebitUser { amount, .. } => {
                assert_eq!(*amount, Money::from_cents(1500));
            }
            other => panic!("expected DebitUser, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_order_is_rejected() {
        let (builder, _, _) = setup();

        let result = builder.build(OrderId::new()).await;
        assert!(matches!(
            result,
            Err(SagaError::Service(ServiceError::OrderNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn paid_order_is_rejected() {
        let (builder, orders, stock) = setup();
        let order_id = orders.create_order(UserId::new());
        let item = stock.create_item_with_stock(Money::from_cents(1000), 1);
        orders.add_item(order_id, item).unwrap();
        orders.mark_order_paid(order_id).await.unwrap();

        let result = builder.build(order_id).await;
        assert!(matches!(result, Err(SagaError::AlreadyPaid(_))));
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let (builder, orders, _) = setup();
        let order_id = orders.create_order(UserId::new());

        let result = builder.build(order_id).await;
        assert!(matches!(result, Err(SagaError::EmptyOrder(_))));
    }

    #[tokio::test]
    async fn unknown_item_is_rejected_at_build_time() {
        let (builder, orders, stock) = setup();
        let order_id = orders.create_order(UserId::new());
        let item = stock.create_item_with_stock(Money::from_cents(1000), 1);
        orders.add_item(order_id, item).unwrap();
        orders.add_item(order_id, common::ItemId::new()).unwrap();

        let result = builder.build(order_id).await;
        assert!(matches!(
            result,
            Err(SagaError::Service(ServiceError::ItemNotFound(_)))
        ));
    }
}

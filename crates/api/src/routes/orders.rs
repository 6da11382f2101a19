//! Order CRUD and checkout endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{ItemId, OrderId, UserId};
use saga::{
    CheckoutCoordinator, InMemoryOrderService, InMemoryPaymentService, InMemoryStockService,
    OrderService, StockService,
};
use saga_log::SagaLog;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<L: SagaLog> {
    pub orders: InMemoryOrderService,
    pub stock: InMemoryStockService,
    pub payment: InMemoryPaymentService,
    pub coordinator: CheckoutCoordinator<
        InMemoryOrderService,
        InMemoryStockService,
        InMemoryPaymentService,
        L,
    >,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub order_id: String,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<String>,
    pub paid: bool,
    pub total_cost_cents: i64,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub status: String,
    /// `{step name: terminal status}` for every step of the saga.
    pub steps: BTreeMap<String, String>,
    /// True if a compensation failed: remote state was left inconsistent
    /// and needs an operator.
    pub requires_attention: bool,
    /// True if the audit trail may be incomplete.
    pub audit_degraded: bool,
}

#[derive(Serialize)]
pub struct LogEntryResponse {
    /// Step name, or `null` for the saga-level summary entry.
    pub step: Option<String>,
    pub state: String,
    pub timestamp: String,
}

// -- Handlers --

/// POST /orders — create an empty order for a user.
#[tracing::instrument(skip(state, req))]
pub async fn create<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&req.user_id)?);
    let order_id = state.orders.create_order(user_id);

    Ok((
        axum::http::StatusCode::CREATED,
        Json(OrderCreatedResponse {
            order_id: order_id.to_string(),
        }),
    ))
}

/// GET /orders/:id — load an order with its current total cost.
#[tracing::instrument(skip(state))]
pub async fn get<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);
    let order = state.orders.find_order(order_id).await?;

    let mut total_cost_cents = 0;
    for item_id in &order.items {
        let item = state.stock.find_item(*item_id).await?;
        total_cost_cents += item.price.cents();
    }

    Ok(Json(OrderResponse {
        order_id: order_id.to_string(),
        user_id: order.user_id.to_string(),
        items: order.items.iter().map(|id| id.to_string()).collect(),
        paid: order.paid,
        total_cost_cents,
    }))
}

/// DELETE /orders/:id — remove an order.
#[tracing::instrument(skip(state))]
pub async fn remove<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);
    state.orders.remove_order(order_id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /orders/:id/items/:item_id — add an item to an order.
#[tracing::instrument(skip(state))]
pub async fn add_item<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);
    let item_id = ItemId::from_uuid(parse_uuid(&item_id)?);

    // Reject unknown items up front, like the stock lookup at build time
    state.stock.find_item(item_id).await?;
    state.orders.add_item(order_id, item_id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// DELETE /orders/:id/items/:item_id — remove an item from an order.
#[tracing::instrument(skip(state))]
pub async fn remove_item<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);
    let item_id = ItemId::from_uuid(parse_uuid(&item_id)?);
    state.orders.remove_item(order_id, item_id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /orders/:id/checkout — run the checkout saga for an order.
#[tracing::instrument(skip(state))]
pub async fn checkout<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<String>,
) -> Result<(axum::http::StatusCode, Json<CheckoutResponse>), ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);

    let report = state.coordinator.checkout(order_id).await?;

    let response = CheckoutResponse {
        success: report.succeeded(),
        status: report.status.to_string(),
        steps: report
            .step_statuses()
            .into_iter()
            .map(|(name, status)| (name, status.to_string()))
            .collect(),
        requires_attention: report.has_compensation_failures(),
        audit_degraded: report.log_degraded,
    };

    let status = if response.success {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::BAD_REQUEST
    };
    Ok((status, Json(response)))
}

/// GET /orders/:id/log — audit trail of the order's checkout saga.
#[tracing::instrument(skip(state))]
pub async fn audit_log<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LogEntryResponse>>, ApiError> {
    let order_id = OrderId::from_uuid(parse_uuid(&id)?);

    let entries = state.coordinator.audit_trail(order_id).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|e| LogEntryResponse {
                step: e.step_name().map(String::from),
                state: e.state,
                timestamp: e.timestamp.to_rfc3339(),
            })
            .collect(),
    ))
}

pub(crate) fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}

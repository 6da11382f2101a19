//! Stock CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{ItemId, Money};
use saga::StockService;
use saga_log::SagaLog;
use serde::{Deserialize, Serialize};

use super::orders::{AppState, parse_uuid};
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateItemRequest {
    pub price_cents: i64,
}

#[derive(Serialize)]
pub struct ItemCreatedResponse {
    pub item_id: String,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub item_id: String,
    pub price_cents: i64,
    pub stock: u32,
}

/// POST /stock — create an item with a price and zero stock.
#[tracing::instrument(skip(state, req))]
pub async fn create<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(axum::http::StatusCode, Json<ItemCreatedResponse>), ApiError> {
    let item_id = state.stock.create_item(Money::from_cents(req.price_cents));
    Ok((
        axum::http::StatusCode::CREATED,
        Json(ItemCreatedResponse {
            item_id: item_id.to_string(),
        }),
    ))
}

/// GET /stock/:id — load an item.
#[tracing::instrument(skip(state))]
pub async fn get<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item_id = ItemId::from_uuid(parse_uuid(&id)?);
    let item = state.stock.find_item(item_id).await?;

    Ok(Json(ItemResponse {
        item_id: item_id.to_string(),
        price_cents: item.price.cents(),
        stock: item.stock,
    }))
}

/// POST /stock/:id/add/:amount — add stock to an item.
#[tracing::instrument(skip(state))]
pub async fn add<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path((id, amount)): Path<(String, u32)>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item_id = ItemId::from_uuid(parse_uuid(&id)?);
    state.stock.increment_stock(item_id, amount).await?;

    let item = state.stock.find_item(item_id).await?;
    Ok(Json(ItemResponse {
        item_id: item_id.to_string(),
        price_cents: item.price.cents(),
        stock: item.stock,
    }))
}

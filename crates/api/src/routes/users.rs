//! User account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{Money, UserId};
use saga_log::SagaLog;
use serde::Serialize;

use super::orders::{AppState, parse_uuid};
use crate::error::ApiError;

#[derive(Serialize)]
pub struct UserCreatedResponse {
    pub user_id: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: String,
    pub balance_cents: i64,
}

/// POST /users — create a user with zero balance.
#[tracing::instrument(skip(state))]
pub async fn create<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
) -> (axum::http::StatusCode, Json<UserCreatedResponse>) {
    let user_id = state.payment.create_user();
    (
        axum::http::StatusCode::CREATED,
        Json(UserCreatedResponse {
            user_id: user_id.to_string(),
        }),
    )
}

/// GET /users/:id — load a user's balance.
#[tracing::instrument(skip(state))]
pub async fn get<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&id)?);
    let balance = state
        .payment
        .balance_of(user_id)
        .ok_or_else(|| ApiError::NotFound(format!("User {user_id} not found")))?;

    Ok(Json(UserResponse {
        user_id: user_id.to_string(),
        balance_cents: balance.cents(),
    }))
}

/// POST /users/:id/funds/:amount — add funds to a user's balance.
#[tracing::instrument(skip(state))]
pub async fn add_funds<L: SagaLog + 'static>(
    State(state): State<Arc<AppState<L>>>,
    Path((id, amount_cents)): Path<(String, i64)>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = UserId::from_uuid(parse_uuid(&id)?);
    state
        .payment
        .add_funds(user_id, Money::from_cents(amount_cents))?;

    let balance = state
        .payment
        .balance_of(user_id)
        .ok_or_else(|| ApiError::NotFound(format!("User {user_id} not found")))?;
    Ok(Json(UserResponse {
        user_id: user_id.to_string(),
        balance_cents: balance.cents(),
    }))
}

//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::{SagaError, ServiceError};
use saga_log::SagaLogError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Saga build or finalization error.
    Saga(SagaError),
    /// Collaborator service error outside a saga run.
    Service(ServiceError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    let status = match &err {
        SagaError::AlreadyPaid(_) => StatusCode::CONFLICT,
        SagaError::EmptyOrder(_) => StatusCode::BAD_REQUEST,
        SagaError::Service(service_err) => service_error_status(service_err),
    };
    (status, err.to_string())
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    (service_error_status(&err), err.to_string())
}

fn service_error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::OrderNotFound(_)
        | ServiceError::ItemNotFound(_)
        | ServiceError::UserNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Transport(_) => {
            tracing::error!(error = %err, "collaborator unreachable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<SagaLogError> for ApiError {
    fn from(err: SagaLogError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

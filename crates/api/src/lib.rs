//! HTTP API server with observability for the checkout saga system.
//!
//! Provides REST endpoints for order, stock, and user management plus the
//! saga-triggering checkout entry point, with structured logging (tracing)
//! and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga_log::SagaLog;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<L: SagaLog + 'static>(
    state: Arc<AppState<L>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<L>))
        .route("/orders/{id}", get(routes::orders::get::<L>))
        .route("/orders/{id}", delete(routes::orders::remove::<L>))
        .route(
            "/orders/{id}/items/{item_id}",
            post(routes::orders::add_item::<L>),
        )
        .route(
            "/orders/{id}/items/{item_id}",
            delete(routes::orders::remove_item::<L>),
        )
        .route("/orders/{id}/checkout", post(routes::orders::checkout::<L>))
        .route("/orders/{id}/log", get(routes::orders::audit_log::<L>))
        .route("/stock", post(routes::stock::create::<L>))
        .route("/stock/{id}", get(routes::stock::get::<L>))
        .route("/stock/{id}/add/{amount}", post(routes::stock::add::<L>))
        .route("/users", post(routes::users::create::<L>))
        .route("/users/{id}", get(routes::users::get::<L>))
        .route(
            "/users/{id}/funds/{amount}",
            post(routes::users::add_funds::<L>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state backed by in-memory services and
/// an in-memory saga log.
pub fn create_default_state(config: &Config) -> Arc<AppState<saga_log::InMemorySagaLog>> {
    use saga::{
        CheckoutCoordinator, InMemoryOrderService, InMemoryPaymentService, InMemoryStockService,
    };
    use saga_log::InMemorySagaLog;

    let orders = InMemoryOrderService::new();
    let stock = InMemoryStockService::new();
    let payment = InMemoryPaymentService::new();
    let log = InMemorySagaLog::new();

    let coordinator =
        CheckoutCoordinator::new(orders.clone(), stock.clone(), payment.clone(), log)
            .with_call_timeout(config.call_timeout());

    Arc::new(AppState {
        orders,
        stock,
        payment,
        coordinator,
    })
}

//! API route modules
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`carts`] - checkout, payment redirects and saved carts
//! - [`orders`] - order listing, invoices and fulfillment
//! - [`products`] - catalog management and view tracking
//! - [`categories`] - category management
//! - [`statistics`] - dashboard aggregates and rebuild trigger

pub mod middleware;

pub mod carts;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod statistics;

use axum::Router;
use axum::http::HeaderName;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// All application routes, without middleware (tests plug in here)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(carts::router())
        .merge(orders::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(statistics::router())
}

/// The full application: routes, middleware stack and state
pub fn build_app(state: ServerState) -> Router {
    let request_id = HeaderName::from_static("x-request-id");
    build_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::error_audit,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}

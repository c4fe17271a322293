//! Cart and checkout API module
//!
//! The two GET callbacks are the payment provider's redirect targets:
//! they carry no proof of payment beyond the order id in the URL and are
//! safe to replay.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/checkout", post(handler::checkout))
        .route("/checkout-success/{order_id}", get(handler::checkout_success))
        .route("/checkout-error/{order_id}", get(handler::checkout_error))
        .route("/{user_id}", get(handler::get_cart).put(handler::update_cart))
}

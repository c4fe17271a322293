//! Order API module

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/user/{user_id}", get(handler::list_for_user))
        .route("/{order_id}", get(handler::get_by_id))
        .route("/{order_id}/invoice/{user_id}", get(handler::invoice))
        .route("/{order_id}/shipped", patch(handler::mark_shipped))
}

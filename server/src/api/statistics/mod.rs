//! Statistics API module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/statistics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/general", get(handler::general))
        .route("/product/{id}", get(handler::product))
        .route("/rebuild", post(handler::rebuild))
}

//! Health check handler

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/health - liveness plus a database round-trip
pub async fn health(State(state): State<ServerState>) -> AppResult<Json<Value>> {
    state.db.query("RETURN 1").await.map_err(|e| {
        crate::utils::AppError::database(format!("Database health check failed: {e}"))
    })?;
    Ok(Json(json!({
        "status": "ok",
        "environment": state.config.environment,
    })))
}

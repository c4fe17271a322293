//! Error audit middleware
//!
//! Persists every error response (4xx/5xx) to the `error_log` table
//! before it leaves the server. The response body has to be buffered to
//! read the message, so this sits close to the routes, inside the
//! compression layer.

use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::core::ServerState;
use crate::db::models::ErrorLog;
use crate::db::repository::ErrorLogRepository;
use crate::utils::{ErrorBody, time};

// Error bodies are small JSON documents; anything bigger is truncated
const MAX_BODY_BYTES: usize = 64 * 1024;

pub async fn error_audit(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let url = request.uri().to_string();

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer error response body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let detail = String::from_utf8_lossy(&bytes).into_owned();
    let message = serde_json::from_slice::<ErrorBody>(&bytes)
        .map(|b| b.message)
        .unwrap_or_else(|_| detail.clone());

    let log = ErrorLog {
        id: None,
        message,
        detail,
        error_code: status.as_u16(),
        method,
        url,
        created_at: time::now_millis(),
    };
    // Auditing must never break the response itself
    if let Err(e) = ErrorLogRepository::new(state.db.clone()).insert(log).await {
        tracing::warn!(error = %e, "Failed to persist error log");
    }

    Response::from_parts(parts, Body::from(bytes))
}

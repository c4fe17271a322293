//! Order API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus, PaymentStatus};
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResult};

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// GET /api/orders - latest orders, optionally filtered by status
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 500);
    let orders = match (query.status, query.payment_status) {
        (Some(status), _) => repo.find_by_status(vec![status], limit).await?,
        (None, Some(payment_status)) => repo.find_by_payment_status(payment_status, limit).await?,
        (None, None) => repo.find_latest(limit).await?,
    };
    Ok(Json(orders))
}

/// GET /api/orders/user/{user_id} - a customer's order history
pub async fn list_for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.db.clone())
        .find_by_user(&user_id)
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{order_id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = OrderRepository::new(state.db.clone())
        .find_by_id(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order not found: {order_id}")))?;
    Ok(Json(order))
}

/// GET /api/orders/{order_id}/invoice/{user_id} - owner-scoped invoice
/// view; a wrong owner gets the same 404 as a missing order
pub async fn invoice(
    State(state): State<ServerState>,
    Path((order_id, user_id)): Path<(String, String)>,
) -> AppResult<Json<Order>> {
    let order = OrderRepository::new(state.db.clone())
        .find_for_user(&order_id, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order not found: {order_id}")))?;
    Ok(Json(order))
}

/// PATCH /api/orders/{order_id}/shipped - fulfillment marks the order shipped
pub async fn mark_shipped(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.order_ledger().mark_shipped(&order_id).await?;
    Ok(Json(order))
}

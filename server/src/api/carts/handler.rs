//! Cart and checkout handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::checkout::{CheckoutPayload, CheckoutResponse};
use crate::core::ServerState;
use crate::db::models::{Cart, Order};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// POST /api/carts/checkout - price the cart, create the order and the
/// payment session
pub async fn checkout(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutPayload>,
) -> AppResult<Json<CheckoutResponse>> {
    let response = state.checkout().checkout(payload).await?;
    Ok(Json(response))
}

/// GET /api/carts/checkout-success/{order_id} - payment success redirect
pub async fn checkout_success(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.order_ledger().record_payment_success(&order_id).await?;
    Ok(Json(order))
}

/// GET /api/carts/checkout-error/{order_id} - payment failure redirect
pub async fn checkout_error(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.order_ledger().record_payment_failure(&order_id).await?;
    Ok(Json(order))
}

/// GET /api/carts/{user_id} - the saved cart on the user document
pub async fn get_cart(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Cart>> {
    let user = UserRepository::new(state.db.clone())
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User not found: {user_id}")))?;
    Ok(Json(user.cart))
}

/// PUT /api/carts/{user_id} - replace the saved cart
pub async fn update_cart(
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(cart): Json<Cart>,
) -> AppResult<Json<Cart>> {
    let user = UserRepository::new(state.db.clone())
        .update_cart(&user_id, cart)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User not found: {user_id}")))?;
    Ok(Json(user.cart))
}

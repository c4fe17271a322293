//! Product API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductStatistic, ProductUpdate};
use crate::db::repository::{
    ProductRepository, ProductStatisticRepository, record_id,
};
use crate::utils::{AppError, AppResult, time};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// When true, hidden products are included (back office view)
    #[serde(default)]
    pub all: bool,
}

/// GET /api/products - visible products; `?all=true` includes hidden ones
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = if query.all {
        repo.find_all().await?
    } else {
        repo.find_visible().await?
    };
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = ProductRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

/// POST /api/products - create a product and its statistics document
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    if payload.price < 0.0 {
        return Err(AppError::validation("Price cannot be negative"));
    }
    let now = time::now_millis();
    let product = Product {
        id: None,
        title: payload.title,
        short_description: payload.short_description,
        large_description: payload.large_description,
        price: payload.price,
        categories: payload
            .categories
            .iter()
            .map(|c| record_id("category", c))
            .collect(),
        visible: payload.visible.unwrap_or(true),
        stock: payload.stock,
        sells: 0.0,
        views: 0,
        is_hot: false,
        sku: payload.sku,
        created_at: now,
        updated_at: now,
    };

    let product = ProductRepository::new(state.db.clone()).create(product).await?;
    if let Some(product_id) = product.id.clone() {
        ProductStatisticRepository::new(state.db.clone())
            .create(ProductStatistic::empty(product_id))
            .await?;
    }
    Ok(Json(product))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    if payload.price.is_some_and(|p| p < 0.0) {
        return Err(AppError::validation("Price cannot be negative"));
    }
    let product = ProductRepository::new(state.db.clone())
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - removes the product and its statistics
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let deleted = ProductRepository::new(state.db.clone())
        .delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;
    if let Some(product_id) = deleted.id.clone() {
        ProductStatisticRepository::new(state.db.clone())
            .delete_for_product(&product_id)
            .await?;
    }
    Ok(Json(deleted))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPayload {
    pub user_id: Option<String>,
}

/// POST /api/products/{id}/view - record one product view
pub async fn record_view(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<ViewPayload>>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;
    let product_id = product
        .id
        .ok_or_else(|| AppError::internal("Product has no id"))?;

    let user_id = payload
        .and_then(|Json(p)| p.user_id)
        .map(|uid| record_id("user", &uid));
    state.statistics().record_view(&product_id, user_id).await?;
    Ok(Json(serde_json::json!({ "recorded": true })))
}

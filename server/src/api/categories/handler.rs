//! Category API handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::db::repository::CategoryRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/categories
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category not found: {id}")))?;
    Ok(Json(category))
}

/// POST /api/categories
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    let category = Category {
        id: None,
        name: payload.name,
        sort_order: payload.sort_order.unwrap_or(0),
        product_count: 0,
        total_sells: 0.0,
    };
    let category = CategoryRepository::new(state.db.clone()).create(category).await?;
    Ok(Json(category))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepository::new(state.db.clone())
        .update(&id, payload)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category not found: {id}")))?;
    Ok(Json(category))
}

/// DELETE /api/categories/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepository::new(state.db.clone())
        .delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category not found: {id}")))?;
    Ok(Json(category))
}

//! Statistics API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{GeneralStatistic, ProductStatistic, User};
use crate::db::repository::{
    OrderRepository, ProductRepository, ProductStatisticRepository, UserRepository, record_id,
};
use crate::orders::{OrderStatusCounts, status_counts};
use crate::utils::{AppError, AppResult};

const TOP_CUSTOMER_COUNT: i64 = 5;

/// Dashboard payload: the store-wide snapshot plus live order-status
/// counts and the biggest customers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStatisticsResponse {
    #[serde(flatten)]
    pub statistics: GeneralStatistic,
    pub order_status: OrderStatusCounts,
    pub top_customers: Vec<TopCustomer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub id: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub orders: i64,
    pub total_spent_in_orders: f64,
}

impl From<User> for TopCustomer {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_string()).unwrap_or_default(),
            email: user.email,
            name: user.name,
            surname: user.surname,
            orders: user.orders,
            total_spent_in_orders: user.total_spent_in_orders,
        }
    }
}

/// GET /api/statistics/general
pub async fn general(State(state): State<ServerState>) -> AppResult<Json<GeneralStatisticsResponse>> {
    let statistics = crate::db::repository::GeneralStatisticRepository::new(state.db.clone())
        .get()
        .await?
        .unwrap_or_default();
    let order_status = status_counts(&OrderRepository::new(state.db.clone())).await?;
    let top_customers = UserRepository::new(state.db.clone())
        .top_customers(TOP_CUSTOMER_COUNT)
        .await?
        .into_iter()
        .map(TopCustomer::from)
        .collect();

    Ok(Json(GeneralStatisticsResponse {
        statistics,
        order_status,
        top_customers,
    }))
}

/// GET /api/statistics/product/{id}
pub async fn product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductStatistic>> {
    let product_id = record_id("product", &id);
    // 404 on unknown product, empty document on a product with no events
    ProductRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product not found: {id}")))?;
    let statistic = ProductStatisticRepository::new(state.db.clone())
        .find_by_product(&product_id)
        .await?
        .unwrap_or_else(|| ProductStatistic::empty(product_id));
    Ok(Json(statistic))
}

/// POST /api/statistics/rebuild - run the full rebuild on demand
pub async fn rebuild(State(state): State<ServerState>) -> AppResult<Json<serde_json::Value>> {
    state.statistics().rebuild_all().await?;
    Ok(Json(serde_json::json!({ "rebuilt": true })))
}

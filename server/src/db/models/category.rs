//! Category Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::common::LocalizedText;
use super::serde_helpers;

/// Category model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub name: LocalizedText,
    #[serde(default)]
    pub sort_order: i32,
    /// Number of visible products in this category, recomputed nightly
    #[serde(default)]
    pub product_count: i64,
    /// Total euros sold across this category's products, recomputed nightly
    #[serde(default)]
    pub total_sells: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCreate {
    pub name: LocalizedText,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::common::LocalizedText;
use super::serde_helpers;

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub title: LocalizedText,
    pub short_description: LocalizedText,
    pub large_description: LocalizedText,
    pub price: f64,
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub categories: Vec<RecordId>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub stock: i64,
    /// Lifetime sold amount in euros, kept roughly current by the
    /// incremental bump and corrected by the nightly rebuild
    #[serde(default)]
    pub sells: f64,
    /// Lifetime view count
    #[serde(default)]
    pub views: i64,
    /// Top-5-by-sells flag, recomputed by the frequent scheduler task
    #[serde(default)]
    pub is_hot: bool,
    pub sku: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub title: LocalizedText,
    pub short_description: LocalizedText,
    #[serde(default)]
    pub large_description: LocalizedText,
    pub price: f64,
    #[serde(default)]
    pub categories: Vec<String>,
    pub visible: Option<bool>,
    #[serde(default)]
    pub stock: i64,
    pub sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_description: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

//! User Model
//!
//! Accounts are either real (registered) or placeholders created during
//! guest checkout so the order has an owner. Placeholder accounts carry a
//! random password hash and are not meant for login until activated.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::common::{Address, LocalizedText};
use super::serde_helpers;

/// Cart line stored on the user document between visits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    pub title: LocalizedText,
    pub quantity: i64,
    pub price: f64,
}

/// Cart snapshot stored on the user document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub total_price: f64,
    #[serde(default)]
    pub total_elements: i64,
    #[serde(default)]
    pub products: Vec<CartLine>,
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub email: String,
    /// Argon2 hash - never exposed over the API
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub mailing_addresses: Vec<Address>,
    pub active: bool,
    /// Guest-checkout account created to own an order
    #[serde(default)]
    pub is_placeholder: bool,
    #[serde(default)]
    pub subscribe_newsletter: bool,
    pub unsubscribe_newsletter_token: String,
    /// Lifetime counters, bumped on completed orders and rebuilt nightly
    #[serde(default)]
    pub orders: i64,
    #[serde(default)]
    pub total_items_in_orders: i64,
    #[serde(default)]
    pub total_spent_in_orders: f64,
    #[serde(default)]
    pub cart: Cart,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Whether order/shipping notifications should be sent to this account
    pub fn wants_notifications(&self) -> bool {
        self.active && !self.is_placeholder
    }
}

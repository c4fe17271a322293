//! Order Model
//!
//! One document per purchase attempt. Line items snapshot the product
//! title/description/price at checkout time; totals are derived once at
//! creation and never recomputed.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::common::{Address, LocalizedText};
use super::serde_helpers;
use super::status::{OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod, ShippingStatus};

/// One product + quantity + price snapshot within an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(with = "serde_helpers::record_id")]
    pub product_id: RecordId,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub price: f64,
    pub quantity: i64,
    /// price * quantity
    pub amount: f64,
    pub currency: String,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub user_id: RecordId,
    /// Monotonically increasing, assigned once from the invoice counter
    pub invoice_number: i64,
    pub products: Vec<OrderLine>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub shipping_status: ShippingStatus,
    pub shipping_method: ShippingMethod,
    pub shipping_cost: f64,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub total_price: f64,
    #[serde(rename = "totalPriceWithoutVAT")]
    pub total_price_without_vat: f64,
    #[serde(rename = "priceVAT")]
    pub price_vat: f64,
    /// VAT percentage snapshotted at checkout time
    #[serde(rename = "VAT")]
    pub vat: f64,
    /// Sum of line quantities
    pub total_elements: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Check the creation-time invariants: totals equal the line sums and
    /// the VAT split adds back up to the gross total (2-decimal tolerance).
    pub fn totals_consistent(&self) -> bool {
        let line_amount: f64 = self.products.iter().map(|l| l.amount).sum();
        let line_quantity: i64 = self.products.iter().map(|l| l.quantity).sum();
        (self.total_price - line_amount).abs() < 0.005
            && self.total_elements == line_quantity
            && (self.price_vat + self.total_price_without_vat - self.total_price).abs() < 0.01
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: i64) -> OrderLine {
        OrderLine {
            product_id: RecordId::from_table_key("product", "p1"),
            title: LocalizedText::new("Widget", "Artilugio"),
            description: LocalizedText::new("A widget", "Un artilugio"),
            price,
            quantity,
            amount: price * quantity as f64,
            currency: "eur".to_string(),
        }
    }

    #[test]
    fn totals_consistency_check() {
        let order = Order {
            id: None,
            user_id: RecordId::from_table_key("user", "u1"),
            invoice_number: 1,
            products: vec![line(10.0, 2), line(5.0, 1)],
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::AwaitingConfirmation,
            payment_method: PaymentMethod::CreditCard,
            shipping_status: ShippingStatus::Pending,
            shipping_method: ShippingMethod::FreeShipping,
            shipping_cost: 0.0,
            shipping_address: Address::default(),
            billing_address: Address::default(),
            total_price: 25.0,
            total_price_without_vat: 20.66,
            price_vat: 4.34,
            vat: 21.0,
            total_elements: 3,
            created_at: 0,
            updated_at: 0,
        };
        assert!(order.totals_consistent());

        let mut broken = order.clone();
        broken.total_elements = 4;
        assert!(!broken.totals_consistent());

        let mut broken = order;
        broken.price_vat = 5.0;
        assert!(!broken.totals_consistent());
    }
}

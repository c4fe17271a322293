//! Order lifecycle enumerations
//!
//! Closed tagged enums stored as SCREAMING_SNAKE_CASE strings. The original
//! data model referenced these as loose id values; business logic here only
//! ever compares enum variants. A `status_label` reference table is seeded
//! at startup with the bilingual display name of every variant.

use serde::{Deserialize, Serialize};

use super::common::LocalizedText;

/// Overall order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    CancelledByUser,
    CancelledByShop,
    CancelledByPaymentError,
}

impl OrderStatus {
    /// Terminal cancelled states - no further status-affecting writes allowed
    pub const CANCELLED: [OrderStatus; 3] = [
        OrderStatus::CancelledByUser,
        OrderStatus::CancelledByShop,
        OrderStatus::CancelledByPaymentError,
    ];

    pub fn is_cancelled(self) -> bool {
        Self::CANCELLED.contains(&self)
    }

    pub fn label(self) -> LocalizedText {
        match self {
            OrderStatus::Pending => LocalizedText::new("Pending", "Pendiente"),
            OrderStatus::Processing => LocalizedText::new("Processing", "Procesando"),
            OrderStatus::Completed => LocalizedText::new("Completed", "Completado"),
            OrderStatus::CancelledByUser => {
                LocalizedText::new("Cancelled by user", "Cancelado por el usuario")
            }
            OrderStatus::CancelledByShop => {
                LocalizedText::new("Cancelled by shop", "Cancelado por la tienda")
            }
            OrderStatus::CancelledByPaymentError => LocalizedText::new(
                "Cancelled by payment error",
                "Cancelado por error en el pago",
            ),
        }
    }

    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::CancelledByUser,
        OrderStatus::CancelledByShop,
        OrderStatus::CancelledByPaymentError,
    ];
}

/// Payment track, independent of the overall order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    AwaitingConfirmation,
    Processing,
    Completed,
    Cancelled,
}

impl PaymentStatus {
    /// States the expiry sweep considers stale when older than the timeout
    pub const PENDING: [PaymentStatus; 2] =
        [PaymentStatus::AwaitingConfirmation, PaymentStatus::Processing];

    pub fn label(self) -> LocalizedText {
        match self {
            PaymentStatus::AwaitingConfirmation => {
                LocalizedText::new("Awaiting confirmation", "Pendiente de confirmación")
            }
            PaymentStatus::Processing => LocalizedText::new("Processing", "Procesando"),
            PaymentStatus::Completed => LocalizedText::new("Completed", "Completado"),
            PaymentStatus::Cancelled => LocalizedText::new("Cancelled", "Cancelado"),
        }
    }

    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::AwaitingConfirmation,
        PaymentStatus::Processing,
        PaymentStatus::Completed,
        PaymentStatus::Cancelled,
    ];
}

/// Shipping track
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingStatus {
    Pending,
    Completed,
    Cancelled,
}

impl ShippingStatus {
    pub fn label(self) -> LocalizedText {
        match self {
            ShippingStatus::Pending => LocalizedText::new("Pending", "Pendiente"),
            ShippingStatus::Completed => LocalizedText::new("Completed", "Completado"),
            ShippingStatus::Cancelled => LocalizedText::new("Cancelled", "Cancelado"),
        }
    }

    pub const ALL: [ShippingStatus; 3] = [
        ShippingStatus::Pending,
        ShippingStatus::Completed,
        ShippingStatus::Cancelled,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CreditCard,
    Paypal,
}

impl PaymentMethod {
    pub fn label(self) -> LocalizedText {
        match self {
            PaymentMethod::CreditCard => LocalizedText::new("Credit card", "Tarjeta de crédito"),
            PaymentMethod::Paypal => LocalizedText::new("PayPal", "PayPal"),
        }
    }

    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::CreditCard, PaymentMethod::Paypal];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingMethod {
    Standard,
    Express,
    FreeShipping,
    LocalPickup,
}

impl ShippingMethod {
    pub fn label(self) -> LocalizedText {
        match self {
            ShippingMethod::Standard => LocalizedText::new("Standard", "Estándar"),
            ShippingMethod::Express => LocalizedText::new("Express", "Exprés"),
            ShippingMethod::FreeShipping => LocalizedText::new("Free shipping", "Envío gratuito"),
            ShippingMethod::LocalPickup => {
                LocalizedText::new("Local pickup", "Recogida en tienda")
            }
        }
    }

    pub const ALL: [ShippingMethod; 4] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::FreeShipping,
        ShippingMethod::LocalPickup,
    ];
}

/// Seeded reference record mapping a status/method variant to its display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusLabel {
    /// Which enumeration this entry belongs to ("order_status", "payment_status", ...)
    pub kind: String,
    /// SCREAMING_SNAKE_CASE variant code
    pub code: String,
    pub name: LocalizedText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_predicate() {
        assert!(OrderStatus::CancelledByShop.is_cancelled());
        assert!(OrderStatus::CancelledByPaymentError.is_cancelled());
        assert!(!OrderStatus::Pending.is_cancelled());
        assert!(!OrderStatus::Completed.is_cancelled());
    }

    #[test]
    fn wire_format_is_screaming_snake() {
        let s = serde_json::to_string(&OrderStatus::CancelledByPaymentError).unwrap();
        assert_eq!(s, "\"CANCELLED_BY_PAYMENT_ERROR\"");
        let s = serde_json::to_string(&PaymentStatus::AwaitingConfirmation).unwrap();
        assert_eq!(s, "\"AWAITING_CONFIRMATION\"");
        let back: PaymentStatus = serde_json::from_str(&s).unwrap();
        assert_eq!(back, PaymentStatus::AwaitingConfirmation);
    }
}

//! Order notifications
//!
//! Fire-and-forget transactional emails. Delivery failures are logged and
//! swallowed: a lost confirmation email must never fail or retry the
//! order transition that triggered it.

use async_trait::async_trait;
use serde_json::json;

use crate::db::models::{Order, User};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_order_confirmation(&self, user: &User, order: &Order);
    async fn send_shipping_confirmation(&self, user: &User, order: &Order);
}

/// Transactional email provider (SendGrid-compatible JSON API)
#[derive(Clone)]
pub struct EmailNotifier {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    from: String,
    shop_name: String,
}

impl EmailNotifier {
    pub fn new(api_key: String, api_base: String, from: String, shop_name: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base,
            from,
            shop_name,
        }
    }

    async fn send(&self, to: &str, subject: String, body: String) {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from, "name": self.shop_name },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let result = self
            .client
            .post(format!("{}/v3/mail/send", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(%to, "Notification email sent");
            }
            Ok(response) => {
                tracing::warn!(%to, status = %response.status(), "Notification email rejected");
            }
            Err(e) => {
                tracing::warn!(%to, error = %e, "Notification email failed");
            }
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_order_confirmation(&self, user: &User, order: &Order) {
        let subject = format!("{} - Order confirmation #{}", self.shop_name, order.invoice_number);
        let body = format!(
            "Hi {},\n\nWe received your payment of {:.2} EUR for order #{}.\n\nThank you for shopping with {}.",
            user.name, order.total_price, order.invoice_number, self.shop_name
        );
        self.send(&user.email, subject, body).await;
    }

    async fn send_shipping_confirmation(&self, user: &User, order: &Order) {
        let subject = format!("{} - Order #{} shipped", self.shop_name, order.invoice_number);
        let body = format!(
            "Hi {},\n\nYour order #{} is on its way to {} {}.\n\n{}",
            user.name,
            order.invoice_number,
            order.shipping_address.address,
            order.shipping_address.city,
            self.shop_name
        );
        self.send(&user.email, subject, body).await;
    }
}

/// Used when no email provider is configured
#[derive(Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_order_confirmation(&self, user: &User, order: &Order) {
        tracing::debug!(email = %user.email, invoice = order.invoice_number, "Email disabled, skipping order confirmation");
    }

    async fn send_shipping_confirmation(&self, user: &User, order: &Order) {
        tracing::debug!(email = %user.email, invoice = order.invoice_number, "Email disabled, skipping shipping confirmation");
    }
}

//! Payment gateway
//!
//! Stripe Checkout over the form-encoded REST API. The gateway is a trait
//! so tests can swap in a local fake and checkout logic stays network-free.

use async_trait::async_trait;
use serde::Deserialize;

use crate::utils::{AppError, AppResult};

/// One line of a checkout session. `unit_amount` is in minor units
/// (cents), the way the provider expects prices.
#[derive(Debug, Clone)]
pub struct SessionLineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: i64,
    pub currency: String,
}

/// A created checkout session: the URL the shopper is redirected to
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session. The provider redirects the
    /// shopper to `success_url` or `cancel_url` when the session ends.
    async fn create_checkout_session(
        &self,
        line_items: &[SessionLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> AppResult<CheckoutSession>;
}

/// Stripe Checkout implementation
#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeGateway {
    pub fn new(secret_key: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            api_base,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        line_items: &[SessionLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> AppResult<CheckoutSession> {
        if self.secret_key.is_empty() {
            return Err(AppError::upstream("Payment provider key not configured"));
        }

        // Stripe's form encoding indexes array params: line_items[0][...]
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ];
        for (i, item) in line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                item.currency.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::upstream(format!("Payment provider unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<StripeErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            tracing::error!(%status, %message, "Checkout session creation rejected");
            return Err(AppError::upstream(format!(
                "Payment provider rejected the session: {message}"
            )));
        }

        let session: StripeSession = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Malformed payment provider response: {e}")))?;

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}

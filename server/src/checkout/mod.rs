//! Checkout orchestration
//!
//! Turns a cart into a Pending order plus a hosted payment session.
//! Prices are never trusted from the client: every line is re-priced from
//! the product table at checkout time, and the title/description/price
//! are snapshotted onto the order so later catalog edits cannot change
//! historical invoices.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::core::Config;
use crate::db::models::{
    Address, Cart, Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod,
    ShippingStatus, User,
};
use crate::db::repository::{OrderRepository, ProductRepository, UserRepository, record_id};
use crate::services::{PaymentGateway, SessionLineItem};
use crate::utils::{AppError, AppResult, money, time};

/// One requested cart line: id and quantity only, price comes from the
/// product table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    /// Set by the routing layer for logged-in shoppers; guests leave it
    /// empty and are matched by email
    #[serde(default)]
    pub user_id: Option<String>,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub phone: String,
    #[validate(length(min = 1, message = "Cart is empty"))]
    pub products: Vec<CheckoutLine>,
    pub shipping_address: Address,
    #[serde(default)]
    pub billing_address: Option<Address>,
    pub payment_method: PaymentMethod,
    pub shipping_method: ShippingMethod,
    #[serde(default)]
    pub shipping_cost: f64,
    #[serde(default)]
    pub subscribe_newsletter: bool,
}

/// What the frontend needs: where to send the shopper
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub session_url: String,
}

#[derive(Clone)]
pub struct CheckoutOrchestrator {
    config: Config,
    users: UserRepository,
    products: ProductRepository,
    orders: OrderRepository,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutOrchestrator {
    pub fn new(db: Surreal<Db>, config: Config, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            config,
            users: UserRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db),
            gateway,
        }
    }

    pub async fn checkout(&self, payload: CheckoutPayload) -> AppResult<CheckoutResponse> {
        // Validate before touching any table
        payload
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        if payload.products.iter().any(|l| l.quantity <= 0) {
            return Err(AppError::validation("Line quantities must be positive"));
        }
        if payload.shipping_cost < 0.0 {
            return Err(AppError::validation("Shipping cost cannot be negative"));
        }

        // Price first so a worthless cart is rejected before any write
        let lines = self.price_lines(&payload.products).await?;
        let line_total: f64 = lines.iter().map(|l| l.amount).sum();
        if line_total <= 0.0 {
            return Err(AppError::validation("Cart total is zero"));
        }

        let user = self.resolve_customer(&payload).await?;
        let user_id = user
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Resolved user has no id"))?;

        let order = self.build_order(&payload, user_id, lines).await?;
        let order = self.orders.create(order).await?;
        let order_id = order
            .id
            .as_ref()
            .map(|id| id.to_string())
            .ok_or_else(|| AppError::internal("Created order has no id"))?;

        let session = self
            .gateway
            .create_checkout_session(
                &self.session_line_items(&order),
                &self.config.checkout_success_url(&order_id),
                &self.config.checkout_error_url(&order_id),
            )
            .await?;

        tracing::info!(
            order = %order_id,
            invoice = order.invoice_number,
            total = order.total_price,
            "Checkout session created"
        );

        Ok(CheckoutResponse {
            order_id,
            session_url: session.url,
        })
    }

    /// Resolve the account that will own the order.
    ///
    /// Logged-in shoppers arrive with a `user_id` and get their profile
    /// backfilled. Guests are matched by email: an existing placeholder
    /// account is reused, a registered active account is a conflict (the
    /// shopper has to log in instead), and an unknown email gets a fresh
    /// placeholder account.
    async fn resolve_customer(&self, payload: &CheckoutPayload) -> AppResult<User> {
        if let Some(user_id) = &payload.user_id {
            let user = self
                .users
                .find_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User not found: {user_id}")))?;
            return self.backfill_profile(user, payload).await;
        }

        match self.users.find_by_email(&payload.email).await? {
            Some(user) if user.active && !user.is_placeholder => Err(AppError::conflict(
                "An account with this email already exists, please log in",
            )),
            Some(user) => self.backfill_profile(user, payload).await,
            None => {
                let now = time::now_millis();
                let user = User {
                    id: None,
                    email: payload.email.clone(),
                    password: random_password_hash()?,
                    name: payload.name.clone(),
                    surname: payload.surname.clone(),
                    phone: payload.phone.clone(),
                    mailing_addresses: vec![payload.shipping_address.clone()],
                    active: false,
                    is_placeholder: true,
                    subscribe_newsletter: payload.subscribe_newsletter,
                    unsubscribe_newsletter_token: random_token(),
                    orders: 0,
                    total_items_in_orders: 0,
                    total_spent_in_orders: 0.0,
                    cart: Cart::default(),
                    created_at: now,
                    updated_at: now,
                };
                Ok(self.users.create(user).await?)
            }
        }
    }

    /// Fill blank profile fields from the checkout form, never overwrite
    /// existing ones
    async fn backfill_profile(&self, mut user: User, payload: &CheckoutPayload) -> AppResult<User> {
        let mut dirty = false;
        if user.name.is_empty() && !payload.name.is_empty() {
            user.name = payload.name.clone();
            dirty = true;
        }
        if user.surname.is_empty() && !payload.surname.is_empty() {
            user.surname = payload.surname.clone();
            dirty = true;
        }
        if user.phone.is_empty() && !payload.phone.is_empty() {
            user.phone = payload.phone.clone();
            dirty = true;
        }
        if user.mailing_addresses.is_empty() {
            user.mailing_addresses = vec![payload.shipping_address.clone()];
            dirty = true;
        }
        if dirty {
            user.updated_at = time::now_millis();
            user = self.users.save(user).await?;
        }
        Ok(user)
    }

    /// Re-fetch every product and price the lines from the table
    async fn price_lines(&self, requested: &[CheckoutLine]) -> AppResult<Vec<OrderLine>> {
        let ids: Vec<RecordId> = requested
            .iter()
            .map(|l| record_id("product", &l.product_id))
            .collect();
        let products = self.products.find_by_ids(&ids).await?;
        let by_id: HashMap<String, _> = products
            .into_iter()
            .filter_map(|p| p.id.clone().map(|id| (id.to_string(), p)))
            .collect();

        let mut lines = Vec::with_capacity(requested.len());
        for (line, id) in requested.iter().zip(ids) {
            let product = by_id
                .get(&id.to_string())
                .ok_or_else(|| AppError::not_found(format!("Product not found: {}", line.product_id)))?;
            if !product.visible {
                return Err(AppError::validation(format!(
                    "Product is not available: {}",
                    line.product_id
                )));
            }
            lines.push(OrderLine {
                product_id: id,
                title: product.title.clone(),
                description: product.short_description.clone(),
                price: product.price,
                quantity: line.quantity,
                amount: money::round2(product.price * line.quantity as f64),
                currency: self.config.currency.clone(),
            });
        }
        Ok(lines)
    }

    async fn build_order(
        &self,
        payload: &CheckoutPayload,
        user_id: RecordId,
        lines: Vec<OrderLine>,
    ) -> AppResult<Order> {
        let total_elements: i64 = lines.iter().map(|l| l.quantity).sum();
        let line_total: f64 = lines.iter().map(|l| l.amount).sum();
        let total_price = money::round2(line_total + payload.shipping_cost);
        let (net, vat_amount) = money::vat_split(total_price, self.config.vat_percentage);

        let invoice_number = self.orders.next_invoice_number().await?;
        let now = time::now_millis();

        Ok(Order {
            id: None,
            user_id,
            invoice_number,
            products: lines,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::AwaitingConfirmation,
            payment_method: payload.payment_method,
            shipping_status: ShippingStatus::Pending,
            shipping_method: payload.shipping_method,
            shipping_cost: payload.shipping_cost,
            shipping_address: payload.shipping_address.clone(),
            billing_address: payload
                .billing_address
                .clone()
                .unwrap_or_else(|| payload.shipping_address.clone()),
            total_price,
            total_price_without_vat: net,
            price_vat: vat_amount,
            vat: self.config.vat_percentage,
            total_elements,
            created_at: now,
            updated_at: now,
        })
    }

    /// Provider line items in minor units, shipping as its own line
    fn session_line_items(&self, order: &Order) -> Vec<SessionLineItem> {
        let mut items: Vec<SessionLineItem> = order
            .products
            .iter()
            .map(|line| SessionLineItem {
                name: line.title.en.clone(),
                unit_amount: money::to_minor_units(line.price),
                quantity: line.quantity,
                currency: line.currency.clone(),
            })
            .collect();
        if order.shipping_cost > 0.0 {
            items.push(SessionLineItem {
                name: "Shipping".to_string(),
                unit_amount: money::to_minor_units(order.shipping_cost),
                quantity: 1,
                currency: self.config.currency.clone(),
            });
        }
        items
    }
}

/// Random unusable password for placeholder accounts, stored hashed like
/// any other
fn random_password_hash() -> AppResult<String> {
    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
}

fn random_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

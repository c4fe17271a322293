//! Order lifecycle
//!
//! Wraps the conditional status transitions and attaches their side
//! effects. The repository guarantees each transition happens at most
//! once; this layer guarantees the side effects (statistics, emails)
//! ride on the winning call only.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{Order, OrderStatus, User};
use crate::db::repository::{OrderRepository, UserRepository};
use crate::services::Notifier;
use crate::statistics::StatisticsAggregator;
use crate::utils::{AppError, AppResult, time};

#[derive(Clone)]
pub struct OrderLedger {
    orders: OrderRepository,
    users: UserRepository,
    statistics: StatisticsAggregator,
    notifier: Arc<dyn Notifier>,
    payment_timeout_millis: i64,
}

impl OrderLedger {
    pub fn new(
        db: Surreal<Db>,
        statistics: StatisticsAggregator,
        notifier: Arc<dyn Notifier>,
        payment_timeout_millis: i64,
    ) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db),
            statistics,
            notifier,
            payment_timeout_millis,
        }
    }

    /// Payment success redirect/callback.
    ///
    /// Idempotent: replays and double-deliveries return the order as-is
    /// without re-counting the sale or re-sending the email.
    pub async fn record_payment_success(&self, order_id: &str) -> AppResult<Order> {
        match self.orders.complete_payment(order_id).await? {
            Some(order) => {
                // This call won the transition, so the side effects run
                // exactly once
                self.statistics.record_sale(&order).await?;
                self.notify(&order, Notification::OrderConfirmed).await;
                tracing::info!(order = %order_id, invoice = order.invoice_number, "Payment completed");
                Ok(order)
            }
            None => self.require_order(order_id).await,
        }
    }

    /// Payment failure redirect/callback. Also idempotent; a failure
    /// arriving after a success leaves the completed payment untouched.
    pub async fn record_payment_failure(&self, order_id: &str) -> AppResult<Order> {
        match self.orders.cancel_payment(order_id).await? {
            Some(order) => {
                tracing::info!(order = %order_id, "Payment failed, order cancelled");
                Ok(order)
            }
            None => self.require_order(order_id).await,
        }
    }

    /// Fulfillment marks the order shipped
    pub async fn mark_shipped(&self, order_id: &str) -> AppResult<Order> {
        match self.orders.complete_shipping(order_id).await? {
            Some(order) => {
                self.notify(&order, Notification::Shipped).await;
                tracing::info!(order = %order_id, invoice = order.invoice_number, "Order shipped");
                Ok(order)
            }
            None => self.require_order(order_id).await,
        }
    }

    /// Sweep orders whose payment confirmation never arrived within the
    /// timeout window. Returns how many were cancelled.
    pub async fn expire_stale_payments(&self) -> AppResult<usize> {
        let cutoff = time::now_millis() - self.payment_timeout_millis;
        let expired = self.orders.expire_stale_payments(cutoff).await?;
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Expired unconfirmed payments");
        }
        Ok(expired.len())
    }

    /// Fallback for the no-transition case: the order either does not
    /// exist (404) or was already in a terminal state (return as-is).
    async fn require_order(&self, order_id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order not found: {order_id}")))
    }

    async fn notify(&self, order: &Order, kind: Notification) {
        let user = match self.users.find_by_id(&order.user_id.to_string()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(order = ?order.id, "Order owner missing, skipping notification");
                return;
            }
            Err(e) => {
                tracing::warn!(order = ?order.id, error = %e, "User lookup failed, skipping notification");
                return;
            }
        };
        if !user.wants_notifications() {
            return;
        }
        // Delivery is fire-and-forget off the request path
        let notifier = self.notifier.clone();
        let order = order.clone();
        tokio::spawn(async move {
            send_notification(notifier, kind, &user, &order).await;
        });
    }
}

#[derive(Clone, Copy)]
enum Notification {
    OrderConfirmed,
    Shipped,
}

async fn send_notification(notifier: Arc<dyn Notifier>, kind: Notification, user: &User, order: &Order) {
    match kind {
        Notification::OrderConfirmed => notifier.send_order_confirmation(user, order).await,
        Notification::Shipped => notifier.send_shipping_confirmation(user, order).await,
    }
}

/// Dashboard order-status rollup: how many orders sit in each lifecycle
/// class right now
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusCounts {
    pub total: i64,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub cancelled: i64,
}

pub async fn status_counts(orders: &OrderRepository) -> AppResult<OrderStatusCounts> {
    Ok(OrderStatusCounts {
        total: orders.count_all().await?,
        pending: orders.count_by_status(vec![OrderStatus::Pending]).await?,
        processing: orders.count_by_status(vec![OrderStatus::Processing]).await?,
        completed: orders.count_by_status(vec![OrderStatus::Completed]).await?,
        cancelled: orders.count_by_status(OrderStatus::CANCELLED.to_vec()).await?,
    })
}

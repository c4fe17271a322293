//! Order Repository
//!
//! All status transitions are single conditional `UPDATE ... WHERE`
//! statements: the idempotency check and the write happen in one database
//! statement, so two concurrent callbacks for the same order cannot both
//! pass the guard. A transition method returning `None` means the guard
//! rejected the write (already terminal), not that the order is missing.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_id};
use crate::db::models::{Order, OrderStatus, PaymentStatus, ShippingStatus};
use crate::db::seed::{INVOICE_COUNTER_KEY, INVOICE_COUNTER_TABLE};
use crate::utils::time;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Allocate the next invoice number
    ///
    /// Atomic increment of the counter document - a single-record UPDATE
    /// is atomic in SurrealDB, so concurrent checkouts get distinct,
    /// monotonically increasing numbers.
    pub async fn next_invoice_number(&self) -> RepoResult<i64> {
        #[derive(serde::Deserialize)]
        struct Counter {
            value: i64,
        }

        let counter_id = RecordId::from_table_key(INVOICE_COUNTER_TABLE, INVOICE_COUNTER_KEY);
        let mut result = self
            .base
            .db()
            .query("UPDATE $counter SET value += 1 RETURN AFTER")
            .bind(("counter", counter_id))
            .await?;
        let counter: Option<Counter> = result.take(0)?;
        counter
            .map(|c| c.value)
            .ok_or_else(|| RepoError::Database("Invoice counter not seeded".to_string()))
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(record_id(TABLE, id)).await?;
        Ok(order)
    }

    /// Latest orders, newest first
    pub async fn find_latest(&self, limit: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY createdAt DESC LIMIT $limit")
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        // userId is stored in string form, bind it the same way
        let uid = record_id("user", user_id).to_string();
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE userId = $uid ORDER BY createdAt DESC")
            .bind(("uid", uid))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Owner-scoped lookup for invoice display
    pub async fn find_for_user(&self, order_id: &str, user_id: &str) -> RepoResult<Option<Order>> {
        let oid = record_id(TABLE, order_id);
        let uid = record_id("user", user_id).to_string();
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE id = $oid AND userId = $uid LIMIT 1")
            .bind(("oid", oid))
            .bind(("uid", uid))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    pub async fn find_by_status(&self, statuses: Vec<OrderStatus>, limit: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE status IN $statuses ORDER BY createdAt DESC LIMIT $limit")
            .bind(("statuses", statuses))
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_payment_status(
        &self,
        payment_status: PaymentStatus,
        limit: i64,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE paymentStatus = $ps ORDER BY createdAt DESC LIMIT $limit")
            .bind(("ps", payment_status))
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn count_by_status(&self, statuses: Vec<OrderStatus>) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM order WHERE status IN $statuses GROUP ALL")
            .bind(("statuses", statuses))
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    pub async fn count_by_payment_status(&self, payment_status: PaymentStatus) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM order WHERE paymentStatus = $ps GROUP ALL")
            .bind(("ps", payment_status))
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    pub async fn count_all(&self) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM order GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    // =========================================================================
    // Conditional transitions
    // =========================================================================

    /// First successful payment callback wins: completes the payment and
    /// puts the order back to Pending (awaiting fulfillment). Returns the
    /// updated order only if this call performed the transition.
    pub async fn complete_payment(&self, order_id: &str) -> RepoResult<Option<Order>> {
        let oid = record_id(TABLE, order_id);
        let updated: Vec<Order> = self
            .base
            .db()
            .query(
                r#"
                UPDATE $oid SET
                    paymentStatus = $completed,
                    status = $pending,
                    updatedAt = $now
                WHERE status NOT IN $cancelled
                    AND status != $order_completed
                    AND paymentStatus != $completed
                RETURN AFTER
                "#,
            )
            .bind(("oid", oid))
            .bind(("completed", PaymentStatus::Completed))
            .bind(("pending", OrderStatus::Pending))
            .bind(("order_completed", OrderStatus::Completed))
            .bind(("cancelled", OrderStatus::CANCELLED.to_vec()))
            .bind(("now", time::now_millis()))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Payment failure callback: cancel everything unless the order is
    /// already terminal or the payment already went through (a late
    /// failure must not undo a recorded success)
    pub async fn cancel_payment(&self, order_id: &str) -> RepoResult<Option<Order>> {
        let oid = record_id(TABLE, order_id);
        let updated: Vec<Order> = self
            .base
            .db()
            .query(
                r#"
                UPDATE $oid SET
                    paymentStatus = $pay_cancelled,
                    shippingStatus = $ship_cancelled,
                    status = $payment_error,
                    updatedAt = $now
                WHERE status NOT IN $cancelled
                    AND status != $order_completed
                    AND paymentStatus != $pay_completed
                RETURN AFTER
                "#,
            )
            .bind(("oid", oid))
            .bind(("pay_cancelled", PaymentStatus::Cancelled))
            .bind(("pay_completed", PaymentStatus::Completed))
            .bind(("ship_cancelled", ShippingStatus::Cancelled))
            .bind(("payment_error", OrderStatus::CancelledByPaymentError))
            .bind(("order_completed", OrderStatus::Completed))
            .bind(("cancelled", OrderStatus::CANCELLED.to_vec()))
            .bind(("now", time::now_millis()))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Mark the order shipped, once
    pub async fn complete_shipping(&self, order_id: &str) -> RepoResult<Option<Order>> {
        let oid = record_id(TABLE, order_id);
        let updated: Vec<Order> = self
            .base
            .db()
            .query(
                r#"
                UPDATE $oid SET
                    shippingStatus = $ship_completed,
                    updatedAt = $now
                WHERE status NOT IN $cancelled
                    AND status != $order_completed
                    AND shippingStatus != $ship_completed
                RETURN AFTER
                "#,
            )
            .bind(("oid", oid))
            .bind(("ship_completed", ShippingStatus::Completed))
            .bind(("order_completed", OrderStatus::Completed))
            .bind(("cancelled", OrderStatus::CANCELLED.to_vec()))
            .bind(("now", time::now_millis()))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Bulk-cancel orders whose payment confirmation never arrived.
    /// Returns the orders this sweep transitioned.
    pub async fn expire_stale_payments(&self, cutoff_millis: i64) -> RepoResult<Vec<Order>> {
        let expired: Vec<Order> = self
            .base
            .db()
            .query(
                r#"
                UPDATE order SET
                    status = $cancelled_by_shop,
                    paymentStatus = $pay_cancelled,
                    updatedAt = $now
                WHERE paymentStatus IN $pending
                    AND createdAt <= $cutoff
                RETURN AFTER
                "#,
            )
            .bind(("cancelled_by_shop", OrderStatus::CancelledByShop))
            .bind(("pay_cancelled", PaymentStatus::Cancelled))
            .bind(("pending", PaymentStatus::PENDING.to_vec()))
            .bind(("cutoff", cutoff_millis))
            .bind(("now", time::now_millis()))
            .await?
            .take(0)?;
        Ok(expired)
    }

    // =========================================================================
    // Rebuild queries
    // =========================================================================

    /// All paid orders, oldest first (nightly rebuild input).
    ///
    /// A sale is a completed payment: once paid an order can no longer be
    /// cancelled, so this is the same population the incremental path
    /// counted one order at a time.
    pub async fn find_paid(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE paymentStatus = $paid ORDER BY createdAt")
            .bind(("paid", PaymentStatus::Completed))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Paid orders containing a line for the given product
    pub async fn find_paid_for_product(&self, product_id: &RecordId) -> RepoResult<Vec<Order>> {
        let pid = product_id.to_string();
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM order WHERE paymentStatus = $paid AND $pid IN products.productId ORDER BY createdAt",
            )
            .bind(("paid", PaymentStatus::Completed))
            .bind(("pid", pid))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_paid_by_user(&self, user_id: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE paymentStatus = $paid AND userId = $uid")
            .bind(("paid", PaymentStatus::Completed))
            .bind(("uid", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }
}

//! Startup seeding
//!
//! Idempotent: re-running on every boot leaves existing data untouched
//! except the status label reference table, which is always rewritten from
//! the enum definitions so labels can never drift from the code.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::models::status::{
    OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod, ShippingStatus, StatusLabel,
};
use crate::utils::{AppError, AppResult};

pub const STATUS_LABEL_TABLE: &str = "status_label";
pub const INVOICE_COUNTER_TABLE: &str = "counter";
pub const INVOICE_COUNTER_KEY: &str = "invoice";

pub async fn seed(db: &Surreal<Db>) -> AppResult<()> {
    seed_status_labels(db).await?;
    seed_invoice_counter(db).await?;
    Ok(())
}

/// Rewrite the bilingual label table from the enum definitions
async fn seed_status_labels(db: &Surreal<Db>) -> AppResult<()> {
    let mut labels: Vec<StatusLabel> = Vec::new();

    let push = |labels: &mut Vec<StatusLabel>, kind: &str, code: String, name| {
        labels.push(StatusLabel {
            kind: kind.to_string(),
            code,
            name,
        });
    };

    for s in OrderStatus::ALL {
        push(&mut labels, "order_status", enum_code(&s)?, s.label());
    }
    for s in PaymentStatus::ALL {
        push(&mut labels, "payment_status", enum_code(&s)?, s.label());
    }
    for s in ShippingStatus::ALL {
        push(&mut labels, "shipping_status", enum_code(&s)?, s.label());
    }
    for s in PaymentMethod::ALL {
        push(&mut labels, "payment_method", enum_code(&s)?, s.label());
    }
    for s in ShippingMethod::ALL {
        push(&mut labels, "shipping_method", enum_code(&s)?, s.label());
    }

    db.query(format!("DELETE {STATUS_LABEL_TABLE}")).await?;
    for label in labels {
        let _: Option<StatusLabel> = db.create(STATUS_LABEL_TABLE).content(label).await?;
    }
    Ok(())
}

/// SCREAMING_SNAKE_CASE wire code of a status enum variant
fn enum_code<T: serde::Serialize>(value: &T) -> AppResult<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        _ => Err(AppError::internal("status variant did not serialize to a string")),
    }
}

/// Create the invoice counter at 0 if it does not exist yet
async fn seed_invoice_counter(db: &Surreal<Db>) -> AppResult<()> {
    #[derive(serde::Serialize, serde::Deserialize)]
    struct Counter {
        value: i64,
    }

    let existing: Option<Counter> = db
        .select((INVOICE_COUNTER_TABLE, INVOICE_COUNTER_KEY))
        .await?;
    if existing.is_none() {
        let _: Option<Counter> = db
            .create((INVOICE_COUNTER_TABLE, INVOICE_COUNTER_KEY))
            .content(Counter { value: 0 })
            .await?;
    }
    Ok(())
}

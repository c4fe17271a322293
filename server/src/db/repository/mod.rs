//! Repository Module
//!
//! One repository per table. Raw SurrealQL for anything beyond id lookups;
//! ids follow the "table:id" convention end to end.

// Catalog
pub mod category;
pub mod product;

// Accounts
pub mod user;

// Orders
pub mod order;

// Derived statistics
pub mod product_view;
pub mod statistic;

// System
pub mod error_log;

// Re-exports
pub use category::CategoryRepository;
pub use error_log::ErrorLogRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use product_view::ProductViewRepository;
pub use statistic::{GeneralStatisticRepository, ProductStatisticRepository};
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => crate::utils::AppError::NotFound(msg),
            RepoError::Duplicate(msg) => crate::utils::AppError::Conflict(msg),
            RepoError::Database(msg) => crate::utils::AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Parse an id that may or may not carry its table prefix
/// ("order:abc" and "abc" both resolve within `table`)
pub fn record_id(table: &str, id: &str) -> RecordId {
    match id.split_once(':') {
        Some((tb, key)) if tb == table => RecordId::from_table_key(table, key),
        _ => RecordId::from_table_key(table, id),
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Row shape of `SELECT count() ... GROUP ALL` queries
#[derive(Debug, serde::Deserialize)]
pub(crate) struct CountRow {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_accepts_both_forms() {
        let a = record_id("order", "order:abc123");
        let b = record_id("order", "abc123");
        assert_eq!(a, b);
        assert_eq!(a.table(), "order");
    }

    #[test]
    fn record_id_foreign_prefix_is_opaque_key() {
        // a stray "user:x" asked for in the order table must not escape the table
        let id = record_id("order", "user:x");
        assert_eq!(id.table(), "order");
    }
}

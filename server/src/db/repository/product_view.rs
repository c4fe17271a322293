//! Product View Repository
//!
//! Append-only raw view events; the rebuild paths re-bucket them by day
//! and month.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, CountRow, RepoError, RepoResult};
use crate::db::models::ProductView;

const TABLE: &str = "product_view";

#[derive(Clone)]
pub struct ProductViewRepository {
    base: BaseRepository,
}

impl ProductViewRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn append(&self, view: ProductView) -> RepoResult<ProductView> {
        let created: Option<ProductView> = self.base.db().create(TABLE).content(view).await?;
        created.ok_or_else(|| RepoError::Database("Failed to record product view".to_string()))
    }

    pub async fn find_for_product(&self, product_id: &RecordId) -> RepoResult<Vec<ProductView>> {
        let views: Vec<ProductView> = self
            .base
            .db()
            .query("SELECT * FROM product_view WHERE productId = $pid ORDER BY createdAt")
            .bind(("pid", product_id.to_string()))
            .await?
            .take(0)?;
        Ok(views)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<ProductView>> {
        let views: Vec<ProductView> = self
            .base
            .db()
            .query("SELECT * FROM product_view ORDER BY createdAt")
            .await?
            .take(0)?;
        Ok(views)
    }

    pub async fn count_all(&self) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM product_view GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    pub async fn count_for_product(&self, product_id: &RecordId) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM product_view WHERE productId = $pid GROUP ALL")
            .bind(("pid", product_id.to_string()))
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}

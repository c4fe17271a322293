//! Product Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_id};
use crate::db::models::{Product, ProductUpdate};
use crate::utils::time;

const TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_visible(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE visible = true ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(record_id(TABLE, id)).await?;
        Ok(product)
    }

    /// Authoritative multi-id fetch for checkout: returns only the products
    /// that exist, in no particular order. Callers detect missing ids by
    /// comparing lengths.
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE id IN $ids")
            .bind(("ids", ids.to_vec()))
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_category(&self, category_id: &RecordId) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE $cid IN categories")
            .bind(("cid", category_id.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn create(&self, product: Product) -> RepoResult<Product> {
        let created: Option<Product> = self.base.db().create(TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    pub async fn update(&self, id: &str, update: ProductUpdate) -> RepoResult<Option<Product>> {
        let mut data = serde_json::to_value(&update)
            .map_err(|e| RepoError::Database(e.to_string()))?;
        if let Some(map) = data.as_object_mut() {
            map.insert("updated_at".to_string(), time::now_millis().into());
        }
        let updated: Vec<Product> = self
            .base
            .db()
            .query("UPDATE $pid MERGE $data RETURN AFTER")
            .bind(("pid", record_id(TABLE, id)))
            .bind(("data", data))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Product>> {
        let deleted: Option<Product> = self.base.db().delete(record_id(TABLE, id)).await?;
        Ok(deleted)
    }

    /// Incremental sale bump on the lifetime counters
    pub async fn bump_sells(&self, id: &RecordId, amount: f64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $pid SET sells += $amount, updated_at = $now")
            .bind(("pid", id.clone()))
            .bind(("amount", amount))
            .bind(("now", time::now_millis()))
            .await?;
        Ok(())
    }

    /// Incremental view bump
    pub async fn bump_views(&self, id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $pid SET views += 1")
            .bind(("pid", id.clone()))
            .await?;
        Ok(())
    }

    /// Rebuild write: overwrite the lifetime counters with recomputed values
    pub async fn set_sells_views(&self, id: &RecordId, sells: f64, views: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $pid SET sells = $sells, views = $views")
            .bind(("pid", id.clone()))
            .bind(("sells", sells))
            .bind(("views", views))
            .await?;
        Ok(())
    }

    pub async fn clear_hot_flags(&self) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE product SET is_hot = false WHERE is_hot = true")
            .await?;
        Ok(())
    }

    pub async fn mark_hot(&self, ids: Vec<RecordId>) -> RepoResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.base
            .db()
            .query("UPDATE product SET is_hot = true WHERE id IN $ids")
            .bind(("ids", ids))
            .await?;
        Ok(())
    }

    /// Top sellers by lifetime euros sold, ties broken arbitrarily
    pub async fn find_top_sellers(&self, limit: i64) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE sells > 0 ORDER BY sells DESC LIMIT $limit")
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn count_all(&self) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM product GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    pub async fn count_visible(&self) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM product WHERE visible = true GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}

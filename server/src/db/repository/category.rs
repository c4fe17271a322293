//! Category Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_id};
use crate::db::models::{Category, CategoryUpdate};

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY sort_order")
            .await?
            .take(0)?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let category: Option<Category> = self.base.db().select(record_id(TABLE, id)).await?;
        Ok(category)
    }

    pub async fn create(&self, category: Category) -> RepoResult<Category> {
        let created: Option<Category> = self.base.db().create(TABLE).content(category).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    pub async fn update(&self, id: &str, update: CategoryUpdate) -> RepoResult<Option<Category>> {
        let updated: Vec<Category> = self
            .base
            .db()
            .query("UPDATE $cid MERGE $data RETURN AFTER")
            .bind(("cid", record_id(TABLE, id)))
            .bind(("data", update))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    pub async fn delete(&self, id: &str) -> RepoResult<Option<Category>> {
        let deleted: Option<Category> = self.base.db().delete(record_id(TABLE, id)).await?;
        Ok(deleted)
    }

    /// Nightly rollup write
    pub async fn set_rollups(
        &self,
        id: &RecordId,
        product_count: i64,
        total_sells: f64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $cid SET product_count = $count, total_sells = $sells")
            .bind(("cid", id.clone()))
            .bind(("count", product_count))
            .bind(("sells", total_sells))
            .await?;
        Ok(())
    }

    pub async fn count_all(&self) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM category GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}

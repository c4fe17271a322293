//! Statistics Repositories
//!
//! `product_statistic` holds one document per product; `general_statistic`
//! is a singleton at a fixed record id. Both are derived data: rebuild
//! writes replace the documents wholesale.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{GeneralStatistic, ProductStatistic};

const PRODUCT_TABLE: &str = "product_statistic";
const GENERAL_TABLE: &str = "general_statistic";
const GENERAL_KEY: &str = "current";

#[derive(Clone)]
pub struct ProductStatisticRepository {
    base: BaseRepository,
}

impl ProductStatisticRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_product(&self, product_id: &RecordId) -> RepoResult<Option<ProductStatistic>> {
        let stats: Vec<ProductStatistic> = self
            .base
            .db()
            .query("SELECT * FROM product_statistic WHERE productId = $pid LIMIT 1")
            .bind(("pid", product_id.to_string()))
            .await?
            .take(0)?;
        Ok(stats.into_iter().next())
    }

    pub async fn create(&self, stat: ProductStatistic) -> RepoResult<ProductStatistic> {
        let created: Option<ProductStatistic> =
            self.base.db().create(PRODUCT_TABLE).content(stat).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product statistic".to_string()))
    }

    /// Write back a mutated statistic document (incremental bump path)
    pub async fn save(&self, stat: ProductStatistic) -> RepoResult<ProductStatistic> {
        match stat.id.clone() {
            Some(id) => {
                // update() rejects a body that still carries the record id
                let body = ProductStatistic { id: None, ..stat };
                let updated: Option<ProductStatistic> =
                    self.base.db().update(id).content(body).await?;
                updated.ok_or_else(|| {
                    RepoError::NotFound("Product statistic not found".to_string())
                })
            }
            None => self.create(stat).await,
        }
    }

    /// Rebuild write: drop the old document for this product and insert the
    /// recomputed one
    pub async fn replace_for_product(&self, stat: ProductStatistic) -> RepoResult<ProductStatistic> {
        self.delete_for_product(&stat.product_id).await?;
        let fresh = ProductStatistic { id: None, ..stat };
        self.create(fresh).await
    }

    pub async fn delete_for_product(&self, product_id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE product_statistic WHERE productId = $pid")
            .bind(("pid", product_id.to_string()))
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct GeneralStatisticRepository {
    base: BaseRepository,
}

impl GeneralStatisticRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn get(&self) -> RepoResult<Option<GeneralStatistic>> {
        let stat: Option<GeneralStatistic> =
            self.base.db().select((GENERAL_TABLE, GENERAL_KEY)).await?;
        Ok(stat)
    }

    /// Replace the singleton wholesale
    pub async fn replace(&self, stat: GeneralStatistic) -> RepoResult<GeneralStatistic> {
        let _: Option<GeneralStatistic> = self
            .base
            .db()
            .delete((GENERAL_TABLE, GENERAL_KEY))
            .await?;
        let fresh = GeneralStatistic { id: None, ..stat };
        let created: Option<GeneralStatistic> = self
            .base
            .db()
            .create((GENERAL_TABLE, GENERAL_KEY))
            .content(fresh)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to write general statistic".to_string()))
    }

    /// Incremental write-back of a mutated snapshot (creates the singleton
    /// on first write)
    pub async fn save(&self, stat: GeneralStatistic) -> RepoResult<GeneralStatistic> {
        let fresh = GeneralStatistic { id: None, ..stat };
        let updated: Option<GeneralStatistic> = self
            .base
            .db()
            .upsert((GENERAL_TABLE, GENERAL_KEY))
            .content(fresh)
            .await?;
        updated.ok_or_else(|| RepoError::Database("Failed to write general statistic".to_string()))
    }
}

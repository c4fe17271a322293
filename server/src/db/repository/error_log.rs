//! Error Log Repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoResult};
use crate::db::models::ErrorLog;

const TABLE: &str = "error_log";

#[derive(Clone)]
pub struct ErrorLogRepository {
    base: BaseRepository,
}

impl ErrorLogRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn insert(&self, log: ErrorLog) -> RepoResult<()> {
        let _: Option<ErrorLog> = self.base.db().create(TABLE).content(log).await?;
        Ok(())
    }

    pub async fn find_latest(&self, limit: i64) -> RepoResult<Vec<ErrorLog>> {
        let logs: Vec<ErrorLog> = self
            .base
            .db()
            .query("SELECT * FROM error_log ORDER BY created_at DESC LIMIT $limit")
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(logs)
    }
}

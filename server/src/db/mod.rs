//! Database Module
//!
//! Embedded SurrealDB store. `DbService` owns the connection handle and
//! runs the startup seeding (status label reference table and the
//! invoice counter).

pub mod models;
pub mod repository;
pub mod seed;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

/// Namespace / database names inside the embedded store
const NAMESPACE: &str = "dexmate";
const DATABASE: &str = "shop";

/// Database service - owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk store and run startup seeding
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        seed::seed(&db).await?;
        tracing::info!(path = %db_path, "Database ready (embedded SurrealDB)");
        Ok(Self { db })
    }

    /// Open an in-memory store (tests)
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        seed::seed(&db).await?;
        Ok(Self { db })
    }
}

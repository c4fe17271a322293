//! User Repository

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, CountRow, RepoError, RepoResult, record_id};
use crate::db::models::{Cart, User};
use crate::utils::time;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select(record_id(TABLE, id)).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn create(&self, user: User) -> RepoResult<User> {
        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Full-document write-back (profile backfill during checkout)
    pub async fn save(&self, user: User) -> RepoResult<User> {
        let id = user
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Cannot save user without id".to_string()))?;
        // password is skip_serializing on the model, so content() would
        // wipe it; write it back explicitly. The id is stripped from the
        // body because update() rejects documents that carry one.
        let password = user.password.clone();
        let body = User { id: None, ..user };
        let updated: Option<User> = self.base.db().update(id.clone()).content(body).await?;
        self.base
            .db()
            .query("UPDATE $uid SET password = $password")
            .bind(("uid", id))
            .bind(("password", password))
            .await?;
        updated.ok_or_else(|| RepoError::NotFound("User not found".to_string()))
    }

    /// Incremental lifetime counter bump on a completed order
    pub async fn bump_order_counters(
        &self,
        id: &RecordId,
        items: i64,
        spent: f64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"
                UPDATE $uid SET
                    orders += 1,
                    totalItemsInOrders += $items,
                    totalSpentInOrders += $spent,
                    updatedAt = $now
                "#,
            )
            .bind(("uid", id.clone()))
            .bind(("items", items))
            .bind(("spent", spent))
            .bind(("now", time::now_millis()))
            .await?;
        Ok(())
    }

    /// Rebuild write: overwrite the lifetime counters with recomputed values
    pub async fn set_order_counters(
        &self,
        id: &RecordId,
        orders: i64,
        items: i64,
        spent: f64,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                r#"
                UPDATE $uid SET
                    orders = $orders,
                    totalItemsInOrders = $items,
                    totalSpentInOrders = $spent
                "#,
            )
            .bind(("uid", id.clone()))
            .bind(("orders", orders))
            .bind(("items", items))
            .bind(("spent", spent))
            .await?;
        Ok(())
    }

    pub async fn update_cart(&self, id: &str, cart: Cart) -> RepoResult<Option<User>> {
        let updated: Vec<User> = self
            .base
            .db()
            .query("UPDATE $uid SET cart = $cart, updatedAt = $now RETURN AFTER")
            .bind(("uid", record_id(TABLE, id)))
            .bind(("cart", cart))
            .bind(("now", time::now_millis()))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next())
    }

    /// Biggest lifetime spenders, for the statistics dashboard
    pub async fn top_customers(&self, limit: i64) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE orders > 0 ORDER BY totalSpentInOrders DESC LIMIT $limit")
            .bind(("limit", limit))
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn count_all(&self) -> RepoResult<i64> {
        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM user GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}

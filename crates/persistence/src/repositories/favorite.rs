//! Favorite repository.

use async_trait::async_trait;
use domain::stores::{FavoriteStore, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::store_error;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteStore for FavoriteRepository {
    async fn delete_favorite(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_favorite");
        let result = sqlx::query(
            r#"
            DELETE FROM group_favorites
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }

    async fn insert_favorite(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let timer = QueryTimer::new("insert_favorite");
        let result = sqlx::query(
            r#"
            INSERT INTO group_favorites (group_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map(|_| ()).map_err(store_error)
    }
}

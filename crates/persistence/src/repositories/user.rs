//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, username, password_hash, first_name, last_name, bio, \
                            avatar_url, created_at, updated_at";

/// Profile fields that may be changed by the user. `None` keeps the value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result
    }

    /// Find users by IDs, in no particular order.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_users_by_ids");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result
    }

    /// Find a user by email address, case-insensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result
    }

    /// Directory listing ordered by username. Every pattern must match the
    /// username, email, first name or last name.
    pub async fn search(
        &self,
        patterns: &[String],
        limit: i64,
    ) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_users");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE NOT EXISTS (
                SELECT 1 FROM unnest($1::text[]) AS term
                WHERE NOT (
                    username ILIKE term OR email ILIKE term
                    OR first_name ILIKE term OR last_name ILIKE term
                )
            )
            ORDER BY username ASC
            LIMIT $2
            "#
        ))
        .bind(patterns)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result
    }

    /// Create a new user account. Duplicate email or username fails with a
    /// unique violation.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (email, username, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result
    }

    /// Update the user's profile fields.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate<'_>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                bio = COALESCE($4, bio),
                avatar_url = COALESCE($5, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.bio)
        .bind(update.avatar_url)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result
    }
}

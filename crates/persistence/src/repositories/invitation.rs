//! Invitation repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::invitation::{GroupInvitation, NewInvitation};
use domain::stores::{InvitationStore, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GroupInvitationEntity;
use crate::error::store_error;
use crate::metrics::QueryTimer;

/// Repository for group invitations. Rows are never deleted.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationStore for InvitationRepository {
    async fn insert_invitation(&self, invitation: NewInvitation) -> StoreResult<GroupInvitation> {
        let timer = QueryTimer::new("insert_invitation");
        let result = sqlx::query_as::<_, GroupInvitationEntity>(
            r#"
            INSERT INTO group_invitations (token, group_id, created_by, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING token, group_id, created_by, created_at, expires_at, is_active
            "#,
        )
        .bind(invitation.token)
        .bind(invitation.group_id)
        .bind(invitation.created_by)
        .bind(invitation.created_at)
        .bind(invitation.expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map(Into::into).map_err(store_error)
    }

    async fn find_active_invitation(&self, token: Uuid) -> StoreResult<Option<GroupInvitation>> {
        let timer = QueryTimer::new("find_active_invitation");
        let result = sqlx::query_as::<_, GroupInvitationEntity>(
            r#"
            SELECT i.token, i.group_id, i.created_by, i.created_at, i.expires_at, i.is_active
            FROM group_invitations i
            JOIN groups g ON g.id = i.group_id
            WHERE i.token = $1 AND i.is_active = true AND g.is_active = true
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn deactivate_invitation(&self, token: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new("deactivate_invitation");
        let result = sqlx::query(
            r#"
            UPDATE group_invitations
            SET is_active = false
            WHERE token = $1 AND is_active = true
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }

    async fn list_active_invitations(
        &self,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<GroupInvitation>> {
        let timer = QueryTimer::new("list_active_invitations");
        let result = sqlx::query_as::<_, GroupInvitationEntity>(
            r#"
            SELECT token, group_id, created_by, created_at, expires_at, is_active
            FROM group_invitations
            WHERE group_id = $1
              AND is_active = true
              AND (expires_at IS NULL OR expires_at >= $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(group_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

//! Group repository: groups and memberships.

use async_trait::async_trait;
use domain::models::group::{
    Group, GroupChanges, GroupListFilter, GroupRole, GroupSummary, Membership, NewGroup,
};
use domain::stores::{GroupStore, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    GroupEntity, GroupMembershipEntity, GroupPrivacyDb, GroupRoleDb, GroupSummaryEntity,
};
use crate::error::store_error;
use crate::metrics::QueryTimer;

const GROUP_COLUMNS: &str =
    "id, name, description, privacy, created_by, is_active, created_at, updated_at";

/// Repository for group-related database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_group_with_admin(
        &self,
        group: &NewGroup,
    ) -> Result<(GroupEntity, GroupMembershipEntity), sqlx::Error> {
        // Dropping the transaction without commit rolls back the group insert.
        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            INSERT INTO groups (name, description, privacy, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&group.name)
        .bind(&group.description)
        .bind(GroupPrivacyDb::from(group.privacy))
        .bind(group.created_by)
        .fetch_one(&mut *tx)
        .await?;

        let membership = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            INSERT INTO group_memberships (group_id, user_id, role)
            VALUES ($1, $2, 'admin')
            RETURNING id, group_id, user_id, role, joined_at
            "#,
        )
        .bind(group.id)
        .bind(group.created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((group, membership))
    }
}

#[async_trait]
impl GroupStore for GroupRepository {
    async fn create_group_with_admin(&self, group: NewGroup) -> StoreResult<(Group, Membership)> {
        let timer = QueryTimer::new("create_group_with_admin");
        let result = self.insert_group_with_admin(&group).await;
        timer.finish(result.is_ok());
        let (group, membership) = result.map_err(store_error)?;
        Ok((group.into(), membership.into()))
    }

    async fn find_group(&self, group_id: Uuid) -> StoreResult<Option<Group>> {
        let timer = QueryTimer::new("find_group");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
            WHERE id = $1 AND is_active = true
            "#
        ))
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn update_group(
        &self,
        group_id: Uuid,
        changes: GroupChanges,
    ) -> StoreResult<Option<Group>> {
        let timer = QueryTimer::new("update_group");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            UPDATE groups
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                privacy = COALESCE($4, privacy),
                updated_at = NOW()
            WHERE id = $1 AND is_active = true
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group_id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.privacy.map(GroupPrivacyDb::from))
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn deactivate_group(&self, group_id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new("deactivate_group");
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET is_active = false, updated_at = NOW()
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(group_id)
        .execute(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.rows_affected() > 0)
    }

    async fn insert_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> StoreResult<Membership> {
        let timer = QueryTimer::new("insert_membership");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            INSERT INTO group_memberships (group_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, group_id, user_id, role, joined_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(GroupRoleDb::from(role))
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map(Into::into).map_err(store_error)
    }

    async fn find_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let timer = QueryTimer::new("find_membership");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT id, group_id, user_id, role, joined_at
            FROM group_memberships
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn delete_membership(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_membership");
        let result = sqlx::query(
            r#"
            DELETE FROM group_memberships
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

    async fn count_members(&self, group_id: Uuid) -> StoreResult<i64> {
        let timer = QueryTimer::new("count_members");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM group_memberships WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map_err(store_error)
    }

    async fn list_members(&self, group_id: Uuid) -> StoreResult<Vec<Membership>> {
        let timer = QueryTimer::new("list_members");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT id, group_id, user_id, role, joined_at
            FROM group_memberships
            WHERE group_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn list_groups_for_user(
        &self,
        filter: GroupListFilter,
    ) -> StoreResult<Vec<GroupSummary>> {
        let timer = QueryTimer::new("list_groups_for_user");
        let result = sqlx::query_as::<_, GroupSummaryEntity>(
            r#"
            SELECT
                g.id, g.name, g.description, g.privacy,
                gm.role, gm.joined_at,
                (SELECT COUNT(*) FROM group_memberships WHERE group_id = g.id) AS member_count,
                (SELECT COUNT(*) FROM competitions WHERE group_id = g.id) AS competition_count,
                EXISTS (
                    SELECT 1 FROM group_favorites f
                    WHERE f.group_id = g.id AND f.user_id = $1
                ) AS is_favorite
            FROM groups g
            JOIN group_memberships gm ON g.id = gm.group_id
            WHERE gm.user_id = $1 AND g.is_active = true
              AND ($2::uuid IS NULL OR g.created_by = $2)
              AND NOT EXISTS (
                  SELECT 1 FROM unnest($3::text[]) AS term
                  WHERE NOT (g.name ILIKE term OR g.description ILIKE term)
              )
            ORDER BY gm.joined_at DESC
            "#,
        )
        .bind(filter.member_id)
        .bind(filter.creator)
        .bind(filter.search.like_patterns())
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

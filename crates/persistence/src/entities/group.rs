//! Group, membership and favorite entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::group::{
    Group, GroupPrivacy, GroupRole, GroupSummary, Membership,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for group_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
pub enum GroupRoleDb {
    Member,
    Admin,
}

impl From<GroupRoleDb> for GroupRole {
    fn from(db_role: GroupRoleDb) -> Self {
        match db_role {
            GroupRoleDb::Member => GroupRole::Member,
            GroupRoleDb::Admin => GroupRole::Admin,
        }
    }
}

impl From<GroupRole> for GroupRoleDb {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Member => GroupRoleDb::Member,
            GroupRole::Admin => GroupRoleDb::Admin,
        }
    }
}

/// Database enum for group_privacy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_privacy", rename_all = "lowercase")]
pub enum GroupPrivacyDb {
    Private,
    Public,
}

impl From<GroupPrivacyDb> for GroupPrivacy {
    fn from(db: GroupPrivacyDb) -> Self {
        match db {
            GroupPrivacyDb::Private => GroupPrivacy::Private,
            GroupPrivacyDb::Public => GroupPrivacy::Public,
        }
    }
}

impl From<GroupPrivacy> for GroupPrivacyDb {
    fn from(privacy: GroupPrivacy) -> Self {
        match privacy {
            GroupPrivacy::Private => GroupPrivacyDb::Private,
            GroupPrivacy::Public => GroupPrivacyDb::Public,
        }
    }
}

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacyDb,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            privacy: entity.privacy.into(),
            created_by: entity.created_by,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the group_memberships table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMembershipEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
}

impl From<GroupMembershipEntity> for Membership {
    fn from(entity: GroupMembershipEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            joined_at: entity.joined_at,
        }
    }
}

/// Group joined with the requesting user's membership and aggregates.
#[derive(Debug, Clone, FromRow)]
pub struct GroupSummaryEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacyDb,
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
    pub member_count: i64,
    pub competition_count: i64,
    pub is_favorite: bool,
}

impl From<GroupSummaryEntity> for GroupSummary {
    fn from(entity: GroupSummaryEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            privacy: entity.privacy.into(),
            member_count: entity.member_count,
            competition_count: entity.competition_count,
            is_favorite: entity.is_favorite,
            your_role: entity.role.into(),
            joined_at: entity.joined_at,
        }
    }
}

//! Group invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::invitation::GroupInvitation;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the group_invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupInvitationEntity {
    pub token: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<GroupInvitationEntity> for GroupInvitation {
    fn from(entity: GroupInvitationEntity) -> Self {
        Self {
            token: entity.token,
            group_id: entity.group_id,
            created_by: entity.created_by,
            created_at: entity.created_at,
            expires_at: entity.expires_at,
            is_active: entity.is_active,
        }
    }
}

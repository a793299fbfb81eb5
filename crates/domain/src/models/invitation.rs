//! Group invitation models.
//!
//! An invitation is a random token granting join rights to one group. It is
//! active until it expires or is revoked, and once deactivated it stays so.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::group::{GroupPrivacy, GroupRole};

/// Lifetime of a freshly issued invitation.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// A time-limited join token for a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupInvitation {
    pub token: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Observable state of an invitation at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Active,
    /// Still flagged active but past its expiry; not yet persisted.
    Expired,
    Deactivated,
}

impl GroupInvitation {
    pub fn state(&self, now: DateTime<Utc>) -> InvitationState {
        if !self.is_active {
            InvitationState::Deactivated
        } else if is_expired(self, now) {
            InvitationState::Expired
        } else {
            InvitationState::Active
        }
    }
}

/// True when the invitation has an expiry and `now` is past it.
pub fn is_expired(invitation: &GroupInvitation, now: DateTime<Utc>) -> bool {
    invitation.expires_at.is_some_and(|expires_at| now > expires_at)
}

/// Expiry for an invitation issued at `issued_at`.
pub fn expiry_from(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + Duration::days(INVITATION_TTL_DAYS)
}

/// Input for persisting an invitation.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub token: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Group info shown to someone holding an invitation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitedGroupInfo {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: GroupPrivacy,
    pub member_count: i64,
}

/// Result of verifying an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VerifyInvitationResponse {
    pub group: InvitedGroupInfo,
    pub expires_at: Option<DateTime<Utc>>,
    pub already_member: bool,
}

/// Result of joining through an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct JoinInvitationResponse {
    pub group_id: Uuid,
    pub already_member: bool,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Response after creating an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateInvitationResponse {
    pub token: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub invite_url: String,
}

impl CreateInvitationResponse {
    pub fn new(invitation: GroupInvitation, base_url: &str) -> Self {
        let invite_url = format!(
            "{}/invitations/{}",
            base_url.trim_end_matches('/'),
            invitation.token
        );
        Self {
            token: invitation.token,
            group_id: invitation.group_id,
            created_by: invitation.created_by,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
            invite_url,
        }
    }
}

/// Invitation entry in an admin listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationSummary {
    pub token: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<GroupInvitation> for InvitationSummary {
    fn from(invitation: GroupInvitation) -> Self {
        Self {
            token: invitation.token,
            created_by: invitation.created_by,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListInvitationsResponse {
    pub data: Vec<InvitationSummary>,
}

//! Invitation lifecycle: issue, verify, expire, revoke and consume tokens.
//!
//! Expiry is detected lazily. The first verify or join after `expires_at`
//! persists the deactivation and reports `InvitationExpired` in the same call.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::membership::{add_member, require_admin};
use crate::errors::DomainError;
use crate::models::group::{Group, GroupRole};
use crate::models::invitation::{
    expiry_from, GroupInvitation, InvitationState, InvitedGroupInfo, NewInvitation,
};
use crate::stores::{GroupStore, InvitationStore};

/// Outcome of verifying a token.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedInvitation {
    pub invitation: GroupInvitation,
    pub group: InvitedGroupInfo,
    pub already_member: bool,
}

/// Outcome of joining with a token.
#[derive(Debug, Clone, PartialEq)]
pub struct InvitationJoin {
    pub group_id: Uuid,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
    /// True when the user was a member before this call; no row was written.
    pub already_member: bool,
}

/// Issues a new invitation valid for seven days. Admins only.
pub async fn create_invitation(
    groups: &dyn GroupStore,
    invitations: &dyn InvitationStore,
    group_id: Uuid,
    requester: Uuid,
    now: DateTime<Utc>,
) -> Result<GroupInvitation, DomainError> {
    require_admin(groups, group_id, requester).await?;

    let invitation = invitations
        .insert_invitation(NewInvitation {
            token: Uuid::new_v4(),
            group_id,
            created_by: requester,
            created_at: now,
            expires_at: Some(expiry_from(now)),
        })
        .await?;

    info!(
        group_id = %group_id,
        user_id = %requester,
        expires_at = ?invitation.expires_at,
        "Invitation created"
    );
    Ok(invitation)
}

/// Loads an active invitation and its group, applying lazy expiry.
async fn load_valid(
    groups: &dyn GroupStore,
    invitations: &dyn InvitationStore,
    token: Uuid,
    now: DateTime<Utc>,
) -> Result<(GroupInvitation, Group), DomainError> {
    let invitation = invitations
        .find_active_invitation(token)
        .await?
        .ok_or_else(|| DomainError::not_found("Invitation not found or no longer active"))?;

    match invitation.state(now) {
        InvitationState::Active => {}
        InvitationState::Expired => {
            invitations.deactivate_invitation(token).await?;
            warn!(
                group_id = %invitation.group_id,
                token = %token,
                "Invitation expired and was deactivated"
            );
            return Err(DomainError::InvitationExpired);
        }
        InvitationState::Deactivated => {
            return Err(DomainError::not_found(
                "Invitation not found or no longer active",
            ))
        }
    }

    let group = groups
        .find_group(invitation.group_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Invitation not found or no longer active"))?;

    Ok((invitation, group))
}

/// Checks a token and reports whether `user_id` already belongs to the group.
pub async fn verify_invitation(
    groups: &dyn GroupStore,
    invitations: &dyn InvitationStore,
    token: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<VerifiedInvitation, DomainError> {
    let (invitation, group) = load_valid(groups, invitations, token, now).await?;

    let already_member = groups.find_membership(group.id, user_id).await?.is_some();
    let member_count = groups.count_members(group.id).await?;

    Ok(VerifiedInvitation {
        invitation,
        group: InvitedGroupInfo {
            id: group.id,
            name: group.name,
            description: group.description,
            privacy: group.privacy,
            member_count,
        },
        already_member,
    })
}

/// Joins the invitation's group as a member. Idempotent for existing members.
pub async fn join_with_invitation(
    groups: &dyn GroupStore,
    invitations: &dyn InvitationStore,
    token: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<InvitationJoin, DomainError> {
    let (_, group) = load_valid(groups, invitations, token, now).await?;

    if let Some(existing) = groups.find_membership(group.id, user_id).await? {
        return Ok(InvitationJoin {
            group_id: group.id,
            role: existing.role,
            joined_at: existing.joined_at,
            already_member: true,
        });
    }

    match add_member(groups, group.id, user_id, GroupRole::Member).await {
        Ok(membership) => Ok(InvitationJoin {
            group_id: group.id,
            role: membership.role,
            joined_at: membership.joined_at,
            already_member: false,
        }),
        // Lost a race with a concurrent join for the same user.
        Err(DomainError::DuplicateMembership) => {
            let existing = groups
                .find_membership(group.id, user_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Membership not found"))?;
            Ok(InvitationJoin {
                group_id: group.id,
                role: existing.role,
                joined_at: existing.joined_at,
                already_member: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Deactivates an invitation of the group. Admins only.
pub async fn revoke_invitation(
    groups: &dyn GroupStore,
    invitations: &dyn InvitationStore,
    group_id: Uuid,
    token: Uuid,
    requester: Uuid,
) -> Result<(), DomainError> {
    require_admin(groups, group_id, requester).await?;

    let invitation = invitations
        .find_active_invitation(token)
        .await?
        .filter(|inv| inv.group_id == group_id)
        .ok_or_else(|| DomainError::not_found("Invitation not found"))?;

    if !invitations.deactivate_invitation(invitation.token).await? {
        return Err(DomainError::not_found("Invitation not found"));
    }

    info!(group_id = %group_id, user_id = %requester, "Invitation revoked");
    Ok(())
}

/// Active, unexpired invitations of the group. Admins only.
pub async fn list_active_invitations(
    groups: &dyn GroupStore,
    invitations: &dyn InvitationStore,
    group_id: Uuid,
    requester: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<GroupInvitation>, DomainError> {
    require_admin(groups, group_id, requester).await?;
    Ok(invitations.list_active_invitations(group_id, now).await?)
}

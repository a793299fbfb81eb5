//! Membership ledger: groups, members and roles.

use tracing::info;
use uuid::Uuid;

use crate::errors::{DomainError, StoreError};
use crate::models::group::{
    Group, GroupChanges, GroupDetail, GroupListFilter, GroupPrivacy, GroupRole, GroupSummary,
    Membership, NewGroup,
};
use crate::stores::GroupStore;

/// Creates the group and the creator's admin membership as one unit of work.
pub async fn create_group_with_admin(
    groups: &dyn GroupStore,
    creator: Uuid,
    name: String,
    description: String,
    privacy: GroupPrivacy,
) -> Result<(Group, Membership), DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::validation("Group name must not be empty"));
    }

    let (group, membership) = groups
        .create_group_with_admin(NewGroup {
            name,
            description,
            privacy,
            created_by: creator,
        })
        .await?;

    info!(group_id = %group.id, user_id = %creator, "Group created");
    Ok((group, membership))
}

/// Adds a membership. Fails with `DuplicateMembership` when the pair exists.
pub async fn add_member(
    groups: &dyn GroupStore,
    group_id: Uuid,
    user_id: Uuid,
    role: GroupRole,
) -> Result<Membership, DomainError> {
    match groups.insert_membership(group_id, user_id, role).await {
        Ok(membership) => {
            info!(group_id = %group_id, user_id = %user_id, role = %role, "Member added");
            Ok(membership)
        }
        Err(StoreError::UniqueViolation) => Err(DomainError::DuplicateMembership),
        Err(e) => Err(e.into()),
    }
}

pub async fn is_admin(
    groups: &dyn GroupStore,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DomainError> {
    Ok(groups
        .find_membership(group_id, user_id)
        .await?
        .is_some_and(|m| m.role == GroupRole::Admin))
}

pub async fn count_members(groups: &dyn GroupStore, group_id: Uuid) -> Result<i64, DomainError> {
    Ok(groups.count_members(group_id).await?)
}

/// Loads an active group together with the caller's membership.
///
/// Non-members get `NotFound` so group existence is not leaked.
pub async fn require_membership(
    groups: &dyn GroupStore,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<(Group, Membership), DomainError> {
    let group = groups
        .find_group(group_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Group not found"))?;
    let membership = groups
        .find_membership(group_id, user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Group not found"))?;
    Ok((group, membership))
}

/// Like [`require_membership`], additionally requiring the admin role.
pub async fn require_admin(
    groups: &dyn GroupStore,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<(Group, Membership), DomainError> {
    let (group, membership) = require_membership(groups, group_id, user_id).await?;
    if !membership.role.can_manage_members() {
        return Err(DomainError::forbidden("Only group admins can do this"));
    }
    Ok((group, membership))
}

pub async fn get_group(
    groups: &dyn GroupStore,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<GroupDetail, DomainError> {
    let (group, membership) = require_membership(groups, group_id, user_id).await?;
    let member_count = groups.count_members(group_id).await?;
    Ok(GroupDetail::new(group, member_count, membership.role))
}

pub async fn update_group(
    groups: &dyn GroupStore,
    group_id: Uuid,
    actor: Uuid,
    changes: GroupChanges,
) -> Result<GroupDetail, DomainError> {
    let (group, membership) = require_membership(groups, group_id, actor).await?;
    if !membership.role.can_manage_group() {
        return Err(DomainError::forbidden("Only group admins can edit the group"));
    }
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(DomainError::validation("Group name must not be empty"));
    }

    let updated = if changes.is_empty() {
        group
    } else {
        groups
            .update_group(group_id, changes)
            .await?
            .ok_or_else(|| DomainError::not_found("Group not found"))?
    };
    let member_count = groups.count_members(group_id).await?;

    info!(group_id = %group_id, user_id = %actor, "Group updated");
    Ok(GroupDetail::new(updated, member_count, membership.role))
}

/// Soft-deletes the group. Memberships and invitations are retained.
pub async fn delete_group(
    groups: &dyn GroupStore,
    group_id: Uuid,
    actor: Uuid,
) -> Result<(), DomainError> {
    let (_, membership) = require_membership(groups, group_id, actor).await?;
    if !membership.role.can_manage_group() {
        return Err(DomainError::forbidden("Only group admins can delete the group"));
    }
    if !groups.deactivate_group(group_id).await? {
        return Err(DomainError::not_found("Group not found"));
    }

    info!(group_id = %group_id, user_id = %actor, "Group deleted");
    Ok(())
}

/// Removes `target` from the group. Anyone may leave; removing someone else
/// requires the admin role. The group's last admin cannot leave or be removed.
pub async fn remove_member(
    groups: &dyn GroupStore,
    group_id: Uuid,
    actor: Uuid,
    target: Uuid,
) -> Result<(), DomainError> {
    if actor != target {
        let (_, membership) = require_membership(groups, group_id, actor).await?;
        if !membership.role.can_manage_members() {
            return Err(DomainError::forbidden("Only group admins can remove members"));
        }
    }

    let target_membership = groups
        .find_membership(group_id, target)
        .await?
        .ok_or_else(|| DomainError::not_found("Membership not found"))?;
    if target_membership.role == GroupRole::Admin {
        let admins = groups
            .list_members(group_id)
            .await?
            .iter()
            .filter(|m| m.role == GroupRole::Admin)
            .count();
        if admins <= 1 {
            return Err(DomainError::validation(
                "The last admin cannot leave the group; delete the group instead",
            ));
        }
    }

    if !groups.delete_membership(group_id, target).await? {
        return Err(DomainError::not_found("Membership not found"));
    }

    info!(group_id = %group_id, user_id = %target, removed_by = %actor, "Member removed");
    Ok(())
}

/// Joins a public group as a regular member.
pub async fn join_public_group(
    groups: &dyn GroupStore,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<Membership, DomainError> {
    let group = groups
        .find_group(group_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Group not found"))?;
    if group.privacy != GroupPrivacy::Public {
        return Err(DomainError::forbidden(
            "This group is private; an invitation is required",
        ));
    }
    add_member(groups, group_id, user_id, GroupRole::Member).await
}

/// Active groups of the filter's member, narrowed by search text and creator.
pub async fn list_groups_for_user(
    groups: &dyn GroupStore,
    filter: GroupListFilter,
) -> Result<Vec<GroupSummary>, DomainError> {
    Ok(groups.list_groups_for_user(filter).await?)
}

/// Members of the group, visible to members only.
pub async fn list_members(
    groups: &dyn GroupStore,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Membership>, DomainError> {
    require_membership(groups, group_id, user_id).await?;
    Ok(groups.list_members(group_id).await?)
}

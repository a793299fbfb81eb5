//! Group routes: lifecycle, members, public joins and favorites.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::favorite::ToggleFavoriteResponse;
use domain::models::group::{
    CreateGroupRequest, GroupDetail, JoinGroupResponse, ListGroupsQuery, ListGroupsResponse,
    ListMembersResponse, MemberResponse, UpdateGroupRequest,
};
use domain::models::UserPublic;
use domain::services::{favorite, membership};
use persistence::repositories::{FavoriteRepository, GroupRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::{record_group_created, record_member_joined};
use crate::routes::users::public_profiles;

/// Create a new group. The creator becomes its first admin.
///
/// POST /api/v1/groups
pub async fn create_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupDetail>), ApiError> {
    request.validate()?;

    let groups = GroupRepository::new(state.pool.clone());
    let (group, admin) = membership::create_group_with_admin(
        &groups,
        user_auth.user_id,
        request.name,
        request.description.unwrap_or_default(),
        request.privacy.unwrap_or_default(),
    )
    .await?;

    record_group_created();
    Ok((
        StatusCode::CREATED,
        Json(GroupDetail::new(group, 1, admin.role)),
    ))
}

/// List groups the current user belongs to, filtered by `search` and
/// `creator`.
///
/// GET /api/v1/groups
pub async fn list_groups(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<ListGroupsQuery>,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    let data =
        membership::list_groups_for_user(&groups, query.into_filter(user_auth.user_id)).await?;

    let count = data.len();
    Ok(Json(ListGroupsResponse { data, count }))
}

/// GET /api/v1/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetail>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    let detail = membership::get_group(&groups, group_id, user_auth.user_id).await?;
    Ok(Json(detail))
}

/// Update group settings. Admins only.
///
/// PUT /api/v1/groups/:group_id
pub async fn update_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<UpdateGroupRequest>,
) -> Result<Json<GroupDetail>, ApiError> {
    request.validate()?;

    let groups = GroupRepository::new(state.pool.clone());
    let detail =
        membership::update_group(&groups, group_id, user_auth.user_id, request.into()).await?;
    Ok(Json(detail))
}

/// Soft-delete a group. Admins only.
///
/// DELETE /api/v1/groups/:group_id
pub async fn delete_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    membership::delete_group(&groups, group_id, user_auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List group members with their public profiles.
///
/// GET /api/v1/groups/:group_id/members
pub async fn list_members(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListMembersResponse>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    let members = membership::list_members(&groups, group_id, user_auth.user_id).await?;

    let ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
    let mut profiles = public_profiles(&state, &ids).await?;

    let data: Vec<MemberResponse> = members
        .into_iter()
        .map(|m| MemberResponse {
            id: m.id,
            user: profiles
                .remove(&m.user_id)
                .unwrap_or_else(|| UserPublic::unknown(m.user_id)),
            role: m.role,
            joined_at: m.joined_at,
        })
        .collect();

    let count = data.len();
    Ok(Json(ListMembersResponse { data, count }))
}

/// Remove a member. Admins may remove anyone; members may remove themselves.
///
/// DELETE /api/v1/groups/:group_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, target_user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    membership::remove_member(&groups, group_id, user_auth.user_id, target_user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Join a public group without an invitation.
///
/// POST /api/v1/groups/:group_id/join
pub async fn join_group(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<(StatusCode, Json<JoinGroupResponse>), ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    let member = membership::join_public_group(&groups, group_id, user_auth.user_id).await?;

    record_member_joined("public");
    Ok((
        StatusCode::CREATED,
        Json(JoinGroupResponse {
            group_id: member.group_id,
            role: member.role,
            joined_at: member.joined_at,
        }),
    ))
}

/// Toggle the group in the user's favorites.
///
/// POST /api/v1/groups/:group_id/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ToggleFavoriteResponse>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    let favorites = FavoriteRepository::new(state.pool.clone());

    let status =
        favorite::toggle_favorite(&groups, &favorites, group_id, user_auth.user_id).await?;

    info!(
        group_id = %group_id,
        user_id = %user_auth.user_id,
        is_favorite = status.is_favorite(),
        "Favorite toggled"
    );
    Ok(Json(ToggleFavoriteResponse::new(group_id, status)))
}

//! Invitation routes: admins issue and revoke tokens, holders verify and join.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::invitation::{
    CreateInvitationResponse, InvitationSummary, JoinInvitationResponse, ListInvitationsResponse,
    VerifyInvitationResponse,
};
use domain::services::invitation;
use domain::DomainError;
use persistence::repositories::{GroupRepository, InvitationRepository};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::{
    record_invitation_created, record_invitation_expired, record_member_joined,
};

fn repositories(state: &AppState) -> (GroupRepository, InvitationRepository) {
    (
        GroupRepository::new(state.pool.clone()),
        InvitationRepository::new(state.pool.clone()),
    )
}

/// Counts invitations that were found stale and deactivated on access.
fn observe_expiry(err: DomainError) -> ApiError {
    if err == DomainError::InvitationExpired {
        record_invitation_expired();
    }
    err.into()
}

/// Issue a 7-day invitation. Admins only.
///
/// POST /api/v1/groups/:group_id/invitations
pub async fn create_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CreateInvitationResponse>), ApiError> {
    let (groups, invitations) = repositories(&state);
    let created = invitation::create_invitation(
        &groups,
        &invitations,
        group_id,
        user_auth.user_id,
        Utc::now(),
    )
    .await?;

    record_invitation_created();
    Ok((
        StatusCode::CREATED,
        Json(CreateInvitationResponse::new(
            created,
            &state.config.server.app_base_url,
        )),
    ))
}

/// List currently usable invitations. Admins only.
///
/// GET /api/v1/groups/:group_id/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(group_id): Path<Uuid>,
) -> Result<Json<ListInvitationsResponse>, ApiError> {
    let (groups, invitations) = repositories(&state);
    let active = invitation::list_active_invitations(
        &groups,
        &invitations,
        group_id,
        user_auth.user_id,
        Utc::now(),
    )
    .await?;

    Ok(Json(ListInvitationsResponse {
        data: active.into_iter().map(InvitationSummary::from).collect(),
    }))
}

/// Revoke an invitation. Admins only.
///
/// DELETE /api/v1/groups/:group_id/invitations/:token
pub async fn revoke_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path((group_id, token)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let (groups, invitations) = repositories(&state);
    invitation::revoke_invitation(&groups, &invitations, group_id, token, user_auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show what group an invitation leads to.
///
/// GET /api/v1/invitations/:token
pub async fn verify_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(token): Path<Uuid>,
) -> Result<Json<VerifyInvitationResponse>, ApiError> {
    let (groups, invitations) = repositories(&state);
    let verified = invitation::verify_invitation(
        &groups,
        &invitations,
        token,
        user_auth.user_id,
        Utc::now(),
    )
    .await
    .map_err(observe_expiry)?;

    Ok(Json(VerifyInvitationResponse {
        expires_at: verified.invitation.expires_at,
        group: verified.group,
        already_member: verified.already_member,
    }))
}

/// Join the invitation's group. Joining a group you are already in succeeds
/// with `already_member = true` and status 200.
///
/// POST /api/v1/invitations/:token/join
pub async fn join_invitation(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(token): Path<Uuid>,
) -> Result<(StatusCode, Json<JoinInvitationResponse>), ApiError> {
    let (groups, invitations) = repositories(&state);
    let joined = invitation::join_with_invitation(
        &groups,
        &invitations,
        token,
        user_auth.user_id,
        Utc::now(),
    )
    .await
    .map_err(observe_expiry)?;

    let status = if joined.already_member {
        StatusCode::OK
    } else {
        record_member_joined("invitation");
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(JoinInvitationResponse {
            group_id: joined.group_id,
            already_member: joined.already_member,
            role: joined.role,
            joined_at: joined.joined_at,
        }),
    ))
}

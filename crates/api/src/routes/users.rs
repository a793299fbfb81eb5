//! Profile routes for the authenticated user and the user directory.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::user::{
    ListUsersQuery, ListUsersResponse, UpdateProfileRequest, USER_DIRECTORY_LIMIT,
};
use domain::models::{SearchTerms, User, UserPublic};
use persistence::repositories::{ProfileUpdate, UserRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Get current user profile.
///
/// GET /api/v1/users/me
pub async fn get_current_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
) -> Result<Json<User>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_id(user_auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update current user profile. Omitted fields keep their value.
///
/// PATCH /api/v1/users/me
pub async fn update_current_user(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let update = ProfileUpdate {
        first_name: request.first_name.as_deref(),
        last_name: request.last_name.as_deref(),
        bio: request.bio.as_deref(),
        avatar_url: request.avatar_url.as_deref(),
    };

    let user = UserRepository::new(state.pool.clone())
        .update_profile(user_auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %user_auth.user_id, "Profile updated");
    Ok(Json(user.into()))
}

/// Search registered users by username, email or name. Emails are matched
/// but never returned.
///
/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    _user_auth: UserAuth,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let terms = SearchTerms::parse(query.search.as_deref());
    let found = UserRepository::new(state.pool.clone())
        .search(&terms.like_patterns(), USER_DIRECTORY_LIMIT)
        .await?;

    let data: Vec<UserPublic> = found
        .into_iter()
        .map(|entity| UserPublic::from(User::from(entity)))
        .collect();
    let count = data.len();
    Ok(Json(ListUsersResponse { data, count }))
}

/// Looks up public profiles for the given IDs. IDs without a row map to
/// [`UserPublic::unknown`].
pub(crate) async fn public_profiles(
    state: &AppState,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, UserPublic>, ApiError> {
    let found = UserRepository::new(state.pool.clone())
        .find_by_ids(ids)
        .await?;

    let mut profiles: HashMap<Uuid, UserPublic> = found
        .into_iter()
        .map(|entity| {
            let user: User = entity.into();
            (user.id, UserPublic::from(user))
        })
        .collect();
    for id in ids {
        profiles
            .entry(*id)
            .or_insert_with(|| UserPublic::unknown(*id));
    }
    Ok(profiles)
}

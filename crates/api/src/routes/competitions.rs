//! Competition routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::competition::{
    Competition, CreateCompetitionRequest, ListCompetitionsQuery, ListCompetitionsResponse,
    ListParticipantsResponse, Participant, ParticipantResponse, UpdateStatusRequest,
};
use domain::models::UserPublic;
use domain::services::participation;
use persistence::repositories::{CompetitionRepository, GroupRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_competition_created;
use crate::routes::users::public_profiles;

fn repositories(state: &AppState) -> (GroupRepository, CompetitionRepository) {
    (
        GroupRepository::new(state.pool.clone()),
        CompetitionRepository::new(state.pool.clone()),
    )
}

/// Create a competition in one of the user's groups. Starts in `planning`.
///
/// POST /api/v1/competitions
pub async fn create_competition(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Json(request): Json<CreateCompetitionRequest>,
) -> Result<(StatusCode, Json<Competition>), ApiError> {
    request.validate()?;

    let (groups, competitions) = repositories(&state);
    let competition = participation::create_competition(
        &groups,
        &competitions,
        request.group_id,
        user_auth.user_id,
        request.name,
        request.description.unwrap_or_default(),
        request.start_date,
        request.end_date,
    )
    .await?;

    record_competition_created();
    Ok((StatusCode::CREATED, Json(competition)))
}

/// Competitions in the user's groups, filtered by `group_id`, `status`,
/// `creator` and `search`.
///
/// GET /api/v1/competitions
pub async fn list_competitions(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Query(query): Query<ListCompetitionsQuery>,
) -> Result<Json<ListCompetitionsResponse>, ApiError> {
    let competitions = CompetitionRepository::new(state.pool.clone());
    let data =
        participation::list_competitions(&competitions, query.into_filter(user_auth.user_id))
            .await?;

    let count = data.len();
    Ok(Json(ListCompetitionsResponse { data, count }))
}

/// GET /api/v1/competitions/:competition_id
pub async fn get_competition(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(competition_id): Path<Uuid>,
) -> Result<Json<Competition>, ApiError> {
    let (groups, competitions) = repositories(&state);
    let competition =
        participation::get_competition(&groups, &competitions, competition_id, user_auth.user_id)
            .await?;
    Ok(Json(competition))
}

/// Move the competition forward. Creator or group admin only.
///
/// PUT /api/v1/competitions/:competition_id/status
pub async fn update_status(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(competition_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Competition>, ApiError> {
    let (groups, competitions) = repositories(&state);
    let competition = participation::update_status(
        &groups,
        &competitions,
        competition_id,
        user_auth.user_id,
        request.status,
    )
    .await?;
    Ok(Json(competition))
}

/// POST /api/v1/competitions/:competition_id/join
pub async fn join_competition(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(competition_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let (groups, competitions) = repositories(&state);
    let participant =
        participation::join_competition(&groups, &competitions, competition_id, user_auth.user_id)
            .await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// GET /api/v1/competitions/:competition_id/participants
pub async fn list_participants(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(competition_id): Path<Uuid>,
) -> Result<Json<ListParticipantsResponse>, ApiError> {
    let (groups, competitions) = repositories(&state);
    let participants = participation::list_participants(
        &groups,
        &competitions,
        competition_id,
        user_auth.user_id,
    )
    .await?;

    let ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
    let mut profiles = public_profiles(&state, &ids).await?;

    let data: Vec<ParticipantResponse> = participants
        .into_iter()
        .map(|p| ParticipantResponse {
            id: p.id,
            user: profiles
                .remove(&p.user_id)
                .unwrap_or_else(|| UserPublic::unknown(p.user_id)),
            joined_at: p.joined_at,
        })
        .collect();

    let count = data.len();
    Ok(Json(ListParticipantsResponse { data, count }))
}
